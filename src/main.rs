use clap::Parser;
use site_survey::config::CrawlerConfig;
use site_survey::results::CrawlResult;
use site_survey::{Crawler, DirectoryStore, persist_artifacts};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => CrawlerConfig::from_file(path)?,
        None => CrawlerConfig::new(""),
    };
    args.apply(&mut config);
    if config.start_url.is_empty() {
        return Err("no start URL given (pass a URL or set startUrl in --config)".into());
    }

    ::log::info!(
        "Crawling {} via {} (max {} pages, depth {})",
        config.start_url,
        config.webdriver_url,
        config.settings.max_pages,
        config.settings.max_depth
    );

    let crawler = Crawler::from_config(&config)?;
    let cancel = CancellationToken::new();
    if let Some(secs) = args.crawl_timeout {
        let timer = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            ::log::warn!("Crawl timeout of {}s reached, cancelling", secs);
            timer.cancel();
        });
    }
    {
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ::log::warn!("Interrupted, cancelling crawl");
                interrupt.cancel();
            }
        });
    }

    let start_time = std::time::Instant::now();
    let result = crawler
        .crawl_site_with_cancel(&config.start_url, config.credentials.as_ref(), cancel)
        .await?;
    ::log::info!(
        "Crawling complete - {} pages in {:.2} seconds",
        result.pages.len(),
        start_time.elapsed().as_secs_f64()
    );

    if let Some(dir) = &args.artifacts_dir {
        let store = DirectoryStore::new(dir);
        persist_artifacts(&result, &store, "").await?;
    }
    write_result(&result, args.output.as_deref()).await
}

async fn write_result(
    result: &CrawlResult,
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(result)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, json).await?;
            ::log::info!("Wrote result to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
