use super::links_page;
use super::mock::{MockLauncher, MockPage, MockSite, fast_settings};
use crate::config::CrawlSettings;
use crate::crawler::Crawler;
use crate::error::CrawlError;
use tokio_util::sync::CancellationToken;

const ROOT: &str = "https://site.test/";

fn crawler(site: &MockSite) -> Crawler<MockLauncher> {
    Crawler::new(MockLauncher::new(site.clone()), fast_settings()).unwrap()
}

#[tokio::test]
async fn test_session_start_failure() {
    let err = Crawler::new(MockLauncher::broken(), fast_settings())
        .unwrap()
        .crawl_site(ROOT, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::Session(_)));
}

#[tokio::test]
async fn test_unreachable_root_is_fatal() {
    let site = MockSite::new();

    let err = crawler(&site).crawl_site(ROOT, None).await.unwrap_err();

    match err {
        CrawlError::Navigation { url, .. } => assert_eq!(url, ROOT),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(site.visits(), vec![ROOT]);
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_root_error_status_is_fatal() {
    let site = MockSite::new().page_with(
        ROOT,
        MockPage {
            html: links_page("Down", &["/a"]),
            status: 503,
            ..MockPage::default()
        },
    );

    let err = crawler(&site).crawl_site(ROOT, None).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to navigate to https://site.test/: HTTP status 503"
    );
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_invalid_target_url() {
    let site = MockSite::new();
    let err = crawler(&site).crawl_site("not a url", None).await.unwrap_err();
    assert!(matches!(err, CrawlError::InvalidUrl { .. }));
    assert!(site.visits().is_empty());
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
    let settings = CrawlSettings {
        max_pages: 0,
        ..fast_settings()
    };
    let err = Crawler::new(MockLauncher::broken(), settings).err().unwrap();
    assert!(matches!(err, CrawlError::Config(_)));
}

#[tokio::test]
async fn test_invalid_pattern_rejected_before_browser_starts() {
    let site = MockSite::new().page(ROOT, &links_page("Home", &[]));
    let err = crawler(&site)
        .with_exclude_patterns(vec!["(unclosed".into()])
        .crawl_site(ROOT, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CrawlError::Config(_)));
    assert!(site.visits().is_empty());
}

#[tokio::test]
async fn test_include_and_exclude_patterns() {
    let site = MockSite::new()
        .page(ROOT, &links_page("Home", &["/docs/a", "/docs/private", "/blog"]))
        .page("https://site.test/docs/a", &links_page("A", &[]))
        .page("https://site.test/docs/private", &links_page("P", &[]))
        .page("https://site.test/blog", &links_page("Blog", &[]));

    let result = crawler(&site)
        .with_include_patterns(vec!["/docs/".into()])
        .with_exclude_patterns(vec!["private".into()])
        .crawl_site(ROOT, None)
        .await
        .unwrap();

    assert_eq!(result.sitemap, vec![ROOT, "https://site.test/docs/a"]);
}

#[tokio::test]
async fn test_session_closed_once_after_success() {
    let site = MockSite::new()
        .page(ROOT, &links_page("Home", &["/a"]))
        .page("https://site.test/a", &links_page("A", &[]));

    let result = crawler(&site).crawl_site(ROOT, None).await.unwrap();

    assert_eq!(result.pages.len(), 2);
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let site = MockSite::new().page(ROOT, &links_page("Home", &[]));
    let token = CancellationToken::new();
    token.cancel();

    let err = crawler(&site)
        .crawl_site_with_cancel(ROOT, None, token)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Cancelled));
    assert!(site.visits().is_empty());
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_cancelled_mid_crawl() {
    let token = CancellationToken::new();
    let site = MockSite::new()
        .page(ROOT, &links_page("Home", &["/a", "/b", "/c"]))
        .page("https://site.test/a", &links_page("A", &[]))
        .page("https://site.test/b", &links_page("B", &[]))
        .page("https://site.test/c", &links_page("C", &[]))
        .cancel_after(3, token.clone());

    let err = crawler(&site)
        .crawl_site_with_cancel(ROOT, None, token)
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlError::Cancelled));
    // Initial load, root, /a; nothing after the token fired
    assert_eq!(
        site.visits(),
        vec![ROOT, ROOT, "https://site.test/a"]
    );
    assert_eq!(site.closes(), 1);
}

#[tokio::test]
async fn test_consent_banner_dismissed() {
    let home = r#"<html><body>
        <div id="cookie-banner"><button id="onetrust-accept-btn-handler">OK</button></div>
        <a href="/a">A</a>
    </body></html>"#;
    let site = MockSite::new()
        .page(ROOT, home)
        .page("https://site.test/a", &links_page("A", &[]));

    let result = crawler(&site).crawl_site(ROOT, None).await.unwrap();

    assert_eq!(site.clicks(), vec!["css=#onetrust-accept-btn-handler"]);
    assert_eq!(result.pages.len(), 2);
}

#[tokio::test]
async fn test_no_consent_banner_is_not_an_error() {
    let site = MockSite::new().page(ROOT, &links_page("Home", &[]));
    let result = crawler(&site).crawl_site(ROOT, None).await.unwrap();
    assert!(site.clicks().is_empty());
    assert!(result.summary.errors.is_empty());
}

#[tokio::test]
async fn test_concurrent_crawls_share_nothing() {
    let first = MockSite::new()
        .page(ROOT, &links_page("One", &["/x"]))
        .page("https://site.test/x", &links_page("X", &[]));
    let second = MockSite::new().page(ROOT, &links_page("Two", &[]));
    let a = crawler(&first);
    let b = crawler(&second);

    let (ra, rb) = tokio::join!(a.crawl_site(ROOT, None), b.crawl_site(ROOT, None));

    assert_eq!(ra.unwrap().pages.len(), 2);
    let rb = rb.unwrap();
    assert_eq!(rb.pages.len(), 1);
    assert_eq!(rb.pages[0].title, "Two");
}
