use clap::{Parser, ValueEnum};
use site_survey::config::{BrowserKind, CrawlSettings, CrawlerConfig, LoginCredentials};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "site-survey")]
#[command(about = "Crawl a website in a real browser and report what it contains")]
#[command(version)]
pub struct Args {
    /// URL to start crawling from (optional when --config provides startUrl)
    pub url: Option<String>,

    /// JSON crawler configuration; command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Browser to drive
    #[arg(long, value_enum)]
    pub browser: Option<BrowserArg>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Maximum number of pages to capture
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Maximum link depth from the start page
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Links followed from each page
    #[arg(long)]
    pub max_links_per_page: Option<usize>,

    /// Navigation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// JPEG quality for screenshots (0-100)
    #[arg(long)]
    pub screenshot_quality: Option<u8>,

    /// Only wait for the load event, not for network idle
    #[arg(long)]
    pub no_network_idle: bool,

    /// Skip screenshots
    #[arg(long)]
    pub no_screenshots: bool,

    /// Skip the robots.txt / sitemap.xml probe
    #[arg(long)]
    pub no_site_files: bool,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Only follow links matching this regex (repeatable)
    #[arg(long = "include")]
    pub include_patterns: Vec<String>,

    /// Never follow links matching this regex (repeatable)
    #[arg(long = "exclude")]
    pub exclude_patterns: Vec<String>,

    /// Log in with this username before crawling
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    #[arg(long, env = "SITE_SURVEY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Page holding the login form (defaults to the start page)
    #[arg(long)]
    pub login_url: Option<String>,

    #[arg(long)]
    pub username_selector: Option<String>,

    #[arg(long)]
    pub password_selector: Option<String>,

    #[arg(long)]
    pub submit_selector: Option<String>,

    /// Write the result JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save screenshots and result.json into this directory
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Abort the crawl after this many seconds
    #[arg(long)]
    pub crawl_timeout: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BrowserArg {
    Chrome,
    Firefox,
}

impl From<BrowserArg> for BrowserKind {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chrome => BrowserKind::Chrome,
            BrowserArg::Firefox => BrowserKind::Firefox,
        }
    }
}

impl Args {
    /// Layer the command-line flags over `config`
    pub fn apply(&self, config: &mut CrawlerConfig) {
        if let Some(url) = &self.url {
            config.start_url = url.clone();
        }
        if let Some(url) = &self.webdriver_url {
            if !url.is_empty() {
                config.webdriver_url = url.clone();
            }
        }
        if let Some(browser) = self.browser {
            config.browser = browser.into();
        }
        if self.headed {
            config.headless = false;
        }
        self.apply_settings(&mut config.settings);

        config
            .include_patterns
            .extend(self.include_patterns.iter().cloned());
        config
            .exclude_patterns
            .extend(self.exclude_patterns.iter().cloned());

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config.credentials = Some(LoginCredentials {
                username: username.clone(),
                password: password.clone(),
                login_url: self.login_url.clone(),
                username_selector: self.username_selector.clone(),
                password_selector: self.password_selector.clone(),
                submit_selector: self.submit_selector.clone(),
            });
        }
    }

    fn apply_settings(&self, settings: &mut CrawlSettings) {
        if let Some(v) = self.max_pages {
            settings.max_pages = v;
        }
        if let Some(v) = self.max_depth {
            settings.max_depth = v;
        }
        if let Some(v) = self.max_links_per_page {
            settings.max_links_per_page = v;
        }
        if let Some(v) = self.timeout_ms {
            settings.timeout_ms = v;
        }
        if let Some(v) = self.screenshot_quality {
            settings.screenshot_quality = v;
        }
        if let Some(v) = &self.user_agent {
            settings.user_agent = Some(v.clone());
        }
        if self.no_network_idle {
            settings.wait_for_network_idle = false;
        }
        if self.no_screenshots {
            settings.capture_screenshots = false;
        }
        if self.no_site_files {
            settings.probe_site_files = false;
        }
    }
}
