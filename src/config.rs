use crate::error::CrawlError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Browser window size used for rendering and screenshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Settings for one crawl. Immutable once the crawler is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSettings {
    /// Maximum number of pages captured
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum link depth from the root page (root is depth 0)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Wait for network activity to settle instead of just the load event
    #[serde(default = "default_true")]
    pub wait_for_network_idle: bool,

    /// JPEG quality for screenshots, 0-100
    #[serde(default = "default_screenshot_quality")]
    pub screenshot_quality: u8,

    /// Page load / script timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Custom user agent (browser default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub viewport: Viewport,

    /// Internal links followed per page
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,

    /// How long a consent button may take to become visible
    #[serde(default = "default_consent_timeout_ms")]
    pub consent_timeout_ms: u64,

    /// Pause after dismissing a consent popup
    #[serde(default = "default_consent_settle_ms")]
    pub consent_settle_ms: u64,

    /// Pause after submitting the login form
    #[serde(default = "default_login_settle_ms")]
    pub login_settle_ms: u64,

    /// Probe /robots.txt and /sitemap.xml on the target origin
    #[serde(default = "default_true")]
    pub probe_site_files: bool,

    #[serde(default = "default_true")]
    pub capture_screenshots: bool,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            wait_for_network_idle: true,
            screenshot_quality: default_screenshot_quality(),
            timeout_ms: default_timeout_ms(),
            user_agent: None,
            viewport: Viewport::default(),
            max_links_per_page: default_max_links_per_page(),
            consent_timeout_ms: default_consent_timeout_ms(),
            consent_settle_ms: default_consent_settle_ms(),
            login_settle_ms: default_login_settle_ms(),
            probe_site_files: true,
            capture_screenshots: true,
        }
    }
}

impl CrawlSettings {
    /// Reject settings that would make a crawl meaningless
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.max_pages == 0 {
            return Err(CrawlError::Config("maxPages must be greater than 0".into()));
        }
        if self.timeout_ms == 0 {
            return Err(CrawlError::Config("timeoutMs must be greater than 0".into()));
        }
        if self.screenshot_quality > 100 {
            return Err(CrawlError::Config(format!(
                "screenshotQuality must be within 0-100, got {}",
                self.screenshot_quality
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(CrawlError::Config("viewport must be non-zero".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_timeout_ms)
    }

    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle_ms)
    }

    pub fn login_settle(&self) -> Duration {
        Duration::from_millis(self.login_settle_ms)
    }
}

/// Login credentials. Used at most once per crawl and never persisted.
///
/// The selector overrides replace the built-in fallback chains when set.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_selector: Option<String>,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("login_url", &self.login_url)
            .field("username_selector", &self.username_selector)
            .field("password_selector", &self.password_selector)
            .field("submit_selector", &self.submit_selector)
            .finish()
    }
}

/// WebDriver browser flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Firefox,
}

/// Configuration for a complete crawler run, loadable from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    /// URL to start crawling from
    pub start_url: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default)]
    pub browser: BrowserKind,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default)]
    pub settings: CrawlSettings,

    /// Regex patterns a link must match (any) to be followed
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns that stop a link from being followed
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<LoginCredentials>,
}

impl CrawlerConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            webdriver_url: default_webdriver_url(),
            browser: BrowserKind::default(),
            headless: true,
            settings: CrawlSettings::default(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            credentials: None,
        }
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_pages() -> usize {
    10
}

fn default_max_depth() -> usize {
    3
}

fn default_screenshot_quality() -> u8 {
    80
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_links_per_page() -> usize {
    5
}

fn default_consent_timeout_ms() -> u64 {
    2_000
}

fn default_consent_settle_ms() -> u64 {
    1_000
}

fn default_login_settle_ms() -> u64 {
    3_000
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}
