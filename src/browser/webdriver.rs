use super::{ElementQuery, PageDriver, WaitCondition};
use crate::config::{BrowserKind, CrawlSettings};
use crate::error::{CrawlError, DriverError};
use async_trait::async_trait;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const NETWORK_QUIET_PERIOD: Duration = Duration::from_millis(500);

const READY_STATE_SCRIPT: &str = "return document.readyState;";
const NETWORK_STATE_SCRIPT: &str = r#"
    return [
        document.readyState,
        (window.performance && performance.getEntriesByType)
            ? performance.getEntriesByType('resource').length
            : 0
    ];
"#;

/// Tried in order when the configured WebDriver URL refuses the session
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4444", // geckodriver / Selenium default
    "http://127.0.0.1:4444",
];

/// Opens browser sessions. One session serves exactly one crawl.
#[derive(Debug, Clone)]
pub struct BrowserSession {
    webdriver_url: String,
    browser: BrowserKind,
    headless: bool,
}

impl BrowserSession {
    pub fn new(webdriver_url: impl Into<String>, browser: BrowserKind, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            browser,
            headless,
        }
    }

    /// Start a browser with one page configured from `settings`.
    ///
    /// A custom user agent is applied through the session capabilities, so
    /// the resulting browsing context is isolated to this crawl.
    pub async fn initialize(&self, settings: &CrawlSettings) -> Result<WebDriverPage, CrawlError> {
        let caps = self.capabilities(settings);
        let client = self.connect(caps).await?;

        let timeouts = TimeoutConfiguration::new(
            Some(settings.timeout()),
            Some(settings.timeout()),
            Some(Duration::ZERO),
        );
        if let Err(e) = client.update_timeouts(timeouts).await {
            ::log::warn!("Could not apply WebDriver timeouts: {}", e);
        }

        let viewport = settings.viewport;
        if let Err(e) = client.set_window_size(viewport.width, viewport.height).await {
            ::log::debug!("Could not set window size: {}", e);
        }

        ::log::info!(
            "Browser session ready ({:?}, {}x{})",
            self.browser,
            viewport.width,
            viewport.height
        );
        Ok(WebDriverPage::new(client))
    }

    fn capabilities(&self, settings: &CrawlSettings) -> serde_json::Map<String, serde_json::Value> {
        let mut caps = serde_json::Map::new();
        let viewport = settings.viewport;

        match self.browser {
            BrowserKind::Chrome => {
                let mut args = vec![
                    "--no-sandbox".to_string(),
                    "--disable-dev-shm-usage".to_string(),
                    format!("--window-size={},{}", viewport.width, viewport.height),
                ];
                if self.headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                }
                if let Some(agent) = &settings.user_agent {
                    args.push(format!("--user-agent={}", agent));
                }
                caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
            }
            BrowserKind::Firefox => {
                let mut args = vec![
                    format!("--width={}", viewport.width),
                    format!("--height={}", viewport.height),
                ];
                if self.headless {
                    args.push("--headless".to_string());
                }
                let mut options = json!({ "args": args });
                if let Some(agent) = &settings.user_agent {
                    options["prefs"] = json!({ "general.useragent.override": agent });
                }
                caps.insert("moz:firefoxOptions".to_string(), options);
            }
        }

        caps.insert("pageLoadStrategy".to_string(), json!("normal"));
        caps
    }

    async fn connect(
        &self,
        caps: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Client, CrawlError> {
        let first_error = match ClientBuilder::native()
            .capabilities(caps.clone())
            .connect(&self.webdriver_url)
            .await
        {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
                e.to_string()
            }
        };

        for url in FALLBACK_WEBDRIVER_URLS {
            if *url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native()
                .capabilities(caps.clone())
                .connect(url)
                .await
            {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        Err(CrawlError::Session(format!(
            "no WebDriver server accepted a session (tried {} first: {}). \
             Make sure a WebDriver server is running or set WEBDRIVER_URL",
            self.webdriver_url, first_error
        )))
    }
}

/// A fantoccini WebDriver session exposed as a [`PageDriver`].
///
/// Dropping the last handle without calling `close` still ends the WebDriver
/// session, since the client is not marked persistent.
pub struct WebDriverPage {
    client: Client,
    closed: AtomicBool,
}

impl WebDriverPage {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            closed: AtomicBool::new(false),
        }
    }

    async fn wait_for_load(&self, deadline: Instant, timeout: Duration) -> Result<(), DriverError> {
        loop {
            let state = self.client.execute(READY_STATE_SCRIPT, vec![]).await?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(timeout.as_millis() as u64));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_network_idle(
        &self,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let mut last_count = None;
        let mut quiet_since = Instant::now();

        loop {
            let state = self.client.execute(NETWORK_STATE_SCRIPT, vec![]).await?;
            let complete = state[0].as_str() == Some("complete");
            let count = state[1].as_u64();

            if count != last_count {
                last_count = count;
                quiet_since = Instant::now();
            } else if complete && quiet_since.elapsed() >= NETWORK_QUIET_PERIOD {
                return Ok(());
            }

            if Instant::now() >= deadline {
                if complete {
                    ::log::debug!("Network never went idle; continuing with loaded page");
                    return Ok(());
                }
                return Err(DriverError::Timeout(timeout.as_millis() as u64));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

impl Drop for WebDriverPage {
    // A crawl future dropped mid-flight never reaches its `close().await`
    fn drop(&mut self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let client = self.client.clone();
            handle.spawn(async move {
                if let Err(e) = client.close().await {
                    ::log::debug!("Closing abandoned browser session failed: {}", e);
                }
            });
        }
    }
}

fn locator(query: &ElementQuery) -> Locator<'_> {
    match query {
        ElementQuery::Css(selector) => Locator::Css(selector),
        ElementQuery::XPath(expression) => Locator::XPath(expression),
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        ::log::debug!("Navigating to {}", url);
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_until(
        &self,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), DriverError> {
        let deadline = Instant::now() + timeout;
        match condition {
            WaitCondition::Load => self.wait_for_load(deadline, timeout).await,
            WaitCondition::NetworkIdle => self.wait_for_network_idle(deadline, timeout).await,
        }
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn source(&self) -> Result<String, DriverError> {
        Ok(self.client.source().await?)
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError> {
        self.client
            .execute(script, vec![])
            .await
            .map_err(|e| DriverError::Script(e.to_string()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.client
            .screenshot()
            .await
            .map_err(|e| DriverError::Screenshot(e.to_string()))
    }

    async fn exists(&self, query: &ElementQuery) -> Result<bool, DriverError> {
        let found = self.client.find_all(locator(query)).await?;
        Ok(!found.is_empty())
    }

    async fn click_if_visible(
        &self,
        query: &ElementQuery,
        timeout: Duration,
    ) -> Result<bool, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            for element in self.client.find_all(locator(query)).await? {
                if element.is_displayed().await.unwrap_or(false) {
                    element.click().await?;
                    return Ok(true);
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn fill(&self, query: &ElementQuery, value: &str) -> Result<(), DriverError> {
        let element = self.client.find(locator(query)).await?;
        if let Err(e) = element.clear().await {
            ::log::trace!("Could not clear {}: {}", query, e);
        }
        element.send_keys(value).await?;
        Ok(())
    }

    async fn click(&self, query: &ElementQuery) -> Result<(), DriverError> {
        let element = self.client.find(locator(query)).await?;
        element.click().await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        ::log::debug!("Closing browser session");
        self.client.clone().close().await?;
        Ok(())
    }
}
