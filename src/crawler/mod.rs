//! One bounded crawl per invocation:
//! navigate → dismiss consent → authenticate → traverse → analyze.

pub mod auth;
pub mod extract;
pub mod navigation;
pub mod traversal;

#[cfg(test)]
mod tests;

use crate::analysis;
use crate::browser::{BrowserSession, PageDriver, WebDriverPage};
use crate::config::{CrawlSettings, CrawlerConfig, LoginCredentials};
use crate::error::{CrawlError, Result};
use crate::filter::{UrlFilter, UrlFilterConfig};
use crate::results::CrawlResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use traversal::Traversal;
use url::Url;

/// Starts the browser page a crawl runs on
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    type Page: PageDriver;

    async fn initialize(&self, settings: &CrawlSettings) -> Result<Self::Page>;
}

#[async_trait]
impl SessionLauncher for BrowserSession {
    type Page = WebDriverPage;

    async fn initialize(&self, settings: &CrawlSettings) -> Result<WebDriverPage> {
        BrowserSession::initialize(self, settings).await
    }
}

/// Lifecycle of a single crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    RootLoaded,
    Traversing,
    Done,
    Failed,
}

/// Site crawler. Each call to [`Crawler::crawl_site`] opens its own browser
/// session, so one `Crawler` can serve several crawls, concurrently included.
pub struct Crawler<L: SessionLauncher = BrowserSession> {
    launcher: L,
    settings: CrawlSettings,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl Crawler<BrowserSession> {
    /// Crawler driving a WebDriver browser as described by `config`
    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        let launcher = BrowserSession::new(&config.webdriver_url, config.browser, config.headless);
        Ok(Crawler::new(launcher, config.settings.clone())?
            .with_include_patterns(config.include_patterns.clone())
            .with_exclude_patterns(config.exclude_patterns.clone()))
    }
}

impl<L: SessionLauncher> Crawler<L> {
    pub fn new(launcher: L, settings: CrawlSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            launcher,
            settings,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        })
    }

    /// Only follow links matching at least one of these regexes
    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    /// Never follow links matching these regexes (in addition to static assets)
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawl `target_url`, logging in first when `credentials` are given
    pub async fn crawl_site(
        &self,
        target_url: &str,
        credentials: Option<&LoginCredentials>,
    ) -> Result<CrawlResult> {
        self.crawl_site_with_cancel(target_url, credentials, CancellationToken::new())
            .await
    }

    /// Like [`Crawler::crawl_site`], aborting with [`CrawlError::Cancelled`]
    /// at the next navigation once `cancel` fires
    pub async fn crawl_site_with_cancel(
        &self,
        target_url: &str,
        credentials: Option<&LoginCredentials>,
        cancel: CancellationToken,
    ) -> Result<CrawlResult> {
        let origin = Url::parse(target_url).map_err(|source| CrawlError::InvalidUrl {
            url: target_url.to_string(),
            source,
        })?;
        let filter = self.url_filter(&origin)?;

        ::log::info!("Starting crawl of {}", origin);
        let page = self.launcher.initialize(&self.settings).await?;

        let outcome = self
            .run(&page, &origin, &filter, credentials, &cancel)
            .await;

        if let Err(e) = page.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        outcome
    }

    fn url_filter(&self, origin: &Url) -> Result<UrlFilter> {
        let mut config = UrlFilterConfig::for_origin(origin);
        config.include_patterns = self.include_patterns.clone();
        config.exclude_patterns.extend(self.exclude_patterns.iter().cloned());
        UrlFilter::new(config).map_err(|e| CrawlError::Config(format!("invalid URL pattern: {}", e)))
    }

    async fn run(
        &self,
        page: &L::Page,
        origin: &Url,
        filter: &UrlFilter,
        credentials: Option<&LoginCredentials>,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult> {
        let mut state = CrawlState::Idle;
        let outcome = self
            .drive(page, origin, filter, credentials, cancel, &mut state)
            .await;

        if let Err(e) = &outcome {
            ::log::error!("Crawl failed in state {:?}: {}", state, e);
            state = CrawlState::Failed;
        }
        ::log::debug!("Crawl of {} ended in state {:?}", origin, state);
        outcome
    }

    async fn drive(
        &self,
        page: &L::Page,
        origin: &Url,
        filter: &UrlFilter,
        credentials: Option<&LoginCredentials>,
        cancel: &CancellationToken,
        state: &mut CrawlState,
    ) -> Result<CrawlResult> {
        let settings = &self.settings;

        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled);
        }
        navigation::navigate_to_url(page, origin.as_str(), settings)
            .await
            .map_err(|e| CrawlError::Navigation {
                url: origin.to_string(),
                message: e.to_string(),
            })?;
        navigation::handle_consent_popups(page, settings).await;
        *state = CrawlState::RootLoaded;

        let site_files = if settings.probe_site_files {
            navigation::probe_site_files(page).await
        } else {
            Default::default()
        };

        let root = match credentials {
            Some(credentials) => {
                if cancel.is_cancelled() {
                    return Err(CrawlError::Cancelled);
                }
                auth::authenticate(page, credentials, settings).await?;
                self.post_login_root(page, origin, filter).await
            }
            None => origin.clone(),
        };

        *state = CrawlState::Traversing;
        let mut result = Traversal::new(page, settings, filter, origin, cancel)
            .run(root)
            .await?;
        result.site_files = site_files;

        analysis::analyze(&mut result);
        *state = CrawlState::Done;
        Ok(result)
    }

    /// Traversal continues from wherever the login left the browser, as long
    /// as that is still on the target site
    async fn post_login_root(&self, page: &L::Page, origin: &Url, filter: &UrlFilter) -> Url {
        match page.current_url().await.map(|u| Url::parse(&u)) {
            Ok(Ok(current)) if filter.should_crawl(&current) => current,
            _ => origin.clone(),
        }
    }
}
