//! In-memory site served through the `PageDriver` interface.

use crate::browser::{ElementQuery, PageDriver, WaitCondition};
use crate::config::CrawlSettings;
use crate::crawler::SessionLauncher;
use crate::crawler::navigation::{RESPONSE_STATUS_SCRIPT, SITE_FILES_SCRIPT};
use crate::error::{CrawlError, DriverError};
use crate::parsers::metadata::RUNTIME_PROBE_SCRIPT;
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use scraper::{Html, Selector};
use serde_json::json;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub html: String,
    pub status: u16,
    /// `goto` itself fails (DNS, TLS, ...)
    pub unreachable: bool,
    /// Clicking any element on this page navigates here
    pub click_leads_to: Option<String>,
    /// XPath expressions treated as matching
    pub xpath_matches: Vec<String>,
}

#[derive(Default)]
struct State {
    pages: HashMap<String, MockPage>,
    current: Option<String>,
    visits: Vec<String>,
    filled: Vec<(String, String)>,
    clicks: Vec<String>,
    closes: usize,
    screenshot_fails: bool,
    runtime: serde_json::Value,
    site_files: Option<serde_json::Value>,
    cancel_after: Option<(usize, CancellationToken)>,
}

/// Cheap to clone; clones share the same site and call log
#[derive(Clone, Default)]
pub struct MockSite {
    state: Arc<Mutex<State>>,
}

impl MockSite {
    pub fn new() -> Self {
        let site = Self::default();
        site.state.lock().unwrap().runtime = json!({});
        site
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.page_with(
            url,
            MockPage {
                html: html.to_string(),
                status: 200,
                ..MockPage::default()
            },
        )
    }

    pub fn page_with(self, url: &str, page: MockPage) -> Self {
        self.state
            .lock()
            .unwrap()
            .pages
            .insert(url.to_string(), page);
        self
    }

    pub fn failing_screenshots(self) -> Self {
        self.state.lock().unwrap().screenshot_fails = true;
        self
    }

    pub fn runtime_markers(self, value: serde_json::Value) -> Self {
        self.state.lock().unwrap().runtime = value;
        self
    }

    pub fn site_files(self, value: serde_json::Value) -> Self {
        self.state.lock().unwrap().site_files = Some(value);
        self
    }

    /// Fire `token` once `visits` navigations have happened
    pub fn cancel_after(self, visits: usize, token: CancellationToken) -> Self {
        self.state.lock().unwrap().cancel_after = Some((visits, token));
        self
    }

    pub fn visits(&self) -> Vec<String> {
        self.state.lock().unwrap().visits.clone()
    }

    pub fn filled(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().filled.clone()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    fn current_page(&self) -> Result<MockPage, DriverError> {
        let state = self.state.lock().unwrap();
        state
            .current
            .as_ref()
            .and_then(|url| state.pages.get(url))
            .cloned()
            .ok_or_else(|| DriverError::Command("no page loaded".into()))
    }

    fn matches(&self, query: &ElementQuery) -> Result<bool, DriverError> {
        let page = self.current_page()?;
        Ok(match query {
            ElementQuery::Css(css) => css_matches(&page.html, css)?,
            ElementQuery::XPath(xpath) => page.xpath_matches.iter().any(|x| x == xpath),
        })
    }
}

fn css_matches(html: &str, css: &str) -> Result<bool, DriverError> {
    let selector =
        Selector::parse(css).map_err(|e| DriverError::Command(format!("invalid selector: {}", e)))?;
    let doc = Html::parse_document(html);
    let found = doc.select(&selector).next().is_some();
    Ok(found)
}

pub fn tiny_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]));
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).unwrap();
    png.into_inner()
}

#[async_trait]
impl PageDriver for MockSite {
    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        state.visits.push(url.to_string());
        if let Some((after, token)) = &state.cancel_after {
            if state.visits.len() >= *after {
                token.cancel();
            }
        }
        let reachable = state.pages.get(url).is_some_and(|page| !page.unreachable);
        if !reachable {
            return Err(DriverError::Command(format!(
                "net::ERR_NAME_NOT_RESOLVED at {}",
                url
            )));
        }
        state.current = Some(url.to_string());
        Ok(())
    }

    async fn wait_until(
        &self,
        _condition: WaitCondition,
        _timeout: Duration,
    ) -> Result<(), DriverError> {
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.state
            .lock()
            .unwrap()
            .current
            .clone()
            .ok_or_else(|| DriverError::Command("no page loaded".into()))
    }

    async fn source(&self) -> Result<String, DriverError> {
        Ok(self.current_page()?.html)
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError> {
        if script == RESPONSE_STATUS_SCRIPT {
            return Ok(json!(self.current_page()?.status));
        }
        let state = self.state.lock().unwrap();
        if script == RUNTIME_PROBE_SCRIPT {
            return Ok(state.runtime.clone());
        }
        if script == SITE_FILES_SCRIPT {
            return state
                .site_files
                .clone()
                .ok_or_else(|| DriverError::Script("XMLHttpRequest blocked".into()));
        }
        Err(DriverError::Script("unknown script".into()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        if self.state.lock().unwrap().screenshot_fails {
            return Err(DriverError::Screenshot("renderer crashed".into()));
        }
        Ok(tiny_png())
    }

    async fn exists(&self, query: &ElementQuery) -> Result<bool, DriverError> {
        self.matches(query)
    }

    async fn click_if_visible(
        &self,
        query: &ElementQuery,
        _timeout: Duration,
    ) -> Result<bool, DriverError> {
        if self.matches(query)? {
            self.click(query).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn fill(&self, query: &ElementQuery, value: &str) -> Result<(), DriverError> {
        if !self.matches(query)? {
            return Err(DriverError::ElementNotFound(query.to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .filled
            .push((query.to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&self, query: &ElementQuery) -> Result<(), DriverError> {
        let page = self.current_page()?;
        if !self.matches(query)? {
            return Err(DriverError::ElementNotFound(query.to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.clicks.push(query.to_string());
        if let Some(next) = page.click_leads_to {
            state.current = Some(next);
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// Hands out the same `MockSite` for every crawl, or fails to start
#[derive(Clone)]
pub struct MockLauncher {
    pub site: MockSite,
    pub fail: bool,
}

impl MockLauncher {
    pub fn new(site: MockSite) -> Self {
        Self { site, fail: false }
    }

    pub fn broken() -> Self {
        Self {
            site: MockSite::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl SessionLauncher for MockLauncher {
    type Page = MockSite;

    async fn initialize(&self, _settings: &CrawlSettings) -> Result<MockSite, CrawlError> {
        if self.fail {
            return Err(CrawlError::Session("chromedriver not reachable".into()));
        }
        Ok(self.site.clone())
    }
}

/// Settings with every wait shortened for tests
pub fn fast_settings() -> CrawlSettings {
    CrawlSettings {
        consent_timeout_ms: 0,
        consent_settle_ms: 0,
        login_settle_ms: 0,
        ..CrawlSettings::default()
    }
}
