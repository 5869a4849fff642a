//! Browser capability used by the crawler.
//!
//! The crawler only talks to a [`PageDriver`]: one page in one browser
//! session. [`webdriver::WebDriverPage`] is the production implementation,
//! backed by a fantoccini WebDriver client.

pub mod selectors;
pub mod webdriver;

use crate::error::DriverError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

pub use webdriver::{BrowserSession, WebDriverPage};

/// How an element is located on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementQuery {
    Css(String),
    XPath(String),
}

impl ElementQuery {
    pub fn css(selector: impl Into<String>) -> Self {
        ElementQuery::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        ElementQuery::XPath(expression.into())
    }
}

impl fmt::Display for ElementQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementQuery::Css(selector) => write!(f, "css={}", selector),
            ElementQuery::XPath(expression) => write!(f, "xpath={}", expression),
        }
    }
}

/// When a navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// `document.readyState == "complete"`
    Load,
    /// Load plus no new network resources for a quiet period
    NetworkIdle,
}

/// A single controllable browser page.
///
/// Implementations are not reentrant: callers issue one command at a time.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url` in the page
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    /// Block until `condition` holds or `timeout` elapses
    async fn wait_until(&self, condition: WaitCondition, timeout: Duration)
    -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// Serialized DOM of the current page
    async fn source(&self) -> Result<String, DriverError>;

    /// Run a script in the page and return its JSON result
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, DriverError>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    /// Whether at least one element matches
    async fn exists(&self, query: &ElementQuery) -> Result<bool, DriverError>;

    /// Click the first match once it is visible. Returns `Ok(false)` when no
    /// visible match appears within `timeout`.
    async fn click_if_visible(
        &self,
        query: &ElementQuery,
        timeout: Duration,
    ) -> Result<bool, DriverError>;

    /// Type `value` into the first match
    async fn fill(&self, query: &ElementQuery, value: &str) -> Result<(), DriverError>;

    /// Click the first match
    async fn click(&self, query: &ElementQuery) -> Result<(), DriverError>;

    /// Release the page and its browser
    async fn close(&self) -> Result<(), DriverError>;
}
