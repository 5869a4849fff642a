use thiserror::Error;

/// Fatal errors surfaced to the caller of a crawl.
///
/// Anything attributable to a single non-root page is rendered into
/// `CrawlSummary::errors` instead and never reaches this type.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to start browser session: {0}")]
    Session(String),

    #[error("Failed to navigate to {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("Browser error: {0}")]
    Driver(#[from] DriverError),

    #[error("Artifact store error: {0}")]
    Store(String),

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

/// Errors raised by a [`crate::browser::PageDriver`] implementation.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{0}")]
    Command(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),
}

impl From<fantoccini::error::CmdError> for DriverError {
    fn from(error: fantoccini::error::CmdError) -> Self {
        if error.is_no_such_element() {
            DriverError::ElementNotFound(error.to_string())
        } else {
            DriverError::Command(error.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
