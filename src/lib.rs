//! Bounded, stateful site crawler on top of a WebDriver browser.
//!
//! A crawl loads the target, dismisses consent overlays, optionally logs in,
//! walks internal links depth-first within page and depth limits, and returns a
//! [`CrawlResult`] with per-page captures, root navigation, feature flags and
//! totals.

pub mod analysis;
pub mod browser;
pub mod config;
pub mod crawler;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod results;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{CrawlSettings, CrawlerConfig, LoginCredentials};
pub use crawler::Crawler;
pub use error::{CrawlError, Result};
pub use results::{CrawlResult, PageData};
pub use store::{ArtifactStore, DirectoryStore, persist_artifacts};
