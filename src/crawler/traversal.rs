use super::extract::extract_page_data;
use super::navigation::navigate_to_url;
use crate::browser::PageDriver;
use crate::config::CrawlSettings;
use crate::error::CrawlError;
use crate::filter::UrlFilter;
use crate::parsers::Parser;
use crate::results::{CrawlResult, LinkData};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Depth-first, bounded traversal over internal links.
///
/// Owns the visited set and the accumulating result for exactly one crawl.
pub struct Traversal<'a, P: PageDriver + ?Sized> {
    driver: &'a P,
    settings: &'a CrawlSettings,
    filter: &'a UrlFilter,
    origin: &'a Url,
    cancel: &'a CancellationToken,
    visited: HashSet<String>,
    result: CrawlResult,
}

impl<'a, P: PageDriver + ?Sized> Traversal<'a, P> {
    pub fn new(
        driver: &'a P,
        settings: &'a CrawlSettings,
        filter: &'a UrlFilter,
        origin: &'a Url,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            driver,
            settings,
            filter,
            origin,
            cancel,
            visited: HashSet::new(),
            result: CrawlResult::default(),
        }
    }

    /// Crawl from `root` and hand back the (not yet summarized) result.
    ///
    /// A failure on the root page is fatal; failures on any other page are
    /// recorded in `summary.errors` and the walk continues.
    pub async fn run(mut self, root: Url) -> Result<CrawlResult, CrawlError> {
        // Popped from the back; children are pushed in reverse so the first
        // discovered link is explored first.
        let mut work: Vec<(Url, usize)> = vec![(self.filter.normalize_url(&root), 0)];

        while let Some((url, depth)) = work.pop() {
            if self.result.pages.len() >= self.settings.max_pages {
                ::log::debug!("Page limit {} reached", self.settings.max_pages);
                break;
            }
            if depth > self.settings.max_depth || self.visited.contains(url.as_str()) {
                ::log::trace!("Skipping {} at depth {}", url, depth);
                continue;
            }
            if self.cancel.is_cancelled() {
                return Err(CrawlError::Cancelled);
            }

            self.visited.insert(url.to_string());
            match self.visit(&url, depth).await {
                Ok(children) => {
                    work.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
                }
                Err(e) if depth == 0 => return Err(e),
                Err(e) => {
                    ::log::warn!("Failed to crawl {}: {}", url, e);
                    self.result
                        .summary
                        .errors
                        .push(format!("Failed to crawl {}: {}", url, e));
                }
            }
        }

        ::log::info!(
            "Traversal finished: {} pages visited, {} failed",
            self.result.pages.len(),
            self.result.summary.errors.len()
        );
        Ok(self.result)
    }

    /// Load and capture one page, returning the links to follow from it
    async fn visit(&mut self, url: &Url, depth: usize) -> Result<Vec<Url>, CrawlError> {
        ::log::info!("Crawling {} (depth {})", url, depth);

        navigate_to_url(self.driver, url.as_str(), self.settings)
            .await
            .map_err(|e| CrawlError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let extraction = extract_page_data(self.driver, url, self.origin, self.settings).await;

        if depth == 0 {
            if let Some(source) = &extraction.source {
                self.result.navigation = Parser::parse_navigation(source, url);
            }
        }

        let children = self.select_links(&extraction.page.links);
        self.result.push_page(extraction.page);
        Ok(children)
    }

    /// First `max_links_per_page` followable links not yet visited, in
    /// document order
    fn select_links(&self, links: &[LinkData]) -> Vec<Url> {
        let mut seen = HashSet::new();
        links
            .iter()
            .filter(|link| link.is_internal())
            .filter_map(|link| Url::parse(&link.href).ok())
            .filter(|url| self.filter.should_crawl(url))
            .map(|url| self.filter.normalize_url(&url))
            .filter(|url| !self.visited.contains(url.as_str()))
            .filter(|url| seen.insert(url.to_string()))
            .take(self.settings.max_links_per_page)
            .collect()
    }
}
