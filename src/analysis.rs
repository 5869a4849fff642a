//! Post-traversal pass: feature inference and summary totals.

use crate::results::{CrawlResult, CrawlSummary, PageData, SiteFeatures};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Login,
    Search,
    Cart,
    UserProfile,
    Comments,
    Ratings,
}

impl SiteFeatures {
    /// Flags only ever go from false to true
    pub fn mark(&mut self, feature: Feature) {
        match feature {
            Feature::Login => self.has_login = true,
            Feature::Search => self.has_search = true,
            Feature::Cart => self.has_cart = true,
            Feature::UserProfile => self.has_user_profile = true,
            Feature::Comments => self.has_comments = true,
            Feature::Ratings => self.has_ratings = true,
        }
    }

    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::Login => self.has_login,
            Feature::Search => self.has_search,
            Feature::Cart => self.has_cart,
            Feature::UserProfile => self.has_user_profile,
            Feature::Comments => self.has_comments,
            Feature::Ratings => self.has_ratings,
        }
    }
}

/// Lower-cased views of a page that the feature triggers inspect
pub struct PageEvidence {
    pub text: String,
    /// Link hrefs and link texts
    pub links: Vec<String>,
    pub field_names: Vec<String>,
    pub field_types: Vec<String>,
}

impl PageEvidence {
    pub fn from_page(page: &PageData) -> Self {
        let fields = page.forms.iter().flat_map(|f| f.fields.iter());
        Self {
            text: page.content.as_deref().unwrap_or_default().to_lowercase(),
            links: page
                .links
                .iter()
                .flat_map(|l| [l.href.to_lowercase(), l.text.to_lowercase()])
                .collect(),
            field_names: fields
                .clone()
                .filter_map(|f| f.name.as_deref())
                .map(str::to_lowercase)
                .collect(),
            field_types: fields.map(|f| f.field_type.to_lowercase()).collect(),
        }
    }

    fn text_has(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.text.contains(n))
    }

    fn link_has(&self, needles: &[&str]) -> bool {
        self.links
            .iter()
            .any(|l| needles.iter().any(|n| l.contains(n)))
    }

    fn field_named(&self, needle: &str) -> bool {
        self.field_names.iter().any(|n| n.contains(needle))
    }
}

pub type Trigger = fn(&PageEvidence) -> bool;

fn login(p: &PageEvidence) -> bool {
    p.field_types.iter().any(|t| t == "password") || p.text_has(&["login", "sign in"])
}

fn search(p: &PageEvidence) -> bool {
    p.field_named("search") || p.text_has(&["search"])
}

fn cart(p: &PageEvidence) -> bool {
    p.text_has(&["cart", "shopping"]) || p.link_has(&["cart", "shopping"])
}

fn user_profile(p: &PageEvidence) -> bool {
    p.text_has(&["profile", "account"]) || p.link_has(&["profile", "account"])
}

fn comments(p: &PageEvidence) -> bool {
    p.text_has(&["comment", "review"]) || p.field_named("comment")
}

fn ratings(p: &PageEvidence) -> bool {
    p.text_has(&["rating", "star", "review"])
}

/// The heuristic catalog: a feature is present if any page trips its trigger
pub const FEATURE_RULES: &[(Feature, Trigger)] = &[
    (Feature::Login, login),
    (Feature::Search, search),
    (Feature::Cart, cart),
    (Feature::UserProfile, user_profile),
    (Feature::Comments, comments),
    (Feature::Ratings, ratings),
];

/// Features detected on a set of pages
pub fn detect_features(pages: &[PageData]) -> SiteFeatures {
    let mut features = SiteFeatures::default();
    for page in pages {
        let evidence = PageEvidence::from_page(page);
        for (feature, trigger) in FEATURE_RULES {
            if !features.has(*feature) && trigger(&evidence) {
                ::log::debug!("Detected {:?} on {}", feature, page.url);
                features.mark(*feature);
            }
        }
    }
    features
}

/// Totals over all pages. `crawl_errors` are the traversal-scoped errors;
/// page-scoped errors are appended after them, prefixed with the page URL.
pub fn summarize(pages: &[PageData], crawl_errors: Vec<String>) -> CrawlSummary {
    let mut errors = crawl_errors;
    for page in pages {
        errors.extend(page.errors.iter().map(|e| format!("{}: {}", page.url, e)));
    }

    CrawlSummary {
        total_pages: pages.len(),
        total_forms: pages.iter().map(|p| p.forms.len()).sum(),
        total_links: pages.iter().map(|p| p.links.len()).sum(),
        total_images: pages.iter().map(|p| p.images.len()).sum(),
        errors,
    }
}

/// Finalize a crawl result in place
pub fn analyze(result: &mut CrawlResult) {
    let crawl_errors = std::mem::take(&mut result.summary.errors);
    result.summary = summarize(&result.pages, crawl_errors);
    result.features = detect_features(&result.pages);

    ::log::info!(
        "Summary: {} pages, {} forms, {} links, {} images, {} errors",
        result.summary.total_pages,
        result.summary.total_forms,
        result.summary.total_links,
        result.summary.total_images,
        result.summary.errors.len()
    );
}
