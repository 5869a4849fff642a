use super::html::{attr, select_doc, title};
use crate::results::PageMetadata;
use scraper::Html;
use serde::Deserialize;
use url::Url;

/// DOM root markers left behind by front-end frameworks
const REACT_MARKERS: &str = "[data-reactroot], [data-reactid], #__next";
const VUE_MARKERS: &str = "[data-v-app], [data-server-rendered], #__nuxt";
const ANGULAR_MARKERS: &str = "[ng-version], [ng-app], [data-ng-app], [ng-controller]";

/// Checks the page's JS globals; the DOM markers cover server-rendered roots
pub const RUNTIME_PROBE_SCRIPT: &str = r#"
    return {
        jquery: typeof window.jQuery !== 'undefined',
        react: typeof window.React !== 'undefined',
        vue: typeof window.Vue !== 'undefined',
        angular: typeof window.angular !== 'undefined' || typeof window.ng !== 'undefined'
    };
"#;

/// Technology globals reported by [`RUNTIME_PROBE_SCRIPT`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RuntimeMarkers {
    #[serde(default)]
    pub jquery: bool,
    #[serde(default)]
    pub react: bool,
    #[serde(default)]
    pub vue: bool,
    #[serde(default)]
    pub angular: bool,
}

/// Meta tags, title and framework markers found in the DOM
pub fn metadata(doc: &Html, page_url: &Url) -> PageMetadata {
    let mut meta = std::collections::BTreeMap::new();
    for tag in select_doc(doc, "meta[name], meta[property]") {
        let key = attr(tag, "name").or_else(|| attr(tag, "property"));
        if let (Some(key), Some(content)) = (key, tag.value().attr("content")) {
            meta.entry(key).or_insert_with(|| content.to_string());
        }
    }

    PageMetadata {
        title: title(doc),
        url: page_url.to_string(),
        meta,
        has_jquery: !select_doc(doc, "script[src*='jquery']").is_empty(),
        has_react: !select_doc(doc, REACT_MARKERS).is_empty(),
        has_vue: !select_doc(doc, VUE_MARKERS).is_empty(),
        has_angular: !select_doc(doc, ANGULAR_MARKERS).is_empty(),
    }
}

impl PageMetadata {
    /// Fold in what the live page reported
    pub fn merge_runtime(&mut self, markers: RuntimeMarkers) {
        self.has_jquery |= markers.jquery;
        self.has_react |= markers.react;
        self.has_vue |= markers.vue;
        self.has_angular |= markers.angular;
    }
}
