use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything captured for a single visited page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    /// URL of the page as it was requested
    pub url: String,

    /// Title of the page (empty when the document has none)
    pub title: String,

    /// JPEG screenshot, base64 encoded when serialized
    #[serde(
        default,
        with = "screenshot_base64",
        skip_serializing_if = "Option::is_none"
    )]
    pub screenshot: Option<Vec<u8>>,

    /// Visible body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    pub forms: Vec<FormData>,
    pub links: Vec<LinkData>,
    pub images: Vec<ImageData>,
    pub headings: Vec<HeadingData>,
    pub buttons: Vec<ButtonData>,
    pub inputs: Vec<InputData>,

    /// Page-scoped extraction failures
    pub errors: Vec<String>,

    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub id: Option<String>,
    pub action: Option<String>,
    pub method: String,
    pub fields: Vec<FormFieldData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldData {
    pub name: Option<String>,
    /// `type` attribute for inputs, tag name for select / textarea
    pub field_type: String,
    pub required: bool,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub label: Option<String>,
    /// Option texts, only populated for `select`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkData {
    /// Absolute URL, fragment removed
    pub href: String,
    pub text: String,
    pub link_type: LinkType,
}

impl LinkData {
    pub fn is_internal(&self) -> bool {
        self.link_type == LinkType::Internal
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub src: String,
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingData {
    /// 1 through 6
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonData {
    pub text: String,
    pub button_type: Option<String>,
    pub id: Option<String>,
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputData {
    pub input_type: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub placeholder: Option<String>,
    pub required: bool,
}

/// Meta tags plus detected front-end technology markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    pub url: String,
    /// `meta[name]` / `meta[property]` -> `content`
    pub meta: BTreeMap<String, String>,
    pub has_jquery: bool,
    pub has_react: bool,
    pub has_vue: bool,
    pub has_angular: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub text: String,
    pub href: String,
}

/// Site-wide navigation regions, taken from the root page only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationData {
    pub main_navigation: Vec<NavLink>,
    pub footer_navigation: Vec<NavLink>,
    pub breadcrumbs: Vec<NavLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    pub total_pages: usize,
    pub total_forms: usize,
    pub total_links: usize,
    pub total_images: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFeatures {
    pub has_login: bool,
    pub has_search: bool,
    pub has_cart: bool,
    pub has_user_profile: bool,
    pub has_comments: bool,
    pub has_ratings: bool,
}

/// Existence of well-known files on the target origin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteFiles {
    pub robots_txt: bool,
    pub sitemap_xml: bool,
}

/// The terminal artifact of a crawl
///
/// `sitemap[i] == pages[i].url` for every `i`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    pub pages: Vec<PageData>,
    pub sitemap: Vec<String>,
    pub summary: CrawlSummary,
    pub navigation: NavigationData,
    pub features: SiteFeatures,
    pub site_files: SiteFiles,
}

impl CrawlResult {
    /// Append a page, keeping `pages` and `sitemap` in lock-step
    pub fn push_page(&mut self, page: PageData) {
        self.sitemap.push(page.url.clone());
        self.pages.push(page);
    }
}

mod screenshot_base64 {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => s.serialize_str(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded = Option::<String>::deserialize(d)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_page_keeps_sitemap_in_step() {
        let mut result = CrawlResult::default();
        for url in ["https://a.test/", "https://a.test/x"] {
            result.push_page(PageData {
                url: url.to_string(),
                ..PageData::default()
            });
        }
        assert_eq!(result.sitemap, vec!["https://a.test/", "https://a.test/x"]);
        assert_eq!(result.pages[1].url, result.sitemap[1]);
    }

    #[test]
    fn test_screenshot_serializes_as_base64() {
        let page = PageData {
            url: "https://a.test/".into(),
            screenshot: Some(vec![0xff, 0xd8, 0xff]),
            ..PageData::default()
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["screenshot"], "/9j/");

        let back: PageData = serde_json::from_value(json).unwrap();
        assert_eq!(back.screenshot, Some(vec![0xff, 0xd8, 0xff]));

        let without = PageData::default();
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("screenshot").is_none());
    }
}
