//! DOM facet parsers. Each facet is a pure function of the page source.

pub mod forms;
pub mod html;
pub mod metadata;
pub mod navigation;


use crate::results::{
    ButtonData, FormData, HeadingData, ImageData, InputData, LinkData, NavigationData,
    PageMetadata,
};
use scraper::Html;
use url::Url;

/// Facets extracted from one page source
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    pub title: String,
    /// Visible body text
    pub content: String,
    pub forms: Vec<FormData>,
    pub links: Vec<LinkData>,
    pub images: Vec<ImageData>,
    pub headings: Vec<HeadingData>,
    pub buttons: Vec<ButtonData>,
    pub inputs: Vec<InputData>,
    pub metadata: PageMetadata,
}

/// Main parser that runs every facet over a document
pub struct Parser;

impl Parser {
    /// Parse a page source. `origin` decides which links are internal.
    pub fn parse_page(source: &str, page_url: &Url, origin: &Url) -> ParseResult {
        let doc = Html::parse_document(source);

        ParseResult {
            title: html::title(&doc),
            content: html::body_text(&doc),
            forms: forms::forms(&doc),
            links: html::links(&doc, page_url, origin),
            images: html::images(&doc, page_url),
            headings: html::headings(&doc),
            buttons: html::buttons(&doc),
            inputs: html::inputs(&doc),
            metadata: metadata::metadata(&doc, page_url),
        }
    }

    /// Site-wide navigation regions of a page source
    pub fn parse_navigation(source: &str, page_url: &Url) -> NavigationData {
        let doc = Html::parse_document(source);
        navigation::navigation(&doc, page_url)
    }
}
