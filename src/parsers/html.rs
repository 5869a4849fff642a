use crate::results::{ButtonData, HeadingData, ImageData, InputData, LinkData, LinkType};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never reaches the reader
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg"];

/// Select every element matching `css` below `root`, in document order.
///
/// An unparsable selector matches nothing.
pub fn select_all<'a>(root: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => root.select(&selector).collect(),
        Err(e) => {
            ::log::warn!("Ignoring invalid selector {:?}: {}", css, e);
            Vec::new()
        }
    }
}

pub fn select_doc<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    select_all(doc.root_element(), css)
}

/// Text content of an element with whitespace collapsed
pub fn collapsed_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Attribute value, `None` when missing or blank
pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve `href` against `base`, dropping the fragment
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved)
}

/// Internal when the raw `href` is root-relative or mentions the origin host.
///
/// Only http(s) targets qualify, so `mailto:` and friends stay external.
pub fn classify(href: &str, resolved: &Url, origin: &Url) -> LinkType {
    let web = matches!(resolved.scheme(), "http" | "https");
    let root_relative = href.starts_with('/') && !href.starts_with("//");
    let names_origin = origin
        .host_str()
        .is_some_and(|host| href.to_ascii_lowercase().contains(host));
    if web && (root_relative || names_origin) {
        LinkType::Internal
    } else {
        LinkType::External
    }
}

pub fn title(doc: &Html) -> String {
    select_doc(doc, "title")
        .into_iter()
        .next()
        .map(collapsed_text)
        .unwrap_or_default()
}

/// Visible body text, whitespace collapsed
pub fn body_text(doc: &Html) -> String {
    let mut parts = Vec::new();
    for body in select_doc(doc, "body") {
        collect_visible_text(body, &mut parts);
    }
    collapse_whitespace(&parts.join(" "))
}

fn collect_visible_text<'a>(element: ElementRef<'a>, out: &mut Vec<&'a str>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push(&**text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            if !INVISIBLE_TAGS.contains(&child_element.value().name()) {
                collect_visible_text(child_element, out);
            }
        }
    }
}

/// Every `a[href]` in document order
pub fn links(doc: &Html, page_url: &Url, origin: &Url) -> Vec<LinkData> {
    let links: Vec<LinkData> = select_doc(doc, "a[href]")
        .into_iter()
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if href.is_empty() || href.to_ascii_lowercase().starts_with("javascript:") {
                return None;
            }
            let resolved = resolve(page_url, href)?;
            Some(LinkData {
                link_type: classify(href, &resolved, origin),
                href: resolved.to_string(),
                text: collapsed_text(a),
            })
        })
        .collect();

    ::log::debug!("HTML parser found {} links", links.len());
    links
}

pub fn images(doc: &Html, page_url: &Url) -> Vec<ImageData> {
    select_doc(doc, "img[src]")
        .into_iter()
        .filter_map(|img| {
            let src = attr(img, "src")?;
            let src = page_url
                .join(&src)
                .map(|u| u.to_string())
                .unwrap_or(src);
            Some(ImageData {
                src,
                alt: img.value().attr("alt").map(str::to_string),
                width: dimension(img, "width"),
                height: dimension(img, "height"),
            })
        })
        .collect()
}

fn dimension(img: ElementRef<'_>, name: &str) -> Option<u32> {
    attr(img, name)?.trim_end_matches("px").parse().ok()
}

pub fn headings(doc: &Html) -> Vec<HeadingData> {
    select_doc(doc, "h1, h2, h3, h4, h5, h6")
        .into_iter()
        .filter_map(|h| {
            let level = h.value().name().strip_prefix('h')?.parse().ok()?;
            Some(HeadingData {
                level,
                text: collapsed_text(h),
            })
        })
        .collect()
}

pub fn buttons(doc: &Html) -> Vec<ButtonData> {
    select_doc(doc, "button, input[type='button'], input[type='submit']")
        .into_iter()
        .map(|b| {
            let text = if b.value().name() == "input" {
                attr(b, "value").unwrap_or_default()
            } else {
                collapsed_text(b)
            };
            ButtonData {
                text,
                button_type: attr(b, "type"),
                id: attr(b, "id"),
                class: attr(b, "class"),
            }
        })
        .collect()
}

/// Data-entry controls; buttons and hidden inputs are excluded
pub fn inputs(doc: &Html) -> Vec<InputData> {
    select_doc(doc, "input, textarea, select")
        .into_iter()
        .filter_map(|el| {
            let input_type = match el.value().name() {
                "input" => attr(el, "type")
                    .map(|t| t.to_ascii_lowercase())
                    .unwrap_or_else(|| "text".to_string()),
                other => other.to_string(),
            };
            if matches!(input_type.as_str(), "hidden" | "button" | "submit") {
                return None;
            }
            Some(InputData {
                input_type,
                name: attr(el, "name"),
                id: attr(el, "id"),
                placeholder: attr(el, "placeholder"),
                required: el.value().attr("required").is_some(),
            })
        })
        .collect()
}
