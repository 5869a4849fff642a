use super::html::{collapsed_text, resolve, select_doc};
use crate::results::{NavLink, NavigationData};
use scraper::{ElementRef, Html};
use url::Url;

const MAIN_NAV_LINKS: &str =
    "nav a[href], [role='navigation'] a[href], .navbar a[href], .nav a[href], .menu a[href]";
const FOOTER_LINKS: &str = "footer a[href], [role='contentinfo'] a[href]";
const BREADCRUMB_LINKS: &str = "[aria-label*='breadcrumb'] a[href], [aria-label*='Breadcrumb'] a[href], \
     .breadcrumb a[href], .breadcrumbs a[href], [itemtype*='BreadcrumbList'] a[href]";

/// Main navigation, footer navigation and breadcrumbs of a page
pub fn navigation(doc: &Html, page_url: &Url) -> NavigationData {
    let main_navigation = select_doc(doc, MAIN_NAV_LINKS)
        .into_iter()
        .filter(|a| !inside_footer(*a) && !inside_breadcrumb(*a))
        .filter_map(|a| nav_link(a, page_url))
        .collect();

    NavigationData {
        main_navigation,
        footer_navigation: nav_links(doc, FOOTER_LINKS, page_url),
        breadcrumbs: nav_links(doc, BREADCRUMB_LINKS, page_url),
    }
}

fn nav_links(doc: &Html, css: &str, page_url: &Url) -> Vec<NavLink> {
    select_doc(doc, css)
        .into_iter()
        .filter_map(|a| nav_link(a, page_url))
        .collect()
}

fn nav_link(a: ElementRef<'_>, page_url: &Url) -> Option<NavLink> {
    let href = resolve(page_url, a.value().attr("href")?)?;
    Some(NavLink {
        text: collapsed_text(a),
        href: href.to_string(),
    })
}

fn element_ancestors<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.ancestors().filter_map(ElementRef::wrap)
}

fn inside_footer(el: ElementRef<'_>) -> bool {
    element_ancestors(el).any(|a| {
        a.value().name() == "footer" || a.value().attr("role") == Some("contentinfo")
    })
}

fn inside_breadcrumb(el: ElementRef<'_>) -> bool {
    element_ancestors(el).any(|a| {
        let class = a.value().attr("class").unwrap_or_default();
        let label = a.value().attr("aria-label").unwrap_or_default();
        class.contains("breadcrumb") || label.to_ascii_lowercase().contains("breadcrumb")
    })
}
