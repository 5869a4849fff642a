use crate::browser::PageDriver;
use crate::config::CrawlSettings;
use crate::error::DriverError;
use crate::parsers::Parser;
use crate::parsers::metadata::{RUNTIME_PROBE_SCRIPT, RuntimeMarkers};
use crate::results::PageData;
use crate::utils::png_to_jpeg;
use url::Url;

/// A captured page plus the source it was parsed from
pub struct Extraction {
    pub page: PageData,
    pub source: Option<String>,
}

/// Capture everything about the currently loaded page.
///
/// Never fails: each facet that cannot be captured leaves an entry in
/// `page.errors` and the remaining facets are still collected.
pub async fn extract_page_data<P>(
    driver: &P,
    page_url: &Url,
    origin: &Url,
    settings: &CrawlSettings,
) -> Extraction
where
    P: PageDriver + ?Sized,
{
    let mut errors = Vec::new();

    let screenshot = if settings.capture_screenshots {
        match capture_screenshot(driver, settings.screenshot_quality).await {
            Ok(jpeg) => Some(jpeg),
            Err(e) => {
                ::log::warn!("Screenshot of {} failed: {}", page_url, e);
                errors.push(match e {
                    DriverError::Screenshot(_) => e.to_string(),
                    other => format!("Screenshot failed: {}", other),
                });
                None
            }
        }
    } else {
        None
    };

    let source = match driver.source().await {
        Ok(source) => Some(source),
        Err(e) => {
            errors.push(format!("Failed to read page source: {}", e));
            None
        }
    };

    let runtime = match driver.evaluate(RUNTIME_PROBE_SCRIPT).await {
        Ok(value) => serde_json::from_value::<RuntimeMarkers>(value).unwrap_or_else(|e| {
            errors.push(format!("Technology detection failed: {}", e));
            RuntimeMarkers::default()
        }),
        Err(e) => {
            errors.push(format!("Technology detection failed: {}", e));
            RuntimeMarkers::default()
        }
    };

    let parsed = source
        .as_deref()
        .map(|s| Parser::parse_page(s, page_url, origin))
        .unwrap_or_default();

    let mut metadata = parsed.metadata;
    metadata.url = page_url.to_string();
    metadata.merge_runtime(runtime);

    ::log::debug!(
        "Extracted {}: {} forms, {} links, {} images, {} headings",
        page_url,
        parsed.forms.len(),
        parsed.links.len(),
        parsed.images.len(),
        parsed.headings.len()
    );

    let page = PageData {
        url: page_url.to_string(),
        title: parsed.title,
        screenshot,
        content: source.as_ref().map(|_| parsed.content),
        forms: parsed.forms,
        links: parsed.links,
        images: parsed.images,
        headings: parsed.headings,
        buttons: parsed.buttons,
        inputs: parsed.inputs,
        errors,
        metadata,
    };

    Extraction { page, source }
}

async fn capture_screenshot<P>(driver: &P, quality: u8) -> Result<Vec<u8>, DriverError>
where
    P: PageDriver + ?Sized,
{
    let png = driver.screenshot().await?;
    png_to_jpeg(&png, quality)
        .map_err(|e| DriverError::Screenshot(format!("could not encode JPEG: {}", e)))
}
