use crate::browser::{PageDriver, WaitCondition, selectors};
use crate::config::CrawlSettings;
use crate::error::DriverError;
use crate::results::SiteFiles;
use std::time::{Duration, Instant};

/// Upper bound for the robots.txt / sitemap.xml probe
pub const SITE_FILE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Status of the main document; 0 when the browser does not expose it
pub const RESPONSE_STATUS_SCRIPT: &str = r#"
    var nav = (window.performance && performance.getEntriesByType)
        ? performance.getEntriesByType('navigation')[0]
        : null;
    return (nav && nav.responseStatus) ? nav.responseStatus : 0;
"#;

pub const SITE_FILES_SCRIPT: &str = r#"
    function exists(path) {
        try {
            var xhr = new XMLHttpRequest();
            xhr.open('HEAD', path, false);
            xhr.send(null);
            return xhr.status >= 200 && xhr.status < 400;
        } catch (e) {
            return false;
        }
    }
    return { robotsTxt: exists('/robots.txt'), sitemapXml: exists('/sitemap.xml') };
"#;

/// Load `url` and wait for the configured condition.
///
/// Load failures, timeouts and HTTP error statuses are returned to the caller.
pub async fn navigate_to_url<P>(
    driver: &P,
    url: &str,
    settings: &CrawlSettings,
) -> Result<(), DriverError>
where
    P: PageDriver + ?Sized,
{
    let condition = if settings.wait_for_network_idle {
        WaitCondition::NetworkIdle
    } else {
        WaitCondition::Load
    };

    driver.goto(url).await?;
    driver.wait_until(condition, settings.timeout()).await?;

    match driver.evaluate(RESPONSE_STATUS_SCRIPT).await {
        Ok(status) => match status.as_u64() {
            Some(code) if code >= 400 => Err(DriverError::HttpStatus(code as u16)),
            _ => Ok(()),
        },
        Err(e) => {
            ::log::trace!("Response status unavailable for {}: {}", url, e);
            Ok(())
        }
    }
}

/// Dismiss a cookie / consent overlay if one shows up.
///
/// Best-effort: every selector is probed in priority order, repeatedly, until
/// one is visible or the consent timeout runs out. Returns whether a button
/// was clicked; failures are swallowed.
pub async fn handle_consent_popups<P>(driver: &P, settings: &CrawlSettings) -> bool
where
    P: PageDriver + ?Sized,
{
    let buttons = selectors::consent_buttons();
    let deadline = Instant::now() + settings.consent_timeout();

    loop {
        for button in &buttons {
            match driver.click_if_visible(button, Duration::ZERO).await {
                Ok(true) => {
                    ::log::info!("Dismissed consent popup via {}", button);
                    tokio::time::sleep(settings.consent_settle()).await;
                    return true;
                }
                Ok(false) => {}
                Err(e) => ::log::trace!("Consent probe {} failed: {}", button, e),
            }
        }
        if Instant::now() >= deadline {
            ::log::debug!("No consent popup found");
            return false;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

/// Check for /robots.txt and /sitemap.xml on the current page's origin.
///
/// Fire-and-forget: anything but a clean answer within
/// [`SITE_FILE_PROBE_TIMEOUT`] reports both files as absent.
pub async fn probe_site_files<P>(driver: &P) -> SiteFiles
where
    P: PageDriver + ?Sized,
{
    let probe = tokio::time::timeout(SITE_FILE_PROBE_TIMEOUT, driver.evaluate(SITE_FILES_SCRIPT));
    match probe.await {
        Ok(Ok(value)) => serde_json::from_value(value).unwrap_or_default(),
        Ok(Err(e)) => {
            ::log::debug!("Site file probe failed: {}", e);
            SiteFiles::default()
        }
        Err(_) => {
            ::log::debug!("Site file probe timed out");
            SiteFiles::default()
        }
    }
}
