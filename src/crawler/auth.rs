use super::navigation::{handle_consent_popups, navigate_to_url};
use crate::browser::{ElementQuery, PageDriver, selectors};
use crate::config::{CrawlSettings, LoginCredentials};
use crate::error::CrawlError;

/// Whether the post-submit page looked logged in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Verified,
    Unverified,
}

/// Fill and submit the login form.
///
/// Failing to open the login page or to find / fill / click a control is
/// fatal. An unverified login is not: the heuristics miss plenty of sites.
pub async fn authenticate<P>(
    driver: &P,
    credentials: &LoginCredentials,
    settings: &CrawlSettings,
) -> Result<LoginOutcome, CrawlError>
where
    P: PageDriver + ?Sized,
{
    if let Some(login_url) = &credentials.login_url {
        ::log::info!("Opening login page {}", login_url);
        navigate_to_url(driver, login_url, settings)
            .await
            .map_err(|e| {
                CrawlError::Authentication(format!("could not open {}: {}", login_url, e))
            })?;
        handle_consent_popups(driver, settings).await;
    }

    let username_field = locate(
        driver,
        "username field",
        selectors::chain(credentials.username_selector.as_deref(), selectors::USERNAME_FIELDS),
    )
    .await?;
    let password_field = locate(
        driver,
        "password field",
        selectors::chain(credentials.password_selector.as_deref(), selectors::PASSWORD_FIELDS),
    )
    .await?;
    let submit_button = locate(
        driver,
        "submit button",
        selectors::chain(credentials.submit_selector.as_deref(), selectors::SUBMIT_BUTTONS),
    )
    .await?;

    driver
        .fill(&username_field, &credentials.username)
        .await
        .map_err(|e| CrawlError::Authentication(format!("could not fill username: {}", e)))?;
    driver
        .fill(&password_field, &credentials.password)
        .await
        .map_err(|e| CrawlError::Authentication(format!("could not fill password: {}", e)))?;
    driver
        .click(&submit_button)
        .await
        .map_err(|e| CrawlError::Authentication(format!("could not submit login form: {}", e)))?;

    tokio::time::sleep(settings.login_settle()).await;

    let outcome = verify_login(driver).await;
    match outcome {
        LoginOutcome::Verified => ::log::info!("Login verified"),
        LoginOutcome::Unverified => {
            ::log::warn!("Could not verify login; continuing with the current page")
        }
    }
    Ok(outcome)
}

/// First query in `chain` that matches an element
async fn locate<P>(
    driver: &P,
    what: &str,
    chain: Vec<ElementQuery>,
) -> Result<ElementQuery, CrawlError>
where
    P: PageDriver + ?Sized,
{
    for query in chain {
        match driver.exists(&query).await {
            Ok(true) => {
                ::log::debug!("Using {} for {}", query, what);
                return Ok(query);
            }
            Ok(false) => {}
            Err(e) => ::log::trace!("Probe {} for {} failed: {}", query, what, e),
        }
    }
    Err(CrawlError::Authentication(format!("{} not found", what)))
}

/// Logged in if a logout control is present or the URL looks like a
/// dashboard / profile page
pub async fn verify_login<P>(driver: &P) -> LoginOutcome
where
    P: PageDriver + ?Sized,
{
    for indicator in selectors::logout_indicators() {
        if let Ok(true) = driver.exists(&indicator).await {
            return LoginOutcome::Verified;
        }
    }

    match driver.current_url().await {
        Ok(url) => {
            let url = url.to_lowercase();
            if selectors::LOGGED_IN_URL_MARKERS
                .iter()
                .any(|marker| url.contains(marker))
            {
                LoginOutcome::Verified
            } else {
                LoginOutcome::Unverified
            }
        }
        Err(_) => LoginOutcome::Unverified,
    }
}
