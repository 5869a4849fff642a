//! Ordered selector tables. Earlier rows win.

use super::ElementQuery;

/// Lower-cases the text of the context node for case-insensitive XPath matching
macro_rules! lower_text {
    () => {
        "translate(normalize-space(.), 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz')"
    };
}

pub const CONSENT_CSS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "#CybotCookiebotDialogBodyLevelButtonLLSelectAll",
    "#CybotCookiebotDialogBodyButtonAccept",
    "button[id*='accept']",
    "button[class*='accept']",
    "button[data-testid*='accept']",
    "[aria-label*='Accept']",
    "[aria-label*='accept']",
    "[aria-label*='Consent']",
    ".cookie-consent button",
    ".cookie-banner button",
    "#cookie-banner button",
];

pub const CONSENT_XPATH: &[&str] = &[
    concat!("//button[contains(", lower_text!(), ", 'accept all')]"),
    concat!("//button[contains(", lower_text!(), ", 'accept')]"),
    concat!("//button[contains(", lower_text!(), ", 'agree')]"),
    concat!("//button[contains(", lower_text!(), ", 'allow all')]"),
    concat!("//button[contains(", lower_text!(), ", 'got it')]"),
    concat!("//a[contains(", lower_text!(), ", 'accept')]"),
];

pub const USERNAME_FIELDS: &[&str] = &[
    "input[type='email']",
    "input[name='username']",
    "input[name='email']",
    "input[name='user']",
    "input[name='login']",
    "input[id='username']",
    "input[id='email']",
    "input[autocomplete='username']",
    "input[type='text']",
];

pub const PASSWORD_FIELDS: &[&str] = &[
    "input[type='password']",
    "input[name='password']",
    "input[id='password']",
];

pub const SUBMIT_BUTTONS: &[&str] = &[
    "button[type='submit']",
    "input[type='submit']",
    "button[name='login']",
    "button[id*='login']",
    "button[class*='login']",
    "form button",
];

pub const LOGOUT_CSS: &[&str] = &[
    "a[href*='logout']",
    "a[href*='signout']",
    "a[href*='sign-out']",
    "button[id*='logout']",
    "[data-testid*='logout']",
];

pub const LOGOUT_XPATH: &[&str] = &[
    concat!("//*[self::a or self::button][contains(", lower_text!(), ", 'logout')]"),
    concat!("//*[self::a or self::button][contains(", lower_text!(), ", 'log out')]"),
    concat!("//*[self::a or self::button][contains(", lower_text!(), ", 'sign out')]"),
];

/// URL fragments that indicate a logged-in landing page
pub const LOGGED_IN_URL_MARKERS: &[&str] = &["dashboard", "profile"];

/// Consent buttons in priority order: attribute based, then text based
pub fn consent_buttons() -> Vec<ElementQuery> {
    CONSENT_CSS
        .iter()
        .map(|s| ElementQuery::css(*s))
        .chain(CONSENT_XPATH.iter().map(|x| ElementQuery::xpath(*x)))
        .collect()
}

pub fn logout_indicators() -> Vec<ElementQuery> {
    LOGOUT_CSS
        .iter()
        .map(|s| ElementQuery::css(*s))
        .chain(LOGOUT_XPATH.iter().map(|x| ElementQuery::xpath(*x)))
        .collect()
}

/// Fallback chain, or the single override when one is configured
pub fn chain(custom: Option<&str>, defaults: &[&str]) -> Vec<ElementQuery> {
    match custom {
        Some(selector) => vec![ElementQuery::css(selector)],
        None => defaults.iter().map(|s| ElementQuery::css(*s)).collect(),
    }
}
