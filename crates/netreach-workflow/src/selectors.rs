//! Platform URLs, fallback selector chains, and URL helpers.
//!
//! The platform reshuffles its markup every few months, so every UI action
//! carries an ordered chain of selectors tried front to back. When a
//! search suddenly yields zero results on pages that load fine, these
//! chains are the first place to look.

use netreach_core::config::SearchConfig;
use netreach_core::error::{NetreachError, Result};

pub const BASE_URL: &str = "https://www.linkedin.com";
pub const SEARCH_URL: &str = "https://www.linkedin.com/search/results/people/";
pub const PROFILE_BASE: &str = "https://www.linkedin.com/in/";
pub const NETWORK_URL: &str = "https://www.linkedin.com/mynetwork/";
pub const MESSAGING_URL: &str = "https://www.linkedin.com/messaging/";

// Profile page controls
pub const CONNECT_BUTTON: &[&str] = &[
    ".pvs-profile-actions button[aria-label*='Invite']",
    "button[aria-label='Connect']",
    "button[aria-label='Invite to connect']",
    "main button.artdeco-button--primary[data-control-name='connect']",
];
pub const MORE_ACTIONS_BUTTON: &[&str] = &[
    ".pvs-profile-actions button[aria-label='More actions']",
    "main button[aria-label='More actions']",
    "button.artdeco-dropdown__trigger",
];
pub const CONNECT_MENU_ITEM: &[&str] = &[
    "div[role='menu'] div[aria-label*='connect']",
    "div[role='menu'] li-icon[type='connect']",
    "div.artdeco-dropdown__content div[data-control-name='connect']",
];
pub const ALREADY_CONNECTED_BADGE: &[&str] = &[
    "main .distance-badge .dist-value",
    "main span.dist-value",
];
pub const PENDING_BADGE: &[&str] = &[
    "main button[aria-label*='Pending']",
    "main span.artdeco-button__text",
];

// Connection request modal
pub const ADD_NOTE_BUTTON: &[&str] = &[
    "button[aria-label='Add a note']",
    ".artdeco-modal button.artdeco-button--secondary",
];
pub const NOTE_TEXTAREA: &[&str] = &[
    "textarea[name='message']",
    "textarea#custom-message",
    ".artdeco-modal textarea",
];
pub const SEND_INVITE_BUTTON: &[&str] = &[
    "button[aria-label='Send now']",
    "button[aria-label='Send invitation']",
    ".artdeco-modal button.artdeco-button--primary",
];

// Messaging controls
pub const MESSAGE_BUTTON: &[&str] = &[
    "button[aria-label^='Message']",
    ".pvs-profile-actions a[href^='/messaging/thread']",
    "main button.artdeco-button--primary",
];
pub const MESSAGE_INPUT: &[&str] = &[
    "div[role='textbox'][aria-label^='Write a message']",
    ".msg-form__contenteditable",
];
pub const MESSAGE_SEND_BUTTON: &[&str] = &[
    ".msg-form__send-button",
    "button[type='submit']",
];
pub const CONVERSATION_LIST: &[&str] = &[
    ".msg-conversation-listitem",
    ".msg-conversations-container__convo-item",
];

// Search pagination
pub const PAGINATION_NEXT: &[&str] = &[
    ".artdeco-pagination__button--next",
    "button[aria-label='Next']",
];

/// URL fragments that mark a verification/challenge page. Hitting one of
/// these aborts the run; a human has to clear it.
const CHECKPOINT_PATTERNS: &[&str] = &[
    "/checkpoint/",
    "/challenge/",
    "/uas/login-verification",
    "/uas/challenge",
    "/cap/",
];

/// Whether a URL points at a verification/challenge page.
pub fn is_checkpoint(url: &str) -> bool {
    CHECKPOINT_PATTERNS.iter().any(|p| url.contains(p))
}

/// Extract the stable profile slug from a profile URL.
/// `https://www.linkedin.com/in/ada-l/?x=1` → `ada-l`.
pub fn profile_id_from_url(url: &str) -> Option<String> {
    let start = url.find("/in/")? + 4;
    let rest = &url[start..];
    let end = rest.find(|c| c == '/' || c == '?').unwrap_or(rest.len());
    let id = &rest[..end];
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Canonical profile URL for a contact identifier.
pub fn profile_url(contact_id: &str) -> String {
    format!("{PROFILE_BASE}{contact_id}/")
}

/// Build a people-search URL from the configured criteria. Fails if no
/// criterion is set at all — an unconstrained search is never intended.
pub fn search_url(config: &SearchConfig) -> Result<String> {
    let mut params: Vec<(&str, String)> = Vec::new();
    if !config.keywords.is_empty() {
        params.push(("keywords", config.keywords.clone()));
    }
    if !config.job_title.is_empty() {
        params.push(("title", config.job_title.clone()));
    }
    if !config.company.is_empty() {
        params.push(("company", config.company.clone()));
    }
    if !config.location.is_empty() {
        match location_urn(&config.location) {
            Some(urn) => params.push(("geoUrn", format!("[\"urn:li:fs_geo:{urn}\"]"))),
            None => tracing::warn!("location '{}' not in location map, skipping", config.location),
        }
    }
    if params.is_empty() {
        return Err(NetreachError::Config(
            "at least one search criterion is required".into(),
        ));
    }

    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{k}={}", encode_query(v)))
        .collect();
    Ok(format!("{SEARCH_URL}?{}", query.join("&")))
}

/// Minimal percent-encoding for query values.
fn encode_query(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push_str("%20"),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// Geo-URN codes for the location filter. The platform keys its location
/// facet on these internal identifiers rather than names.
const LOCATION_URNS: &[(&str, &str)] = &[
    ("San Francisco Bay Area", "90000084"),
    ("New York City Area", "90000070"),
    ("Los Angeles", "90000071"),
    ("Chicago", "90000074"),
    ("Boston", "90000075"),
    ("Seattle", "90000076"),
    ("Austin", "90000073"),
    ("Denver", "90000077"),
    ("Washington DC", "90000078"),
    ("Atlanta", "90000079"),
    ("Dallas", "90000080"),
    ("Miami", "90000081"),
    ("California", "102095887"),
    ("New York", "105080838"),
    ("Texas", "102748797"),
    ("Florida", "104022003"),
    ("Massachusetts", "104842724"),
    ("Washington", "103977809"),
    ("United States", "103644278"),
    ("United Kingdom", "101165590"),
    ("Canada", "101174742"),
    ("Germany", "101282230"),
    ("France", "105015875"),
    ("India", "102713980"),
    ("Australia", "101452733"),
    ("Netherlands", "102890719"),
    ("Singapore", "102454443"),
    ("Brazil", "106057199"),
    ("Japan", "101355337"),
    ("Spain", "105646813"),
    ("Italy", "103350119"),
    ("Mexico", "103323778"),
    ("London", "90009496"),
    ("Berlin", "106967730"),
    ("Paris", "105015875"),
    ("Sydney", "104769905"),
    ("Bangalore", "105214831"),
    ("Amsterdam", "100561920"),
    ("Tokyo", "104738515"),
    ("Hong Kong", "102279293"),
    ("Dubai", "104305776"),
];

/// Look up the geo-URN for a location name.
pub fn location_urn(name: &str) -> Option<&'static str> {
    LOCATION_URNS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, urn)| *urn)
}
