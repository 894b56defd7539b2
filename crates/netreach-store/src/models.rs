//! Entity definitions — the persistent data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discovered profile, keyed by the stable slug from its profile URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Stable identifier derived from the profile URL path segment.
    pub id: String,
    pub name: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub profile_url: String,
    /// First discovery; never updated after insert.
    pub first_seen: DateTime<Utc>,
    /// Bumped on every re-discovery.
    pub last_seen: DateTime<Utc>,
}

impl Contact {
    /// Build a contact first seen now.
    pub fn discovered(
        id: &str,
        name: &str,
        title: &str,
        company: &str,
        location: &str,
        profile_url: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            name: name.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            location: location.to_string(),
            profile_url: profile_url.to_string(),
            first_seen: now,
            last_seen: now,
        }
    }
}

/// Lifecycle of a connection request. Transitions out of `Pending` happen
/// only through explicit status checks and never regress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
            RequestStatus::Withdrawn => "withdrawn",
        }
    }

    /// Parse a stored status string. Unknown strings map to `Pending` so a
    /// hand-edited database cannot produce an unrepresentable state.
    pub fn parse(s: &str) -> Self {
        match s {
            "accepted" => RequestStatus::Accepted,
            "rejected" => RequestStatus::Rejected,
            "withdrawn" => RequestStatus::Withdrawn,
            _ => RequestStatus::Pending,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One outreach attempt toward a contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRequest {
    pub id: i64,
    pub contact_id: String,
    pub sent_at: DateTime<Utc>,
    /// Rendered note text, if one was attached.
    pub note: Option<String>,
    pub status: RequestStatus,
    pub has_replied: bool,
    pub created_at: DateTime<Utc>,
}

/// A direct message delivered to an accepted contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachMessage {
    pub id: i64,
    pub contact_id: String,
    pub template_id: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Per-calendar-day action counters, keyed by local date (`YYYY-MM-DD`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyQuota {
    pub date: String,
    pub connection_count: u32,
    pub message_count: u32,
    pub search_count: u32,
    pub last_updated: DateTime<Utc>,
}

impl DailyQuota {
    /// A fresh all-zero bucket for the given date key.
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            connection_count: 0,
            message_count: 0,
            search_count: 0,
            last_updated: Utc::now(),
        }
    }
}
