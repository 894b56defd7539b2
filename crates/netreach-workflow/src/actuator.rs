//! External collaborator traits.
//!
//! The Actuator performs UI actions against the live platform; the Parser
//! extracts structured data from whatever page the Actuator last drove to.
//! `find_control` takes an ordered fallback selector chain and returns the
//! first match, or `None` — a missing control is a normal result, never an
//! error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use netreach_core::error::Result;

/// Opaque handle to a control the Actuator located on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHandle {
    /// The selector that matched.
    pub selector: String,
}

impl ControlHandle {
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
        }
    }
}

/// A profile extracted from a results page, before it becomes a stored
/// contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    /// Stable slug from the profile URL path segment.
    pub id: String,
    pub name: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub profile_url: String,
}

/// A glance at one inbox conversation, enough to detect a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationPeek {
    pub contact_id: String,
    /// Whether the newest message in the thread came from the counterpart.
    pub last_message_from_contact: bool,
}

/// UI capabilities the workflow drives. Each call carries its own bounded
/// timeout on the implementation side; `type_text` is expected to pace
/// keystrokes for human-likeness.
#[async_trait]
pub trait Actuator: Send + Sync {
    /// Navigate and return the URL actually landed on (redirects included).
    async fn navigate(&self, url: &str) -> Result<String>;

    /// Try each selector in order; `Ok(None)` when none match.
    async fn find_control(&self, candidates: &[&str]) -> Result<Option<ControlHandle>>;

    async fn click(&self, handle: &ControlHandle) -> Result<()>;

    async fn type_text(&self, handle: &ControlHandle, text: &str) -> Result<()>;

    /// Scroll the page, simulating a human skimming it.
    async fn scroll(&self) -> Result<()>;

    async fn current_url(&self) -> Result<String>;
}

/// Extraction capabilities over the current page.
#[async_trait]
pub trait Parser: Send + Sync {
    /// Candidate profiles on the current results page. An empty list on a
    /// loaded page means "no more results", not an error.
    async fn extract_candidates(&self) -> Result<Vec<CandidateProfile>>;

    /// Recent inbox conversations on the current messaging page.
    async fn extract_conversations(&self) -> Result<Vec<ConversationPeek>>;

    /// Whether the profile page currently shown displays a connected badge.
    async fn shows_connected(&self) -> Result<bool>;
}
