//! Error taxonomy for the whole workspace.
//!
//! Duplicates and already-in-state conditions are expected outcomes the
//! pipeline converts into statistics; quota exhaustion stops a stage;
//! checkpoint detection aborts the run. Only store-open failures and
//! checkpoints ever reach the top of a run.

use chrono::{DateTime, Local};

/// Workspace-wide result alias.
pub type Result<T> = std::result::Result<T, NetreachError>;

/// The class of outreach action a quota counter tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Connection,
    Message,
    Search,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Connection => write!(f, "connection"),
            ActionKind::Message => write!(f, "message"),
            ActionKind::Search => write!(f, "search"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NetreachError {
    /// The backing store could not be opened or queried.
    #[error("store: {0}")]
    Store(String),

    /// An active (non-withdrawn) connection request already exists.
    #[error("active connection request already exists for contact '{0}'")]
    DuplicateRequest(String),

    /// A message with this template was already sent to this contact.
    #[error("message '{template}' already sent to contact '{contact}'")]
    DuplicateMessage { contact: String, template: String },

    /// Today's ceiling for an action kind has been reached.
    #[error("daily {kind} quota exhausted: {current}/{limit} (resets at {resets_at})")]
    QuotaExceeded {
        kind: ActionKind,
        current: u32,
        limit: u32,
        resets_at: DateTime<Local>,
    },

    /// Template rendered to nothing after whitespace cleanup.
    #[error("rendered text is empty, check that template variables are provided")]
    EmptyRender,

    /// Rendered text exceeds the template's character limit.
    #[error("rendered text exceeds maximum length ({actual} > {max})")]
    RenderTooLong { actual: usize, max: usize },

    /// A placeholder in a template body is not in the variable vocabulary.
    #[error("unknown template variable '{0}'")]
    UnknownVariable(String),

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// No control matched after exhausting the fallback selector chain.
    #[error("no matching control found: {0}")]
    ControlNotFound(String),

    /// The profile already shows as connected.
    #[error("already connected")]
    AlreadyConnected,

    /// A connection request is already pending on the platform side.
    #[error("connection request already pending")]
    RequestPending,

    /// Platform verification/challenge page detected. Fatal for the run;
    /// requires manual intervention before the next one.
    #[error("verification checkpoint detected at {0}")]
    CheckpointDetected(String),

    /// Genuine automation failure (navigation, click, typing).
    #[error("actuator: {0}")]
    Actuator(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NetreachError {
    /// Whether this error must abort the entire run rather than the
    /// current contact or stage.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NetreachError::CheckpointDetected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_display() {
        assert_eq!(ActionKind::Connection.to_string(), "connection");
        assert_eq!(ActionKind::Message.to_string(), "message");
        assert_eq!(ActionKind::Search.to_string(), "search");
    }

    #[test]
    fn test_checkpoint_is_fatal() {
        let err = NetreachError::CheckpointDetected("https://example.com/checkpoint/".into());
        assert!(err.is_fatal());
        assert!(!NetreachError::AlreadyConnected.is_fatal());
        assert!(!NetreachError::DuplicateRequest("x".into()).is_fatal());
    }

    #[test]
    fn test_quota_error_message() {
        let err = NetreachError::QuotaExceeded {
            kind: ActionKind::Connection,
            current: 14,
            limit: 14,
            resets_at: Local::now(),
        };
        let msg = err.to_string();
        assert!(msg.contains("connection"));
        assert!(msg.contains("14/14"));
    }
}
