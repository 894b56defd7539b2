//! Per-stage statistics and the run report.
//!
//! Every contact a stage touches lands in exactly one counter; a stage
//! that stops early carries the reason with it. The report is what a run
//! hands back regardless of how far it got.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use netreach_core::error::ActionKind;

/// Why a stage stopped where it did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StageOutcome {
    /// Ran to the end of its batch.
    Completed,
    /// Daily ceiling reached; the stage stopped and later stages (with
    /// their own quotas) still run.
    QuotaExhausted {
        kind: ActionKind,
        resets_at: DateTime<Local>,
    },
}

impl Default for StageOutcome {
    fn default() -> Self {
        StageOutcome::Completed
    }
}

impl StageOutcome {
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, StageOutcome::QuotaExhausted { .. })
    }
}

/// Discovery stage counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryStats {
    pub total_found: u32,
    pub new_profiles: u32,
    pub duplicates: u32,
    pub pages_scraped: u32,
    pub errors: u32,
    pub outcome: StageOutcome,
}

/// Connect stage counters. Already-connected, already-pending, and
/// control-not-found are tallied apart from genuine failures.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectStats {
    pub attempted: u32,
    pub successful: u32,
    pub failed: u32,
    pub already_connected: u32,
    pub already_pending: u32,
    pub no_control_found: u32,
    pub errors: Vec<String>,
    pub outcome: StageOutcome,
}

/// Status-poll stage counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollStats {
    pub checked: u32,
    pub newly_accepted: u32,
    pub errors: u32,
}

/// Inbox sweep counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepStats {
    pub conversations_checked: u32,
    pub replies_detected: u32,
}

/// Messaging stage counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageStats {
    pub attempted: u32,
    pub successful: u32,
    pub failed: u32,
    pub no_control_found: u32,
    pub duplicates_skipped: u32,
    pub errors: Vec<String>,
    pub outcome: StageOutcome,
}

/// Everything one pipeline run produced. Stages that were disabled stay
/// `None`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the active-hours gate refused to start the run.
    pub deferred_until: Option<DateTime<Local>>,
    pub discovery: Option<DiscoveryStats>,
    pub connect: Option<ConnectStats>,
    pub status_poll: Option<PollStats>,
    pub inbox_sweep: Option<SweepStats>,
    pub messaging: Option<MessageStats>,
}

impl RunReport {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: now,
            finished_at: now,
            deferred_until: None,
            discovery: None,
            connect: None,
            status_poll: None,
            inbox_sweep: None,
            messaging: None,
        }
    }

    /// One-line digest for the log.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(d) = &self.discovery {
            parts.push(format!(
                "discovery {} found / {} new / {} dup",
                d.total_found, d.new_profiles, d.duplicates
            ));
        }
        if let Some(c) = &self.connect {
            parts.push(format!(
                "connect {} sent / {} failed / {} already",
                c.successful,
                c.failed,
                c.already_connected + c.already_pending
            ));
        }
        if let Some(p) = &self.status_poll {
            parts.push(format!("poll {} accepted", p.newly_accepted));
        }
        if let Some(s) = &self.inbox_sweep {
            parts.push(format!("sweep {} replies", s.replies_detected));
        }
        if let Some(m) = &self.messaging {
            parts.push(format!("messages {} sent / {} failed", m.successful, m.failed));
        }
        if parts.is_empty() {
            parts.push("no stages ran".to_string());
        }
        parts.join("; ")
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
