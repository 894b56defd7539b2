//! # NetReach Pacing
//!
//! The rate limiter: per-day ceilings for each action kind and a minimum
//! cooldown between consecutive actions. Every outreach action flows
//! through [`RateLimiter::record_action`] — the single choke point that
//! waits out the cooldown and bumps the day's counter. The last-action
//! timestamp is owned per instance, so independent limiters (tests,
//! multiple configurations) never interfere.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Days, Local};
use rand::Rng;
use tokio::sync::Mutex;

use netreach_core::config::QuotaConfig;
use netreach_core::error::{ActionKind, NetreachError, Result};
use netreach_store::{ContactStore, DailyQuota};

/// Warn once usage crosses this share of the daily ceiling.
const WARN_THRESHOLD_PERCENT: f64 = 80.0;

/// Ceilings and pacing durations for one limiter instance.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    pub max_connections_per_day: u32,
    pub max_messages_per_day: u32,
    pub max_searches_per_day: u32,
    /// Minimum wait between two consecutive actions.
    pub cooldown: Duration,
    /// Extra random wait in `0..=cooldown_jitter` added to every cooldown.
    pub cooldown_jitter: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            max_connections_per_day: 14,
            max_messages_per_day: 50,
            max_searches_per_day: 100,
            cooldown: Duration::from_secs(30),
            cooldown_jitter: Duration::from_secs(4),
        }
    }
}

impl From<&QuotaConfig> for PacingConfig {
    fn from(cfg: &QuotaConfig) -> Self {
        Self {
            max_connections_per_day: cfg.max_connections_per_day,
            max_messages_per_day: cfg.max_messages_per_day,
            max_searches_per_day: cfg.max_searches_per_day,
            cooldown: Duration::from_secs(cfg.cooldown_secs),
            cooldown_jitter: Duration::from_secs(cfg.cooldown_jitter_secs),
        }
    }
}

/// Quota-and-cooldown gate over the store's daily counters.
pub struct RateLimiter {
    store: Arc<ContactStore>,
    config: PacingConfig,
    /// When the last action finished. `None` until the first action, so
    /// the first action of a process never waits.
    last_action: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(store: Arc<ContactStore>, config: PacingConfig) -> Self {
        Self {
            store,
            config,
            last_action: Mutex::new(None),
        }
    }

    /// The configured ceiling for an action kind.
    pub fn limit_for(&self, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Connection => self.config.max_connections_per_day,
            ActionKind::Message => self.config.max_messages_per_day,
            ActionKind::Search => self.config.max_searches_per_day,
        }
    }

    fn count_for(quota: &DailyQuota, kind: ActionKind) -> u32 {
        match kind {
            ActionKind::Connection => quota.connection_count,
            ActionKind::Message => quota.message_count,
            ActionKind::Search => quota.search_count,
        }
    }

    /// Fail with `QuotaExceeded` if today's count for `kind` is at or
    /// above its ceiling. Does not consume quota; callers use this to
    /// test eligibility before paying the cooldown.
    pub fn check_quota(&self, kind: ActionKind) -> Result<()> {
        let quota = self.store.today_quota()?;
        let current = Self::count_for(&quota, kind);
        let limit = self.limit_for(kind);
        if current >= limit {
            return Err(NetreachError::QuotaExceeded {
                kind,
                current,
                limit,
                resets_at: next_midnight(),
            });
        }
        Ok(())
    }

    /// Wait out the remaining cooldown since the last action, then bump
    /// today's counter for `kind`. The last-action lock is held across
    /// the sleep so two tasks sharing one limiter cannot interleave
    /// inside the pacing window.
    pub async fn record_action(&self, kind: ActionKind) -> Result<()> {
        let mut last = self.last_action.lock().await;

        if let Some(at) = *last {
            let since = at.elapsed();
            let jitter = self.sample_jitter();
            let target = self.config.cooldown + jitter;
            if since < target {
                let wait = target - since;
                tracing::info!("applying cooldown: waiting {:.1}s", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }

        *last = Some(Instant::now());
        drop(last);

        self.store.increment_quota(kind)?;
        Ok(())
    }

    fn sample_jitter(&self) -> Duration {
        let max_ms = self.config.cooldown_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
    }

    /// Actions left before `kind` hits its ceiling today.
    pub fn remaining(&self, kind: ActionKind) -> Result<u32> {
        let quota = self.store.today_quota()?;
        let current = Self::count_for(&quota, kind);
        Ok(self.limit_for(kind).saturating_sub(current))
    }

    /// Share of the daily ceiling already used, 0–100.
    pub fn usage_percentage(&self, kind: ActionKind) -> Result<f64> {
        let quota = self.store.today_quota()?;
        let current = Self::count_for(&quota, kind);
        let limit = self.limit_for(kind);
        if limit == 0 {
            return Ok(0.0);
        }
        Ok(f64::from(current) / f64::from(limit) * 100.0)
    }

    /// Whether usage has crossed the warning threshold.
    pub fn should_warn(&self, kind: ActionKind) -> Result<bool> {
        Ok(self.usage_percentage(kind)? >= WARN_THRESHOLD_PERCENT)
    }

    /// Ceiling check plus an approach warning in the log.
    pub fn can_perform(&self, kind: ActionKind) -> Result<()> {
        self.check_quota(kind)?;
        if self.should_warn(kind).unwrap_or(false) {
            let remaining = self.remaining(kind).unwrap_or(0);
            tracing::warn!("approaching daily {kind} limit: {remaining} actions remaining");
        }
        Ok(())
    }

    /// A formatted usage report for today's counters.
    pub fn daily_summary(&self) -> Result<String> {
        let quota = self.store.today_quota()?;
        let conn_pct = self.usage_percentage(ActionKind::Connection)?;
        let msg_pct = self.usage_percentage(ActionKind::Message)?;
        let search_pct = self.usage_percentage(ActionKind::Search)?;

        Ok(format!(
            "Daily quota usage:\n  \
             Connections: {}/{} ({:.1}%)\n  \
             Messages:    {}/{} ({:.1}%)\n  \
             Searches:    {}/{} ({:.1}%)\n  \
             Resets at:   {}",
            quota.connection_count,
            self.config.max_connections_per_day,
            conn_pct,
            quota.message_count,
            self.config.max_messages_per_day,
            msg_pct,
            quota.search_count,
            self.config.max_searches_per_day,
            search_pct,
            next_midnight().format("%H:%M:%S"),
        ))
    }
}

/// The next local midnight, when all daily counters reset.
pub fn next_midnight() -> DateTime<Local> {
    let now = Local::now();
    (now.date_naive() + Days::new(1))
        .and_hms_opt(0, 0, 0)
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .unwrap_or(now)
}
