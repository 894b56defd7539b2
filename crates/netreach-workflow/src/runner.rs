//! The stage pipeline: discovery → connect → status poll → inbox sweep →
//! messaging.
//!
//! Each stage is independently skippable and independently quota-gated.
//! Per-contact errors become counters at the stage boundary; quota
//! exhaustion ends only the current stage; a checkpoint page aborts the
//! whole run. There is no in-stage retry — the next run re-drives
//! anything left unfinished, and every repository write is idempotent or
//! duplicate-checked so that is always safe.

use std::sync::Arc;

use chrono::{Local, Utc};

use netreach_core::config::NetreachConfig;
use netreach_core::error::{ActionKind, NetreachError, Result};
use netreach_pacing::RateLimiter;
use netreach_store::{Contact, ContactStore, RequestStatus};
use netreach_templates::{render, render_subject, template_by_id, MessageTemplate, TemplateKind, TemplateVars};

use crate::actuator::{Actuator, CandidateProfile, Parser};
use crate::schedule;
use crate::selectors;
use crate::stats::{
    ConnectStats, DiscoveryStats, MessageStats, PollStats, RunReport, StageOutcome, SweepStats,
};

/// Conversations inspected per inbox sweep.
const INBOX_SWEEP_LIMIT: usize = 10;

/// Drives one pass of the pipeline over the shared store, limiter, and
/// the two external collaborators.
pub struct WorkflowRunner {
    store: Arc<ContactStore>,
    limiter: Arc<RateLimiter>,
    config: NetreachConfig,
    actuator: Arc<dyn Actuator>,
    parser: Arc<dyn Parser>,
}

impl WorkflowRunner {
    pub fn new(
        store: Arc<ContactStore>,
        limiter: Arc<RateLimiter>,
        config: NetreachConfig,
        actuator: Arc<dyn Actuator>,
        parser: Arc<dyn Parser>,
    ) -> Self {
        Self {
            store,
            limiter,
            config,
            actuator,
            parser,
        }
    }

    /// Execute the enabled stages in order. Returns the per-stage counts;
    /// errors out only on a checkpoint page, which needs a human before
    /// the next run.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::new();

        if self.config.schedule.enabled {
            let now = Local::now();
            if !schedule::is_active_hours(&self.config.schedule, now) {
                let resume = schedule::next_active_time(&self.config.schedule, now);
                tracing::warn!(
                    "outside active hours, next window opens {}",
                    resume.format("%Y-%m-%d %H:%M")
                );
                report.deferred_until = Some(resume);
                report.finished_at = Utc::now();
                return Ok(report);
            }
        }

        tracing::info!("run {} starting", report.run_id);

        if self.config.stages.discovery {
            report.discovery = Some(self.discover().await?);
        }
        if self.config.stages.connect {
            report.connect = Some(self.connect().await?);
        }
        if self.config.stages.status_poll {
            report.status_poll = Some(self.poll_status().await?);
        }
        if self.config.stages.inbox_sweep {
            report.inbox_sweep = Some(self.sweep_inbox().await?);
        }
        if self.config.stages.messaging {
            report.messaging = Some(self.send_messages().await?);
        }

        report.finished_at = Utc::now();
        tracing::info!("run {} complete: {}", report.run_id, report.summary());
        Ok(report)
    }

    /// Navigate and fail the run if we landed on a verification page.
    async fn goto(&self, url: &str) -> Result<String> {
        let landed = self.actuator.navigate(url).await?;
        if selectors::is_checkpoint(&landed) {
            tracing::error!("verification checkpoint detected at {landed}");
            return Err(NetreachError::CheckpointDetected(landed));
        }
        Ok(landed)
    }

    // ─── Stage 1: discovery ───────────────────────────────────

    async fn discover(&self) -> Result<DiscoveryStats> {
        let mut stats = DiscoveryStats::default();

        match self.limiter.check_quota(ActionKind::Search) {
            Ok(()) => {}
            Err(NetreachError::QuotaExceeded { kind, current, limit, resets_at }) => {
                tracing::warn!("search quota exhausted ({current}/{limit}), skipping discovery");
                stats.outcome = StageOutcome::QuotaExhausted { kind, resets_at };
                return Ok(stats);
            }
            Err(e) => {
                tracing::error!("quota check failed: {e}");
                stats.errors += 1;
                return Ok(stats);
            }
        }

        let url = match selectors::search_url(&self.config.search) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("discovery skipped: {e}");
                stats.errors += 1;
                return Ok(stats);
            }
        };

        tracing::info!("searching: {url}");
        match self.goto(&url).await {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("search navigation failed: {e}");
                stats.errors += 1;
                return Ok(stats);
            }
        }
        self.actuator.scroll().await.ok();

        if let Err(e) = self.limiter.record_action(ActionKind::Search).await {
            tracing::warn!("failed to record search action: {e}");
        }

        let max_pages = self.config.search.max_pages.max(1);
        for page in 1..=max_pages {
            let candidates = match self.parser.extract_candidates().await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("failed to parse page {page}: {e}");
                    stats.errors += 1;
                    break;
                }
            };
            if candidates.is_empty() {
                // Normal end-of-results signal
                tracing::info!("no results on page {page}, stopping");
                break;
            }

            tracing::info!("page {page}/{max_pages}: {} profiles", candidates.len());
            stats.pages_scraped += 1;
            stats.total_found += candidates.len() as u32;

            for candidate in &candidates {
                match self.absorb_candidate(candidate) {
                    Ok(true) => stats.new_profiles += 1,
                    Ok(false) => {
                        tracing::debug!("skipping recently seen profile {}", candidate.id);
                        stats.duplicates += 1;
                    }
                    Err(e) => {
                        tracing::warn!("failed to save profile {}: {e}", candidate.id);
                        stats.errors += 1;
                    }
                }
            }

            if page < max_pages {
                match self.actuator.find_control(selectors::PAGINATION_NEXT).await {
                    Ok(Some(next)) => {
                        if let Err(e) = self.actuator.click(&next).await {
                            tracing::warn!("next-page click failed: {e}");
                            stats.errors += 1;
                            break;
                        }
                        let here = self.actuator.current_url().await.unwrap_or_default();
                        if selectors::is_checkpoint(&here) {
                            return Err(NetreachError::CheckpointDetected(here));
                        }
                        self.actuator.scroll().await.ok();
                    }
                    Ok(None) => {
                        tracing::info!("no next page, search complete");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("pagination lookup failed: {e}");
                        stats.errors += 1;
                        break;
                    }
                }
            }
        }

        tracing::info!(
            "discovery complete: {} found, {} new, {} duplicates, {} pages",
            stats.total_found,
            stats.new_profiles,
            stats.duplicates,
            stats.pages_scraped
        );
        Ok(stats)
    }

    /// Upsert a candidate unless it was seen within the duplicate window.
    /// Returns whether the profile counted as new.
    fn absorb_candidate(&self, candidate: &CandidateProfile) -> Result<bool> {
        let window = self.config.search.duplicate_window_days;
        if self.store.is_recently_seen(&candidate.id, window)? {
            return Ok(false);
        }
        let contact = Contact::discovered(
            &candidate.id,
            &candidate.name,
            &candidate.title,
            &candidate.company,
            &candidate.location,
            &candidate.profile_url,
        );
        self.store.upsert_contact(&contact)?;
        Ok(true)
    }

    // ─── Stage 2: connect ─────────────────────────────────────

    async fn connect(&self) -> Result<ConnectStats> {
        let mut stats = ConnectStats::default();

        let candidates = match self.store.unrequested_contacts(
            self.config.stages.max_connections_per_run,
            self.config.search.duplicate_window_days,
        ) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("connect stage skipped: {e}");
                stats.errors.push(e.to_string());
                return Ok(stats);
            }
        };
        if candidates.is_empty() {
            tracing::info!("no contacts awaiting connection requests");
            return Ok(stats);
        }

        let note_template = self.note_template();
        tracing::info!("sending connection requests to {} contacts", candidates.len());

        for contact in candidates {
            match self.limiter.check_quota(ActionKind::Connection) {
                Ok(()) => {}
                Err(NetreachError::QuotaExceeded { kind, current, limit, resets_at }) => {
                    tracing::warn!("connection quota exhausted ({current}/{limit}), stopping stage");
                    stats.outcome = StageOutcome::QuotaExhausted { kind, resets_at };
                    break;
                }
                Err(e) => {
                    stats.errors.push(e.to_string());
                    break;
                }
            }
            stats.attempted += 1;

            let note = match &note_template {
                Some(template) => match render(template, &self.vars_for(&contact)) {
                    Ok(note) => Some(note),
                    Err(e) => {
                        tracing::warn!("note render failed for {}: {e}", contact.id);
                        stats.failed += 1;
                        stats.errors.push(format!("{}: {e}", contact.id));
                        continue;
                    }
                },
                None => None,
            };

            match self.request_connection(&contact, note.as_deref()).await {
                Ok(()) => {
                    match self
                        .store
                        .record_connection_request(&contact.id, note.as_deref(), Utc::now())
                    {
                        Ok(()) | Err(NetreachError::DuplicateRequest(_)) => {}
                        Err(e) => {
                            tracing::warn!("request sent but not recorded for {}: {e}", contact.id);
                            stats.errors.push(format!("{}: {e}", contact.id));
                        }
                    }
                    if let Err(e) = self.limiter.record_action(ActionKind::Connection).await {
                        tracing::warn!("failed to record connection action: {e}");
                    }
                    stats.successful += 1;
                    tracing::info!("connection request sent to {}", contact.name);
                }
                Err(NetreachError::AlreadyConnected) => {
                    tracing::info!("already connected with {}", contact.name);
                    stats.already_connected += 1;
                }
                Err(NetreachError::RequestPending) => {
                    tracing::info!("request already pending for {}", contact.name);
                    stats.already_pending += 1;
                }
                Err(NetreachError::ControlNotFound(what)) => {
                    tracing::warn!("{what} not found for {}, skipping", contact.name);
                    stats.no_control_found += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("failed to send connection to {}: {e}", contact.name);
                    stats.failed += 1;
                    stats.errors.push(format!("{}: {e}", contact.id));
                }
            }
        }

        tracing::info!(
            "connect complete: {} sent, {} failed, {} already connected, {} pending",
            stats.successful,
            stats.failed,
            stats.already_connected,
            stats.already_pending
        );
        Ok(stats)
    }

    /// The configured connection note template, if any. An empty id means
    /// requests go out without a note.
    fn note_template(&self) -> Option<MessageTemplate> {
        let id = &self.config.templates.connection_note;
        if id.is_empty() {
            return None;
        }
        match template_by_id(id) {
            Ok(t) if t.kind == TemplateKind::ConnectionNote => Some(t),
            Ok(_) => {
                tracing::warn!("template '{id}' is not a connection note, sending without one");
                None
            }
            Err(e) => {
                tracing::warn!("{e}, sending without a note");
                None
            }
        }
    }

    /// Drive the actuator through one connection request: profile page,
    /// connect control (directly or via the more-actions menu), optional
    /// note, send.
    async fn request_connection(&self, contact: &Contact, note: Option<&str>) -> Result<()> {
        tracing::info!("requesting connection with {} ({})", contact.name, contact.id);
        self.goto(&contact.profile_url).await?;
        self.actuator.scroll().await.ok();

        if self
            .actuator
            .find_control(selectors::ALREADY_CONNECTED_BADGE)
            .await?
            .is_some()
        {
            return Err(NetreachError::AlreadyConnected);
        }
        if self
            .actuator
            .find_control(selectors::PENDING_BADGE)
            .await?
            .is_some()
        {
            return Err(NetreachError::RequestPending);
        }

        let connect = match self.actuator.find_control(selectors::CONNECT_BUTTON).await? {
            Some(button) => button,
            None => {
                // Out-of-network profiles hide Connect behind the
                // more-actions menu
                match self
                    .actuator
                    .find_control(selectors::MORE_ACTIONS_BUTTON)
                    .await?
                {
                    Some(more) => {
                        self.actuator.click(&more).await?;
                        match self
                            .actuator
                            .find_control(selectors::CONNECT_MENU_ITEM)
                            .await?
                        {
                            Some(item) => item,
                            None => return self.classify_unconnectable().await,
                        }
                    }
                    None => return self.classify_unconnectable().await,
                }
            }
        };

        self.actuator.click(&connect).await?;

        if let Some(note) = note {
            match self.actuator.find_control(selectors::ADD_NOTE_BUTTON).await? {
                Some(add_note) => {
                    self.actuator.click(&add_note).await?;
                    match self.actuator.find_control(selectors::NOTE_TEXTAREA).await? {
                        Some(textarea) => self.actuator.type_text(&textarea, note).await?,
                        None => tracing::warn!("note textarea not found, sending without note"),
                    }
                }
                None => tracing::warn!("add-note control not found, sending without note"),
            }
        }

        match self
            .actuator
            .find_control(selectors::SEND_INVITE_BUTTON)
            .await?
        {
            Some(send) => self.actuator.click(&send).await,
            None => Err(NetreachError::ControlNotFound("send invite button".into())),
        }
    }

    /// No connect control anywhere. A message button without any connect
    /// option means the profile is already connected; otherwise the
    /// profile is out of reach.
    async fn classify_unconnectable(&self) -> Result<()> {
        if self
            .actuator
            .find_control(selectors::MESSAGE_BUTTON)
            .await?
            .is_some()
        {
            return Err(NetreachError::AlreadyConnected);
        }
        Err(NetreachError::ControlNotFound("connect button".into()))
    }

    // ─── Stage 3: status poll ─────────────────────────────────

    /// Re-check every pending request against the live profile.
    /// Re-running this after a crash is a no-op for requests that already
    /// transitioned.
    async fn poll_status(&self) -> Result<PollStats> {
        let mut stats = PollStats::default();

        let pending = match self.store.pending_requests() {
            Ok(p) => p,
            Err(e) => {
                tracing::error!("status poll skipped: {e}");
                stats.errors += 1;
                return Ok(stats);
            }
        };
        if pending.is_empty() {
            tracing::info!("no pending connection requests to check");
            return Ok(stats);
        }
        tracing::info!("checking {} pending connection requests", pending.len());

        for request in pending {
            let url = match self.store.contact(&request.contact_id) {
                Ok(Some(contact)) => contact.profile_url,
                _ => selectors::profile_url(&request.contact_id),
            };
            match self.goto(&url).await {
                Ok(_) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("failed to open profile {}: {e}", request.contact_id);
                    stats.errors += 1;
                    continue;
                }
            }
            stats.checked += 1;

            match self.parser.shows_connected().await {
                Ok(true) => match self
                    .store
                    .transition_status(&request.contact_id, RequestStatus::Accepted)
                {
                    Ok(true) => {
                        tracing::info!("connection accepted: {}", request.contact_id);
                        stats.newly_accepted += 1;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("failed to update status for {}: {e}", request.contact_id);
                        stats.errors += 1;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("connected check failed for {}: {e}", request.contact_id);
                    stats.errors += 1;
                }
            }
        }

        tracing::info!("status poll complete: {} newly accepted", stats.newly_accepted);
        Ok(stats)
    }

    // ─── Stage 4: inbox sweep ─────────────────────────────────

    /// Scan recent conversations; a thread whose newest message came from
    /// the counterpart flags the contact as replied, which removes them
    /// from all further automated outreach.
    async fn sweep_inbox(&self) -> Result<SweepStats> {
        let mut stats = SweepStats::default();

        match self.goto(selectors::MESSAGING_URL).await {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!("failed to open messaging: {e}");
                return Ok(stats);
            }
        }

        let conversations = match self.parser.extract_conversations().await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("failed to read conversations: {e}");
                return Ok(stats);
            }
        };

        for peek in conversations.into_iter().take(INBOX_SWEEP_LIMIT) {
            stats.conversations_checked += 1;
            if peek.last_message_from_contact {
                match self.store.mark_replied(&peek.contact_id, true) {
                    Ok(()) => {
                        tracing::info!("reply detected from {}", peek.contact_id);
                        stats.replies_detected += 1;
                    }
                    Err(e) => {
                        tracing::warn!("failed to flag reply for {}: {e}", peek.contact_id)
                    }
                }
            }
        }

        tracing::info!(
            "inbox sweep complete: {} conversations, {} replies",
            stats.conversations_checked,
            stats.replies_detected
        );
        Ok(stats)
    }

    // ─── Stage 5: messaging ───────────────────────────────────

    /// Message contacts selected exclusively from the accepted-unmessaged
    /// query — never from the raw discovery list.
    async fn send_messages(&self) -> Result<MessageStats> {
        let mut stats = MessageStats::default();

        let template = match template_by_id(&self.config.templates.message) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("messaging skipped: {e}");
                stats.errors.push(e.to_string());
                return Ok(stats);
            }
        };

        let targets = match self.store.accepted_unmessaged(
            self.config.stages.max_messages_per_run,
            self.config.search.duplicate_window_days,
        ) {
            Ok(t) => t,
            Err(e) => {
                tracing::error!("messaging skipped: {e}");
                stats.errors.push(e.to_string());
                return Ok(stats);
            }
        };
        if targets.is_empty() {
            tracing::info!("no accepted contacts awaiting a message");
            return Ok(stats);
        }
        tracing::info!("messaging {} accepted contacts", targets.len());

        for contact in targets {
            match self.limiter.check_quota(ActionKind::Message) {
                Ok(()) => {}
                Err(NetreachError::QuotaExceeded { kind, current, limit, resets_at }) => {
                    tracing::warn!("message quota exhausted ({current}/{limit}), stopping stage");
                    stats.outcome = StageOutcome::QuotaExhausted { kind, resets_at };
                    break;
                }
                Err(e) => {
                    stats.errors.push(e.to_string());
                    break;
                }
            }
            stats.attempted += 1;

            let vars = self.vars_for(&contact);
            let body = match render(&template, &vars) {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("message render failed for {}: {e}", contact.id);
                    stats.failed += 1;
                    stats.errors.push(format!("{}: {e}", contact.id));
                    continue;
                }
            };
            let subject = render_subject(template.subject, &vars);
            tracing::debug!("message subject: {subject}");

            match self.deliver_message(&contact, &body).await {
                Ok(()) => {
                    match self
                        .store
                        .record_message(&contact.id, template.id, &body, Utc::now())
                    {
                        Ok(()) => stats.successful += 1,
                        Err(NetreachError::DuplicateMessage { .. }) => {
                            stats.duplicates_skipped += 1;
                        }
                        Err(e) => {
                            tracing::warn!("message sent but not recorded for {}: {e}", contact.id);
                            stats.errors.push(format!("{}: {e}", contact.id));
                            stats.successful += 1;
                        }
                    }
                    if let Err(e) = self.limiter.record_action(ActionKind::Message).await {
                        tracing::warn!("failed to record message action: {e}");
                    }
                }
                Err(NetreachError::ControlNotFound(what)) => {
                    tracing::warn!("{what} not found for {}, skipping", contact.name);
                    stats.no_control_found += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("failed to message {}: {e}", contact.name);
                    stats.failed += 1;
                    stats.errors.push(format!("{}: {e}", contact.id));
                }
            }
        }

        tracing::info!(
            "messaging complete: {} sent, {} failed",
            stats.successful,
            stats.failed
        );
        Ok(stats)
    }

    /// Drive the actuator through one direct message: profile page,
    /// message button, compose box, send.
    async fn deliver_message(&self, contact: &Contact, body: &str) -> Result<()> {
        tracing::info!("sending message to {} ({})", contact.name, contact.id);
        self.goto(&contact.profile_url).await?;

        let button = self
            .actuator
            .find_control(selectors::MESSAGE_BUTTON)
            .await?
            .ok_or_else(|| NetreachError::ControlNotFound("message button".into()))?;
        self.actuator.click(&button).await?;

        let input = self
            .actuator
            .find_control(selectors::MESSAGE_INPUT)
            .await?
            .ok_or_else(|| NetreachError::ControlNotFound("message input".into()))?;
        self.actuator.type_text(&input, body).await?;

        let send = self
            .actuator
            .find_control(selectors::MESSAGE_SEND_BUTTON)
            .await?
            .ok_or_else(|| NetreachError::ControlNotFound("message send button".into()))?;
        self.actuator.click(&send).await
    }

    /// Recipient fields come from the stored contact, sender fields from
    /// configuration.
    fn vars_for(&self, contact: &Contact) -> TemplateVars {
        TemplateVars {
            full_name: contact.name.clone(),
            title: contact.title.clone(),
            company: contact.company.clone(),
            industry: self.config.sender.industry.clone(),
            custom_reason: self.config.sender.custom_reason.clone(),
            your_name: self.config.sender.name.clone(),
            your_title: self.config.sender.title.clone(),
            your_company: self.config.sender.company.clone(),
            ..Default::default()
        }
    }
}
