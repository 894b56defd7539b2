//! # NetReach Store
//!
//! SQLite persistence for the four tracked entities: contacts, connection
//! requests, outreach messages, and daily quota counters. All writes are
//! idempotent or duplicate-checked so interrupted runs can be re-driven
//! without double outreach; quota increments are single upsert statements
//! so no read-modify-write race can lose a count.

pub mod models;

use chrono::{DateTime, Duration, Local, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

use netreach_core::error::{ActionKind, NetreachError, Result};
pub use models::{Contact, ConnectionRequest, DailyQuota, OutreachMessage, RequestStatus};

/// The repository. Owns the only handle to the database; callers share it
/// behind an `Arc`.
pub struct ContactStore {
    conn: Mutex<Connection>,
}

impl ContactStore {
    /// Open or create the database at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .map_err(|e| NetreachError::Store(format!("open {}: {e}", path.display())))?;
        let store = Self { conn: Mutex::new(conn) };
        store.migrate()?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| NetreachError::Store(format!("open in-memory: {e}")))?;
        let store = Self { conn: Mutex::new(conn) };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            -- Discovered profiles
            CREATE TABLE IF NOT EXISTS contacts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                title TEXT,
                company TEXT,
                location TEXT,
                profile_url TEXT NOT NULL UNIQUE,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            );

            -- Outreach attempts and their lifecycle status
            CREATE TABLE IF NOT EXISTS connection_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                contact_id TEXT NOT NULL,
                sent_at TEXT NOT NULL,
                note TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                has_replied INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY (contact_id) REFERENCES contacts(id)
            );

            -- Messages delivered to accepted contacts
            CREATE TABLE IF NOT EXISTS outreach_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                contact_id TEXT NOT NULL,
                template_id TEXT NOT NULL,
                body TEXT NOT NULL,
                sent_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            -- Per-day action counters
            CREATE TABLE IF NOT EXISTS daily_quota (
                date TEXT PRIMARY KEY,
                connection_count INTEGER NOT NULL DEFAULT 0,
                message_count INTEGER NOT NULL DEFAULT 0,
                search_count INTEGER NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_contacts_last_seen ON contacts(last_seen);
            CREATE INDEX IF NOT EXISTS idx_requests_contact ON connection_requests(contact_id);
            CREATE INDEX IF NOT EXISTS idx_requests_sent ON connection_requests(sent_at);
            CREATE INDEX IF NOT EXISTS idx_messages_contact ON outreach_messages(contact_id);
            CREATE INDEX IF NOT EXISTS idx_messages_sent ON outreach_messages(sent_at);
            ",
        )
        .map_err(|e| NetreachError::Store(format!("migration: {e}")))?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| NetreachError::Store(format!("lock poisoned: {e}")))
    }

    // ─── Contacts ─────────────────────────────────────────────

    /// Insert a contact or, on re-discovery, merge the mutable fields.
    /// `first_seen` and `id` are never overwritten.
    pub fn upsert_contact(&self, contact: &Contact) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO contacts (id, name, title, company, location, profile_url, first_seen, last_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 title = excluded.title,
                 company = excluded.company,
                 location = excluded.location,
                 last_seen = excluded.last_seen",
            rusqlite::params![
                contact.id,
                contact.name,
                contact.title,
                contact.company,
                contact.location,
                contact.profile_url,
                contact.first_seen.to_rfc3339(),
                contact.last_seen.to_rfc3339(),
            ],
        )
        .map_err(|e| NetreachError::Store(format!("upsert contact: {e}")))?;
        Ok(())
    }

    /// Whether the contact was seen within the last `window_days`.
    pub fn is_recently_seen(&self, contact_id: &str, window_days: u32) -> Result<bool> {
        let cutoff = (Utc::now() - Duration::days(window_days as i64)).to_rfc3339();
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM contacts WHERE id = ?1 AND last_seen >= ?2",
                rusqlite::params![contact_id, cutoff],
                |row| row.get(0),
            )
            .map_err(|e| NetreachError::Store(format!("recently-seen check: {e}")))?;
        Ok(count > 0)
    }

    /// Point lookup by identifier.
    pub fn contact(&self, contact_id: &str) -> Result<Option<Contact>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, title, company, location, profile_url, first_seen, last_seen
                 FROM contacts WHERE id = ?1",
            )
            .map_err(|e| NetreachError::Store(format!("prepare contact: {e}")))?;
        let result = stmt.query_row(rusqlite::params![contact_id], map_contact).ok();
        Ok(result)
    }

    /// Recently-seen contacts with no active connection request — the
    /// connect stage's candidate pool, newest first.
    pub fn unrequested_contacts(&self, limit: u32, window_days: u32) -> Result<Vec<Contact>> {
        let cutoff = (Utc::now() - Duration::days(window_days as i64)).to_rfc3339();
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, title, company, location, profile_url, first_seen, last_seen
                 FROM contacts
                 WHERE last_seen >= ?1
                 AND id NOT IN (
                     SELECT contact_id FROM connection_requests WHERE status != 'withdrawn'
                 )
                 ORDER BY last_seen DESC
                 LIMIT ?2",
            )
            .map_err(|e| NetreachError::Store(format!("prepare unrequested: {e}")))?;
        let rows = stmt
            .query_map(rusqlite::params![cutoff, limit], map_contact)
            .map_err(|e| NetreachError::Store(format!("query unrequested: {e}")))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ─── Connection requests ──────────────────────────────────

    /// Record a sent connection request. Rejects a second attempt while any
    /// non-withdrawn request exists for the contact.
    pub fn record_connection_request(
        &self,
        contact_id: &str,
        note: Option<&str>,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock()?;
        let active: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM connection_requests
                 WHERE contact_id = ?1 AND status != 'withdrawn'",
                rusqlite::params![contact_id],
                |row| row.get(0),
            )
            .map_err(|e| NetreachError::Store(format!("duplicate check: {e}")))?;
        if active > 0 {
            return Err(NetreachError::DuplicateRequest(contact_id.to_string()));
        }
        conn.execute(
            "INSERT INTO connection_requests (contact_id, sent_at, note, status, has_replied, created_at)
             VALUES (?1, ?2, ?3, 'pending', 0, ?4)",
            rusqlite::params![
                contact_id,
                sent_at.to_rfc3339(),
                note,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| NetreachError::Store(format!("insert request: {e}")))?;
        Ok(())
    }

    /// Move a pending request to a new status. A non-pending or missing
    /// request is a no-op, which makes status polling safe to re-run.
    /// Returns whether a row actually transitioned.
    pub fn transition_status(&self, contact_id: &str, new_status: RequestStatus) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn
            .execute(
                "UPDATE connection_requests SET status = ?1
                 WHERE contact_id = ?2 AND status = 'pending'",
                rusqlite::params![new_status.as_str(), contact_id],
            )
            .map_err(|e| NetreachError::Store(format!("transition status: {e}")))?;
        Ok(changed > 0)
    }

    /// All pending requests, oldest first, so the longest-waiting contacts
    /// are polled before fresher ones.
    pub fn pending_requests(&self) -> Result<Vec<ConnectionRequest>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, contact_id, sent_at, note, status, has_replied, created_at
                 FROM connection_requests
                 WHERE status = 'pending'
                 ORDER BY sent_at ASC",
            )
            .map_err(|e| NetreachError::Store(format!("prepare pending: {e}")))?;
        let rows = stmt
            .query_map([], map_request)
            .map_err(|e| NetreachError::Store(format!("query pending: {e}")))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Whether any non-withdrawn request exists for the contact.
    pub fn has_requested(&self, contact_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM connection_requests
                 WHERE contact_id = ?1 AND status != 'withdrawn'",
                rusqlite::params![contact_id],
                |row| row.get(0),
            )
            .map_err(|e| NetreachError::Store(format!("has-requested check: {e}")))?;
        Ok(count > 0)
    }

    /// Set the reply flag on the contact's requests. A flagged contact is
    /// excluded from all further automated outreach.
    pub fn mark_replied(&self, contact_id: &str, replied: bool) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE connection_requests SET has_replied = ?1 WHERE contact_id = ?2",
            rusqlite::params![replied as i32, contact_id],
        )
        .map_err(|e| NetreachError::Store(format!("mark replied: {e}")))?;
        Ok(())
    }

    /// The sole source of messaging targets: contacts whose request was
    /// accepted within `window_days`, who have not replied, and who have
    /// never received any templated message. Most recently accepted first.
    pub fn accepted_unmessaged(&self, limit: u32, window_days: u32) -> Result<Vec<Contact>> {
        let cutoff = (Utc::now() - Duration::days(window_days as i64)).to_rfc3339();
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT c.id, c.name, c.title, c.company, c.location, c.profile_url,
                        c.first_seen, c.last_seen
                 FROM contacts c
                 INNER JOIN connection_requests cr ON cr.contact_id = c.id
                 WHERE cr.status = 'accepted'
                 AND cr.has_replied = 0
                 AND cr.sent_at >= ?1
                 AND c.id NOT IN (SELECT contact_id FROM outreach_messages)
                 ORDER BY cr.sent_at DESC
                 LIMIT ?2",
            )
            .map_err(|e| NetreachError::Store(format!("prepare accepted-unmessaged: {e}")))?;
        let rows = stmt
            .query_map(rusqlite::params![cutoff, limit], map_contact)
            .map_err(|e| NetreachError::Store(format!("query accepted-unmessaged: {e}")))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ─── Messages ─────────────────────────────────────────────

    /// Record a delivered message. Rejects a repeat of the same template to
    /// the same contact.
    pub fn record_message(
        &self,
        contact_id: &str,
        template_id: &str,
        body: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock()?;
        let existing: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM outreach_messages
                 WHERE contact_id = ?1 AND template_id = ?2",
                rusqlite::params![contact_id, template_id],
                |row| row.get(0),
            )
            .map_err(|e| NetreachError::Store(format!("duplicate message check: {e}")))?;
        if existing > 0 {
            return Err(NetreachError::DuplicateMessage {
                contact: contact_id.to_string(),
                template: template_id.to_string(),
            });
        }
        conn.execute(
            "INSERT INTO outreach_messages (contact_id, template_id, body, sent_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                contact_id,
                template_id,
                body,
                sent_at.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| NetreachError::Store(format!("insert message: {e}")))?;
        Ok(())
    }

    /// All messages sent to a contact, oldest first.
    pub fn message_history(&self, contact_id: &str) -> Result<Vec<OutreachMessage>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, contact_id, template_id, body, sent_at, created_at
                 FROM outreach_messages
                 WHERE contact_id = ?1
                 ORDER BY sent_at ASC",
            )
            .map_err(|e| NetreachError::Store(format!("prepare history: {e}")))?;
        let rows = stmt
            .query_map(rusqlite::params![contact_id], map_message)
            .map_err(|e| NetreachError::Store(format!("query history: {e}")))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ─── Daily quota ──────────────────────────────────────────

    /// Today's counter bucket, created lazily on first access.
    pub fn today_quota(&self) -> Result<DailyQuota> {
        self.quota_for(&today_key())
    }

    /// The counter bucket for a specific date key; zeros if absent.
    pub fn quota_for(&self, date: &str) -> Result<DailyQuota> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                "SELECT date, connection_count, message_count, search_count, last_updated
                 FROM daily_quota WHERE date = ?1",
                rusqlite::params![date],
                |row| {
                    Ok(DailyQuota {
                        date: row.get(0)?,
                        connection_count: row.get(1)?,
                        message_count: row.get(2)?,
                        search_count: row.get(3)?,
                        last_updated: parse_ts(row.get::<_, String>(4)?),
                    })
                },
            );
        match result {
            Ok(quota) => Ok(quota),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(DailyQuota::empty(date)),
            Err(e) => Err(NetreachError::Store(format!("quota lookup: {e}"))),
        }
    }

    /// Bump today's counter for `kind`. A single upsert-and-increment
    /// statement, so concurrent callers on one store handle cannot lose
    /// updates.
    pub fn increment_quota(&self, kind: ActionKind) -> Result<()> {
        let sql = match kind {
            ActionKind::Connection => {
                "INSERT INTO daily_quota (date, connection_count, message_count, search_count, last_updated)
                 VALUES (?1, 1, 0, 0, ?2)
                 ON CONFLICT(date) DO UPDATE SET
                     connection_count = connection_count + 1,
                     last_updated = excluded.last_updated"
            }
            ActionKind::Message => {
                "INSERT INTO daily_quota (date, connection_count, message_count, search_count, last_updated)
                 VALUES (?1, 0, 1, 0, ?2)
                 ON CONFLICT(date) DO UPDATE SET
                     message_count = message_count + 1,
                     last_updated = excluded.last_updated"
            }
            ActionKind::Search => {
                "INSERT INTO daily_quota (date, connection_count, message_count, search_count, last_updated)
                 VALUES (?1, 0, 0, 1, ?2)
                 ON CONFLICT(date) DO UPDATE SET
                     search_count = search_count + 1,
                     last_updated = excluded.last_updated"
            }
        };
        let conn = self.lock()?;
        conn.execute(sql, rusqlite::params![today_key(), Utc::now().to_rfc3339()])
            .map_err(|e| NetreachError::Store(format!("increment {kind}: {e}")))?;
        Ok(())
    }
}

/// Local-calendar date key. Counters reset implicitly when this rolls over
/// at local midnight.
fn today_key() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn parse_ts(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn map_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        company: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        location: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        profile_url: row.get(5)?,
        first_seen: parse_ts(row.get::<_, String>(6)?),
        last_seen: parse_ts(row.get::<_, String>(7)?),
    })
}

fn map_request(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConnectionRequest> {
    Ok(ConnectionRequest {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        sent_at: parse_ts(row.get::<_, String>(2)?),
        note: row.get(3)?,
        status: RequestStatus::parse(&row.get::<_, String>(4)?),
        has_replied: row.get::<_, i32>(5)? != 0,
        created_at: parse_ts(row.get::<_, String>(6)?),
    })
}

fn map_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<OutreachMessage> {
    Ok(OutreachMessage {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        template_id: row.get(2)?,
        body: row.get(3)?,
        sent_at: parse_ts(row.get::<_, String>(4)?),
        created_at: parse_ts(row.get::<_, String>(5)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ContactStore {
        ContactStore::in_memory().unwrap()
    }

    fn seed_contact(store: &ContactStore, id: &str) {
        let contact = Contact::discovered(
            id,
            "Ada Lovelace",
            "Engineer",
            "Acme",
            "London",
            &format!("https://example.com/in/{id}"),
        );
        store.upsert_contact(&contact).unwrap();
    }

    #[test]
    fn test_upsert_preserves_identity_and_first_seen() {
        let store = store();
        let mut contact = Contact::discovered(
            "ada-l", "Ada Lovelace", "Engineer", "Acme", "London",
            "https://example.com/in/ada-l",
        );
        contact.first_seen = Utc::now() - Duration::days(10);
        contact.last_seen = contact.first_seen;
        store.upsert_contact(&contact).unwrap();

        // Re-discovery with changed mutable fields
        let rediscovered = Contact {
            name: "Ada King".into(),
            title: "Countess".into(),
            last_seen: Utc::now(),
            ..contact.clone()
        };
        store.upsert_contact(&rediscovered).unwrap();

        let loaded = store.contact("ada-l").unwrap().unwrap();
        assert_eq!(loaded.name, "Ada King");
        assert_eq!(loaded.title, "Countess");
        // first_seen survives the merge
        assert!((loaded.first_seen - contact.first_seen).num_seconds().abs() < 2);
        assert!(loaded.last_seen > loaded.first_seen);
    }

    #[test]
    fn test_recently_seen_window() {
        let store = store();
        seed_contact(&store, "fresh");
        assert!(store.is_recently_seen("fresh", 30).unwrap());
        assert!(!store.is_recently_seen("nobody", 30).unwrap());

        // A contact last seen 40 days ago falls outside a 30-day window
        let mut stale = Contact::discovered(
            "stale", "Old Timer", "", "", "", "https://example.com/in/stale",
        );
        stale.last_seen = Utc::now() - Duration::days(40);
        store.upsert_contact(&stale).unwrap();
        assert!(!store.is_recently_seen("stale", 30).unwrap());
        assert!(store.is_recently_seen("stale", 60).unwrap());
    }

    #[test]
    fn test_duplicate_request_rejected() {
        let store = store();
        seed_contact(&store, "ada-l");
        store
            .record_connection_request("ada-l", Some("Hi Ada"), Utc::now())
            .unwrap();

        let err = store
            .record_connection_request("ada-l", None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, NetreachError::DuplicateRequest(id) if id == "ada-l"));
    }

    #[test]
    fn test_duplicate_check_spans_all_statuses_except_withdrawn() {
        let store = store();
        seed_contact(&store, "ada-l");
        store.record_connection_request("ada-l", None, Utc::now()).unwrap();
        store.transition_status("ada-l", RequestStatus::Accepted).unwrap();

        // Accepted still blocks a second request
        assert!(store.record_connection_request("ada-l", None, Utc::now()).is_err());

        // Withdrawn frees the slot
        seed_contact(&store, "grace-h");
        store.record_connection_request("grace-h", None, Utc::now()).unwrap();
        store.transition_status("grace-h", RequestStatus::Withdrawn).unwrap();
        store.record_connection_request("grace-h", None, Utc::now()).unwrap();
    }

    #[test]
    fn test_transition_is_idempotent_and_never_regresses() {
        let store = store();
        seed_contact(&store, "ada-l");
        store.record_connection_request("ada-l", None, Utc::now()).unwrap();

        assert!(store.transition_status("ada-l", RequestStatus::Accepted).unwrap());
        // Second poll: no-op, not an error
        assert!(!store.transition_status("ada-l", RequestStatus::Accepted).unwrap());
        // Cannot regress or overwrite a terminal state
        assert!(!store.transition_status("ada-l", RequestStatus::Rejected).unwrap());
        // Unknown contact: no-op
        assert!(!store.transition_status("nobody", RequestStatus::Accepted).unwrap());

        let pending = store.pending_requests().unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn test_pending_requests_oldest_first() {
        let store = store();
        for (id, days_ago) in [("newer", 1), ("oldest", 9), ("middle", 5)] {
            seed_contact(&store, id);
            store
                .record_connection_request(id, None, Utc::now() - Duration::days(days_ago))
                .unwrap();
        }
        let pending = store.pending_requests().unwrap();
        let ids: Vec<&str> = pending.iter().map(|r| r.contact_id.as_str()).collect();
        assert_eq!(ids, vec!["oldest", "middle", "newer"]);
    }

    #[test]
    fn test_duplicate_message_rejected() {
        let store = store();
        seed_contact(&store, "ada-l");
        store
            .record_message("ada-l", "msg_introduction", "Hello!", Utc::now())
            .unwrap();

        let err = store
            .record_message("ada-l", "msg_introduction", "Hello again!", Utc::now())
            .unwrap_err();
        assert!(matches!(err, NetreachError::DuplicateMessage { .. }));

        // A different template is still allowed
        store
            .record_message("ada-l", "msg_follow_up", "Following up", Utc::now())
            .unwrap();
        assert_eq!(store.message_history("ada-l").unwrap().len(), 2);
    }

    #[test]
    fn test_accepted_unmessaged_filters() {
        let store = store();

        // accepted + unmessaged → eligible
        seed_contact(&store, "eligible");
        store.record_connection_request("eligible", None, Utc::now()).unwrap();
        store.transition_status("eligible", RequestStatus::Accepted).unwrap();

        // still pending → excluded
        seed_contact(&store, "pending");
        store.record_connection_request("pending", None, Utc::now()).unwrap();

        // rejected → excluded
        seed_contact(&store, "rejected");
        store.record_connection_request("rejected", None, Utc::now()).unwrap();
        store.transition_status("rejected", RequestStatus::Rejected).unwrap();

        // accepted but replied → excluded
        seed_contact(&store, "replied");
        store.record_connection_request("replied", None, Utc::now()).unwrap();
        store.transition_status("replied", RequestStatus::Accepted).unwrap();
        store.mark_replied("replied", true).unwrap();

        // accepted but already messaged → excluded
        seed_contact(&store, "messaged");
        store.record_connection_request("messaged", None, Utc::now()).unwrap();
        store.transition_status("messaged", RequestStatus::Accepted).unwrap();
        store.record_message("messaged", "msg_introduction", "Hi", Utc::now()).unwrap();

        let targets = store.accepted_unmessaged(10, 30).unwrap();
        let ids: Vec<&str> = targets.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["eligible"]);
    }

    #[test]
    fn test_accepted_unmessaged_respects_window_and_limit() {
        let store = store();
        for (id, days_ago) in [("a", 2), ("b", 5), ("c", 45)] {
            seed_contact(&store, id);
            store
                .record_connection_request(id, None, Utc::now() - Duration::days(days_ago))
                .unwrap();
            store.transition_status(id, RequestStatus::Accepted).unwrap();
        }

        // "c" is outside the 30-day window
        let targets = store.accepted_unmessaged(10, 30).unwrap();
        let ids: Vec<&str> = targets.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        // Limit trims to the most recent
        let limited = store.accepted_unmessaged(1, 30).unwrap();
        assert_eq!(limited[0].id, "a");
    }

    #[test]
    fn test_unrequested_contacts_excludes_requested() {
        let store = store();
        seed_contact(&store, "open");
        seed_contact(&store, "taken");
        store.record_connection_request("taken", None, Utc::now()).unwrap();

        let candidates = store.unrequested_contacts(10, 30).unwrap();
        let ids: Vec<&str> = candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["open"]);
    }

    #[test]
    fn test_quota_lazily_created_and_incremented() {
        let store = store();
        let quota = store.today_quota().unwrap();
        assert_eq!(quota.connection_count, 0);
        assert_eq!(quota.message_count, 0);
        assert_eq!(quota.search_count, 0);

        store.increment_quota(ActionKind::Connection).unwrap();
        store.increment_quota(ActionKind::Connection).unwrap();
        store.increment_quota(ActionKind::Search).unwrap();

        let quota = store.today_quota().unwrap();
        assert_eq!(quota.connection_count, 2);
        assert_eq!(quota.message_count, 0);
        assert_eq!(quota.search_count, 1);
    }

    #[test]
    fn test_quota_counters_are_independent_per_kind() {
        let store = store();
        store.increment_quota(ActionKind::Message).unwrap();
        let quota = store.today_quota().unwrap();
        assert_eq!(quota.message_count, 1);
        assert_eq!(quota.connection_count, 0);
    }

    #[test]
    fn test_quota_for_absent_date_is_zero() {
        let store = store();
        let quota = store.quota_for("1999-12-31").unwrap();
        assert_eq!(quota.date, "1999-12-31");
        assert_eq!(quota.connection_count, 0);
    }
}
