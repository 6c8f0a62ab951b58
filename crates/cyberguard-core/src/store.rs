//! SQLite persistence for incidents and honeypot events.
//!
//! Two independent tables ordered by creation time. The contract is
//! deliberately small: insert-one, list newest-first, and a fixed 50-row
//! read cap for honeypot events. No update or delete exists outside the
//! optional retention pruning.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};
use thiserror::Error;
use uuid::Uuid;

use crate::config::RetentionConfig;
use crate::incident::{Incident, IncidentKind};
use crate::intel::HoneypotEvent;

/// Fixed cap on honeypot event reads
pub const RECENT_EVENTS_LIMIT: usize = 50;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Row counts for dashboard aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StoreStats {
    pub incident_count: usize,
    pub website_count: usize,
    pub audio_count: usize,
    pub event_count: usize,
}

/// Database connection wrapper with persistence methods
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize the database schema. Safe to invoke on every startup.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        conn.execute_batch(
            r#"
            -- Flagged analyses, append-only
            CREATE TABLE IF NOT EXISTS incidents (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                target TEXT NOT NULL,
                risk_score INTEGER NOT NULL,
                patterns TEXT NOT NULL,     -- JSON array of strings
                created_at TEXT NOT NULL
            );

            -- Extracted intelligence snapshots, append-only
            CREATE TABLE IF NOT EXISTS honeypot_events (
                id TEXT PRIMARY KEY,
                scam_type TEXT NOT NULL,
                intel_extracted TEXT NOT NULL,  -- JSON blob
                incident_id TEXT,
                created_at TEXT NOT NULL
            );

            -- Both tables are always read newest-first
            CREATE INDEX IF NOT EXISTS idx_incidents_created_at ON incidents(created_at);
            CREATE INDEX IF NOT EXISTS idx_honeypot_events_created_at ON honeypot_events(created_at);
            "#,
        )?;

        Ok(())
    }

    // ========================================================================
    // Incident methods
    // ========================================================================

    /// Insert one incident. Fails with [`StoreError::DuplicateId`] if the id
    /// already exists.
    pub fn insert_incident(&self, incident: &Incident) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        let patterns_json = serde_json::to_string(&incident.patterns)?;

        conn.execute(
            r#"
            INSERT INTO incidents (id, kind, target, risk_score, patterns, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                incident.id.to_string(),
                incident.kind.to_string(),
                incident.target,
                incident.risk_score as i64,
                patterns_json,
                incident.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| map_conflict(e, &incident.id))?;

        Ok(())
    }

    /// List all incidents, newest first.
    pub fn list_incidents(&self) -> Result<Vec<Incident>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, kind, target, risk_score, patterns, created_at
            FROM incidents ORDER BY created_at DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let kind: String = row.get(1)?;
            let target: String = row.get(2)?;
            let risk_score: i64 = row.get(3)?;
            let patterns_json: String = row.get(4)?;
            let created_at: String = row.get(5)?;
            Ok((id, kind, target, risk_score, patterns_json, created_at))
        })?;

        let mut incidents = Vec::new();
        for row in rows {
            let (id, kind, target, risk_score, patterns_json, created_at) = row?;
            incidents.push(Incident {
                id: parse_uuid(&id)?,
                kind: kind
                    .parse::<IncidentKind>()
                    .map_err(StoreError::InvalidRow)?,
                target,
                risk_score: risk_score.clamp(0, 100) as u8,
                patterns: serde_json::from_str(&patterns_json)?,
                created_at: parse_timestamp(&created_at)?,
            });
        }

        Ok(incidents)
    }

    // ========================================================================
    // Honeypot event methods
    // ========================================================================

    /// Insert one honeypot event. Same duplicate contract as incidents.
    pub fn insert_event(&self, event: &HoneypotEvent) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        let intel_json = serde_json::to_string(&event.extracted_intel)?;

        conn.execute(
            r#"
            INSERT INTO honeypot_events (id, scam_type, intel_extracted, incident_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                event.id.to_string(),
                event.scam_type,
                intel_json,
                event.incident_id.map(|id| id.to_string()),
                event.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| map_conflict(e, &event.id))?;

        Ok(())
    }

    /// Up to [`RECENT_EVENTS_LIMIT`] most recent events, newest first.
    pub fn recent_events(&self) -> Result<Vec<HoneypotEvent>> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, scam_type, intel_extracted, incident_id, created_at
            FROM honeypot_events ORDER BY created_at DESC LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![RECENT_EVENTS_LIMIT as i64], |row| {
            let id: String = row.get(0)?;
            let scam_type: String = row.get(1)?;
            let intel_json: String = row.get(2)?;
            let incident_id: Option<String> = row.get(3)?;
            let created_at: String = row.get(4)?;
            Ok((id, scam_type, intel_json, incident_id, created_at))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (id, scam_type, intel_json, incident_id, created_at) = row?;
            events.push(HoneypotEvent {
                id: parse_uuid(&id)?,
                scam_type,
                extracted_intel: serde_json::from_str(&intel_json)?,
                incident_id: incident_id.as_deref().map(parse_uuid).transpose()?,
                created_at: parse_timestamp(&created_at)?,
            });
        }

        Ok(events)
    }

    // ========================================================================
    // Aggregates and retention
    // ========================================================================

    /// Row counts for the dashboard.
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        let incident_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM incidents", [], |row| row.get(0))?;
        let website_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM incidents WHERE kind = 'website'",
            [],
            |row| row.get(0),
        )?;
        let audio_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM incidents WHERE kind = 'audio'",
            [],
            |row| row.get(0),
        )?;
        let event_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM honeypot_events", [], |row| row.get(0))?;

        Ok(StoreStats {
            incident_count: incident_count as usize,
            website_count: website_count as usize,
            audio_count: audio_count as usize,
            event_count: event_count as usize,
        })
    }

    /// Prune the oldest rows beyond the configured caps. A no-op with the
    /// default (unbounded) configuration.
    pub fn apply_retention(&self, retention: &RetentionConfig) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;

        if let Some(max) = retention.max_incidents {
            conn.execute(
                r#"
                DELETE FROM incidents WHERE id NOT IN (
                    SELECT id FROM incidents ORDER BY created_at DESC LIMIT ?1
                )
                "#,
                params![max as i64],
            )?;
        }

        if let Some(max) = retention.max_events {
            conn.execute(
                r#"
                DELETE FROM honeypot_events WHERE id NOT IN (
                    SELECT id FROM honeypot_events ORDER BY created_at DESC LIMIT ?1
                )
                "#,
                params![max as i64],
            )?;
        }

        Ok(())
    }
}

/// Map a primary-key conflict to [`StoreError::DuplicateId`].
fn map_conflict(err: rusqlite::Error, id: &Uuid) -> StoreError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == ErrorCode::ConstraintViolation {
            return StoreError::DuplicateId(id.to_string());
        }
    }
    StoreError::Database(err)
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidRow(format!("Invalid id: {}", e)))
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidRow(format!("Invalid timestamp: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn incident_at(offset_secs: i64, target: &str) -> Incident {
        Incident::new(IncidentKind::Website, target, 50, vec!["test".into()])
            .with_created_at(Utc::now() + Duration::seconds(offset_secs))
    }

    #[test]
    fn test_schema_is_idempotent() -> Result<()> {
        let db = Database::in_memory()?;
        db.initialize_schema()?;
        db.initialize_schema()?;
        Ok(())
    }

    #[test]
    fn test_insert_and_list_round_trip() -> Result<()> {
        let db = Database::in_memory()?;
        let incident = Incident::new(
            IncidentKind::Website,
            "http://example-bank-login.com",
            92,
            vec!["urgency".into(), "lookalike-domain".into()],
        );
        db.insert_incident(&incident)?;

        let listed = db.list_incidents()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, incident.id);
        assert_eq!(listed[0].target, incident.target);
        assert_eq!(listed[0].risk_score, 92);
        // Round-trip preserves pattern order exactly
        assert_eq!(listed[0].patterns, vec!["urgency", "lookalike-domain"]);
        Ok(())
    }

    #[test]
    fn test_read_idempotence() -> Result<()> {
        let db = Database::in_memory()?;
        db.insert_incident(&incident_at(0, "http://a.example"))?;
        db.insert_incident(&incident_at(1, "http://b.example"))?;

        let first = db.list_incidents()?;
        let second = db.list_incidents()?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_incidents_ordered_newest_first() -> Result<()> {
        let db = Database::in_memory()?;
        let t1 = incident_at(10, "http://t1.example");
        let t2 = incident_at(20, "http://t2.example");
        let t3 = incident_at(30, "http://t3.example");
        // Insertion order deliberately differs from timestamp order
        db.insert_incident(&t2)?;
        db.insert_incident(&t3)?;
        db.insert_incident(&t1)?;

        let listed = db.list_incidents()?;
        let targets: Vec<&str> = listed.iter().map(|i| i.target.as_str()).collect();
        assert_eq!(targets, vec!["http://t3.example", "http://t2.example", "http://t1.example"]);
        Ok(())
    }

    #[test]
    fn test_duplicate_id_rejected() -> Result<()> {
        let db = Database::in_memory()?;
        let incident = incident_at(0, "http://dup.example");
        db.insert_incident(&incident)?;

        match db.insert_incident(&incident) {
            Err(StoreError::DuplicateId(id)) => assert_eq!(id, incident.id.to_string()),
            other => panic!("expected DuplicateId, got {:?}", other.err()),
        }
        Ok(())
    }

    #[test]
    fn test_recent_events_capped_at_50() -> Result<()> {
        let db = Database::in_memory()?;
        for i in 0..55 {
            let event = HoneypotEvent::new("Phishing", serde_json::json!({"n": i}))
                .with_created_at(Utc::now() + Duration::seconds(i));
            db.insert_event(&event)?;
        }

        let events = db.recent_events()?;
        assert_eq!(events.len(), RECENT_EVENTS_LIMIT);
        // Newest first: the last write (n=54) leads
        assert_eq!(events[0].extracted_intel["n"], 54);
        assert_eq!(events[49].extracted_intel["n"], 5);
        Ok(())
    }

    #[test]
    fn test_recent_events_returns_min_count() -> Result<()> {
        let db = Database::in_memory()?;
        for i in 0..3 {
            db.insert_event(&HoneypotEvent::new("Phishing", serde_json::json!({"n": i})))?;
        }
        assert_eq!(db.recent_events()?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_event_intel_and_incident_link_round_trip() -> Result<()> {
        let db = Database::in_memory()?;
        let incident_id = Uuid::new_v4();
        let event = HoneypotEvent::new(
            "Audio Fraud",
            serde_json::json!({"alerts": ["urgency"], "explanation": "pressure script"}),
        )
        .with_incident(incident_id);
        db.insert_event(&event)?;

        let events = db.recent_events()?;
        assert_eq!(events[0].extracted_intel["alerts"][0], "urgency");
        assert_eq!(events[0].incident_id, Some(incident_id));
        Ok(())
    }

    #[test]
    fn test_stats_counts_by_kind() -> Result<()> {
        let db = Database::in_memory()?;
        db.insert_incident(&incident_at(0, "http://a.example"))?;
        db.insert_incident(&incident_at(1, "http://b.example"))?;
        db.insert_incident(&Incident::new(IncidentKind::Audio, "Live Call Analysis", 80, vec![]))?;
        db.insert_event(&HoneypotEvent::new("Phishing", serde_json::json!({})))?;

        let stats = db.stats()?;
        assert_eq!(stats.incident_count, 3);
        assert_eq!(stats.website_count, 2);
        assert_eq!(stats.audio_count, 1);
        assert_eq!(stats.event_count, 1);
        Ok(())
    }

    #[test]
    fn test_retention_prunes_oldest_only() -> Result<()> {
        let db = Database::in_memory()?;
        for i in 0..5 {
            db.insert_incident(&incident_at(i, &format!("http://t{}.example", i)))?;
        }

        let retention = RetentionConfig {
            max_incidents: Some(2),
            max_events: None,
        };
        db.apply_retention(&retention)?;

        let listed = db.list_incidents()?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].target, "http://t4.example");
        assert_eq!(listed[1].target, "http://t3.example");
        Ok(())
    }

    #[test]
    fn test_retention_unconfigured_is_noop() -> Result<()> {
        let db = Database::in_memory()?;
        for i in 0..5 {
            db.insert_incident(&incident_at(i, &format!("http://t{}.example", i)))?;
        }
        db.apply_retention(&RetentionConfig::default())?;
        assert_eq!(db.list_incidents()?.len(), 5);
        Ok(())
    }

    #[test]
    fn test_survives_reopen() -> Result<()> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cyberguard.db");

        let incident = incident_at(0, "http://persist.example");
        {
            let db = Database::open(&path)?;
            db.insert_incident(&incident)?;
        }

        let db = Database::open(&path)?;
        let listed = db.list_incidents()?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, incident.id);
        Ok(())
    }
}
