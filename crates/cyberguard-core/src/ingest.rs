//! Ingest services for incidents and honeypot events.
//!
//! Both services generate the record identity (id + timestamp) server-side
//! at write time; callers never supply either. Retention is applied after
//! each successful insert so a configured cap holds continuously.

use tracing::warn;
use uuid::Uuid;

use crate::config::RetentionConfig;
use crate::incident::{Incident, IncidentKind};
use crate::intel::HoneypotEvent;
use crate::store::{Database, Result};

/// Append-only log of flagged analyses
#[derive(Clone)]
pub struct IncidentLog {
    db: Database,
    retention: RetentionConfig,
}

impl IncidentLog {
    /// Create a log over the given database with unbounded retention.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            retention: RetentionConfig::default(),
        }
    }

    /// Set the retention policy.
    pub fn with_retention(mut self, retention: RetentionConfig) -> Self {
        self.retention = retention;
        self
    }

    /// Record one flagged analysis. Constructs the incident with a fresh id
    /// and the current timestamp, writes it, and returns the stored record.
    pub fn record(
        &self,
        kind: IncidentKind,
        target: impl Into<String>,
        risk_score: u8,
        patterns: Vec<String>,
    ) -> Result<Incident> {
        let incident = Incident::new(kind, target, risk_score, patterns);
        self.db.insert_incident(&incident)?;
        self.prune();
        Ok(incident)
    }

    /// All incidents, newest first.
    pub fn list(&self) -> Result<Vec<Incident>> {
        self.db.list_incidents()
    }

    fn prune(&self) {
        if let Err(e) = self.db.apply_retention(&self.retention) {
            warn!(error = %e, "Incident retention pruning failed");
        }
    }
}

/// Append-only log of extracted intelligence
#[derive(Clone)]
pub struct HoneypotLog {
    db: Database,
    retention: RetentionConfig,
}

impl HoneypotLog {
    /// Create a log over the given database with unbounded retention.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            retention: RetentionConfig::default(),
        }
    }

    /// Set the retention policy.
    pub fn with_retention(mut self, retention: RetentionConfig) -> Self {
        self.retention = retention;
        self
    }

    /// Record one intelligence snapshot. Best-effort relative to the
    /// incident write: callers log a failure and move on.
    pub fn record(
        &self,
        scam_type: impl Into<String>,
        extracted_intel: serde_json::Value,
        incident_id: Option<Uuid>,
    ) -> Result<HoneypotEvent> {
        let mut event = HoneypotEvent::new(scam_type, extracted_intel);
        event.incident_id = incident_id;
        self.db.insert_event(&event)?;
        self.prune();
        Ok(event)
    }

    /// Up to 50 most recent events, newest first.
    pub fn recent(&self) -> Result<Vec<HoneypotEvent>> {
        self.db.recent_events()
    }

    fn prune(&self) {
        if let Err(e) = self.db.apply_retention(&self.retention) {
            warn!(error = %e, "Honeypot retention pruning failed");
        }
    }
}
