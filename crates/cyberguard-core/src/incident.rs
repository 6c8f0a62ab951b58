//! Incident records.
//!
//! An [`Incident`] is one flagged website or audio analysis with the risk
//! score and the reasons that triggered flagging. Incidents are append-only:
//! they are created once, at ingest time, and never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of analysis produced an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentKind {
    /// A scanned website URL
    Website,
    /// A live-call transcript
    Audio,
}

impl std::fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentKind::Website => write!(f, "website"),
            IncidentKind::Audio => write!(f, "audio"),
        }
    }
}

impl std::str::FromStr for IncidentKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "website" | "web" | "url" => Ok(IncidentKind::Website),
            "audio" | "call" | "voice" => Ok(IncidentKind::Audio),
            _ => Err(format!("Unknown incident kind: {}", s)),
        }
    }
}

/// A persisted record of one flagged analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique incident ID, generated at ingest time
    pub id: Uuid,
    /// Which analysis pipeline flagged it
    pub kind: IncidentKind,
    /// The analyzed URL, or a fixed label for live-call sessions
    pub target: String,
    /// Risk score in 0..=100, as reported by the analysis gateway
    pub risk_score: u8,
    /// Ordered reasons the item was flagged
    pub patterns: Vec<String>,
    /// When the incident was recorded; the sole ordering key
    pub created_at: DateTime<Utc>,
}

impl Incident {
    /// Create a new incident with a fresh id and the current timestamp.
    pub fn new(
        kind: IncidentKind,
        target: impl Into<String>,
        risk_score: u8,
        patterns: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            target: target.into(),
            risk_score,
            patterns,
            created_at: Utc::now(),
        }
    }

    /// Override the creation timestamp. Only ordering tests need this.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
