//! Honeypot intelligence events.
//!
//! A [`HoneypotEvent`] is a denormalized snapshot of what a flagged verdict
//! contained, kept for aggregate threat display. The payload is a blob, not
//! a normalized table: downstream views only ever render it whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scam-type label for flagged website scans
pub const SCAM_TYPE_PHISHING: &str = "Phishing";
/// Scam-type label for flagged call transcripts
pub const SCAM_TYPE_AUDIO_FRAUD: &str = "Audio Fraud";

/// Cap on stored source-text excerpts, in characters
pub const INTEL_EXCERPT_MAX: usize = 200;

/// A persisted log entry of extracted intelligence from a flagged interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoneypotEvent {
    /// Unique event ID, generated at ingest time
    pub id: Uuid,
    /// Free-text category label ("Phishing", "Audio Fraud")
    pub scam_type: String,
    /// Structured snapshot of the verdict; opaque to the store
    pub extracted_intel: serde_json::Value,
    /// The incident this event was extracted from, when known
    pub incident_id: Option<Uuid>,
    /// When the event was recorded; the sole ordering key
    pub created_at: DateTime<Utc>,
}

impl HoneypotEvent {
    /// Create a new event with a fresh id and the current timestamp.
    pub fn new(scam_type: impl Into<String>, extracted_intel: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            scam_type: scam_type.into(),
            extracted_intel,
            incident_id: None,
            created_at: Utc::now(),
        }
    }

    /// Attach the originating incident id.
    pub fn with_incident(mut self, incident_id: Uuid) -> Self {
        self.incident_id = Some(incident_id);
        self
    }

    /// Override the creation timestamp. Only ordering tests need this.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Builders for the intel snapshots the analysis flows record.
pub struct ExtractedIntel;

impl ExtractedIntel {
    /// Snapshot of a flagged website verdict.
    pub fn website(url: &str, reasons: &[String], details: &str) -> serde_json::Value {
        serde_json::json!({
            "url": truncate_excerpt(url),
            "reasons": reasons,
            "details": details,
        })
    }

    /// Snapshot of a flagged call-transcript verdict.
    pub fn audio(alerts: &[String], explanation: &str, transcript: &str) -> serde_json::Value {
        serde_json::json!({
            "alerts": alerts,
            "explanation": explanation,
            "transcript": truncate_excerpt(transcript),
        })
    }
}

/// Truncate source text to [`INTEL_EXCERPT_MAX`] characters, respecting
/// char boundaries.
pub fn truncate_excerpt(text: &str) -> String {
    text.chars().take(INTEL_EXCERPT_MAX).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_excerpt("hello"), "hello");
    }

    #[test]
    fn test_truncate_caps_at_200_chars() {
        let long = "a".repeat(500);
        let truncated = truncate_excerpt(&long);
        assert_eq!(truncated.chars().count(), INTEL_EXCERPT_MAX);
    }

    #[test]
    fn test_truncate_is_char_boundary_safe() {
        // 300 multi-byte chars; byte-indexed slicing would panic here
        let long: String = "ß".repeat(300);
        let truncated = truncate_excerpt(&long);
        assert_eq!(truncated.chars().count(), INTEL_EXCERPT_MAX);
    }

    #[test]
    fn test_website_intel_shape() {
        let reasons = vec!["lookalike domain".to_string(), "no SSL".to_string()];
        let intel = ExtractedIntel::website("http://example-bank-login.com", &reasons, "Mimics a bank login page");
        assert_eq!(intel["url"], "http://example-bank-login.com");
        assert_eq!(intel["reasons"][1], "no SSL");
        assert_eq!(intel["details"], "Mimics a bank login page");
    }

    #[test]
    fn test_audio_intel_truncates_transcript() {
        let transcript = "urgent ".repeat(100);
        let intel = ExtractedIntel::audio(&["urgency".to_string()], "Classic pressure script", &transcript);
        let stored = intel["transcript"].as_str().unwrap();
        assert_eq!(stored.chars().count(), INTEL_EXCERPT_MAX);
    }

    #[test]
    fn test_event_builder() {
        let incident_id = Uuid::new_v4();
        let event = HoneypotEvent::new(SCAM_TYPE_PHISHING, serde_json::json!({"url": "x"}))
            .with_incident(incident_id);
        assert_eq!(event.scam_type, "Phishing");
        assert_eq!(event.incident_id, Some(incident_id));
    }
}
