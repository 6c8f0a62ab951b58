//! Analysis flows.
//!
//! One flow per analysis kind: call the gateway, and only on a flagged,
//! fully-validated verdict write the incident and (best-effort) the honeypot
//! snapshot. A gateway failure aborts the flow before any write; a store
//! failure after a good verdict degrades to a transient, explicitly-tagged
//! record instead of silently merging into committed data.

use cyberguard_core::intel::{ExtractedIntel, SCAM_TYPE_AUDIO_FRAUD, SCAM_TYPE_PHISHING};
use cyberguard_core::{HoneypotLog, Incident, IncidentKind, IncidentLog};
use cyberguard_gateway::{AnalysisGateway, AudioVerdict, ChatTurn, Result, WebsiteVerdict};
use tracing::warn;

/// Fixed target label for live-call analyses
pub const AUDIO_TARGET: &str = "Live Call Analysis";

/// Where a flagged incident ended up.
#[derive(Debug, Clone)]
pub enum Persistence {
    /// Written durably
    Committed { incident: Incident },
    /// Store write failed; the record exists only in this response
    Failed { incident: Incident, error: String },
    /// Verdict was not flagged; nothing to persist
    NotFlagged,
}

/// Outcome of one website analysis
#[derive(Debug, Clone)]
pub struct WebsiteAnalysis {
    pub verdict: WebsiteVerdict,
    pub persistence: Persistence,
}

/// Outcome of one audio analysis
#[derive(Debug, Clone)]
pub struct AudioAnalysis {
    pub verdict: AudioVerdict,
    pub persistence: Persistence,
}

/// Analyze a website URL and record the result if flagged.
pub async fn analyze_website(
    gateway: &dyn AnalysisGateway,
    incidents: &IncidentLog,
    honeypot: &HoneypotLog,
    url: &str,
) -> Result<WebsiteAnalysis> {
    let verdict = gateway.analyze_website(url).await?;

    let persistence = if verdict.is_flagged() {
        let intel = ExtractedIntel::website(url, &verdict.reasons, &verdict.details);
        persist(
            incidents,
            honeypot,
            IncidentKind::Website,
            url,
            verdict.risk_score,
            verdict.reasons.clone(),
            SCAM_TYPE_PHISHING,
            intel,
        )
    } else {
        Persistence::NotFlagged
    };

    Ok(WebsiteAnalysis { verdict, persistence })
}

/// Analyze a call transcript and record the result if flagged.
pub async fn analyze_audio(
    gateway: &dyn AnalysisGateway,
    incidents: &IncidentLog,
    honeypot: &HoneypotLog,
    transcript: &str,
) -> Result<AudioAnalysis> {
    let verdict = gateway.analyze_transcript(transcript).await?;

    let persistence = if verdict.is_scam {
        let intel = ExtractedIntel::audio(&verdict.alerts, &verdict.explanation, transcript);
        persist(
            incidents,
            honeypot,
            IncidentKind::Audio,
            AUDIO_TARGET,
            verdict.scam_probability,
            verdict.alerts.clone(),
            SCAM_TYPE_AUDIO_FRAUD,
            intel,
        )
    } else {
        Persistence::NotFlagged
    };

    Ok(AudioAnalysis { verdict, persistence })
}

/// One support-chat turn.
pub async fn chat_reply(
    gateway: &dyn AnalysisGateway,
    message: &str,
    history: &[ChatTurn],
) -> Result<String> {
    gateway.support_reply(message, history).await
}

/// Write the incident, then the honeypot snapshot. The honeypot write is
/// best-effort: if the incident already landed, its failure is logged and
/// swallowed, tolerating an event/incident count mismatch.
#[allow(clippy::too_many_arguments)]
fn persist(
    incidents: &IncidentLog,
    honeypot: &HoneypotLog,
    kind: IncidentKind,
    target: &str,
    risk_score: u8,
    patterns: Vec<String>,
    scam_type: &str,
    intel: serde_json::Value,
) -> Persistence {
    match incidents.record(kind, target, risk_score, patterns.clone()) {
        Ok(incident) => {
            if let Err(e) = honeypot.record(scam_type, intel, Some(incident.id)) {
                warn!(error = %e, "Honeypot write failed; incident retained without intel");
            }
            Persistence::Committed { incident }
        }
        Err(e) => {
            warn!(error = %e, "Incident write failed; returning transient record");
            Persistence::Failed {
                incident: Incident::new(kind, target, risk_score, patterns),
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberguard_core::Database;
    use cyberguard_gateway::StaticGateway;

    fn logs() -> (IncidentLog, HoneypotLog) {
        let db = Database::in_memory().expect("in-memory db");
        (IncidentLog::new(db.clone()), HoneypotLog::new(db))
    }

    #[tokio::test]
    async fn test_safe_website_produces_no_writes() {
        let (incidents, honeypot) = logs();
        let gateway = StaticGateway::safe();

        let analysis = analyze_website(&gateway, &incidents, &honeypot, "http://example.com")
            .await
            .unwrap();

        assert!(matches!(analysis.persistence, Persistence::NotFlagged));
        assert!(incidents.list().unwrap().is_empty());
        assert!(honeypot.recent().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_flagged_website_writes_incident_and_event() {
        let (incidents, honeypot) = logs();
        let gateway = StaticGateway::flagged();

        let analysis =
            analyze_website(&gateway, &incidents, &honeypot, "http://example-bank-login.com")
                .await
                .unwrap();

        let incident = match &analysis.persistence {
            Persistence::Committed { incident } => incident.clone(),
            other => panic!("expected committed, got {:?}", other),
        };
        assert_eq!(incident.kind, IncidentKind::Website);
        assert_eq!(incident.target, "http://example-bank-login.com");
        assert_eq!(incident.risk_score, 92);
        assert_eq!(incident.patterns, vec!["lookalike domain", "no SSL"]);

        let listed = incidents.list().unwrap();
        assert_eq!(listed, vec![incident.clone()]);

        let events = honeypot.recent().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].scam_type, "Phishing");
        assert_eq!(events[0].incident_id, Some(incident.id));
        assert_eq!(events[0].extracted_intel["url"], "http://example-bank-login.com");
        assert_eq!(events[0].extracted_intel["reasons"][0], "lookalike domain");
    }

    #[tokio::test]
    async fn test_clean_transcript_produces_no_writes() {
        let (incidents, honeypot) = logs();
        let gateway = StaticGateway::safe();

        let analysis = analyze_audio(&gateway, &incidents, &honeypot, "hi, how are you")
            .await
            .unwrap();

        assert!(matches!(analysis.persistence, Persistence::NotFlagged));
        assert!(incidents.list().unwrap().is_empty());
        assert!(honeypot.recent().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scam_transcript_writes_audio_incident() {
        let (incidents, honeypot) = logs();
        let gateway = StaticGateway::flagged();

        let transcript = "your account will be suspended unless you pay now";
        let analysis = analyze_audio(&gateway, &incidents, &honeypot, transcript)
            .await
            .unwrap();

        assert!(matches!(analysis.persistence, Persistence::Committed { .. }));

        let listed = incidents.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, IncidentKind::Audio);
        assert_eq!(listed[0].target, AUDIO_TARGET);
        assert_eq!(listed[0].risk_score, 87);

        let events = honeypot.recent().unwrap();
        assert_eq!(events[0].scam_type, "Audio Fraud");
        assert_eq!(events[0].extracted_intel["transcript"], transcript);
    }

    #[tokio::test]
    async fn test_gateway_fault_leaves_store_untouched() {
        let (incidents, honeypot) = logs();

        // Seed one prior incident, then fail the next analysis
        analyze_website(&StaticGateway::flagged(), &incidents, &honeypot, "http://seed.example")
            .await
            .unwrap();
        let before = incidents.list().unwrap();

        let result =
            analyze_website(&StaticGateway::failing(), &incidents, &honeypot, "http://x.example")
                .await;
        assert!(result.is_err());

        assert_eq!(incidents.list().unwrap(), before);
        assert_eq!(honeypot.recent().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_yields_tagged_transient_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cyberguard.db");
        let db = Database::open(&path).unwrap();
        let incidents = IncidentLog::new(db.clone());
        let honeypot = HoneypotLog::new(db);

        // A second connection holding an exclusive lock makes every insert
        // fail immediately with SQLITE_BUSY
        let blocker = rusqlite::Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN EXCLUSIVE;").unwrap();

        let analysis =
            analyze_website(&StaticGateway::flagged(), &incidents, &honeypot, "http://x.example")
                .await
                .unwrap();

        match analysis.persistence {
            Persistence::Failed { incident, error } => {
                assert_eq!(incident.target, "http://x.example");
                assert_eq!(incident.risk_score, 92);
                assert!(!error.is_empty());
            }
            other => panic!("expected failed persistence, got {:?}", other),
        }

        drop(blocker);
        assert!(incidents.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_chat_reply_passes_through() {
        let gateway = StaticGateway::flagged().with_reply("Freeze the card first.");
        let history = vec![ChatTurn::user("I was scammed.")];
        let reply = chat_reply(&gateway, "What should I do?", &history).await.unwrap();
        assert_eq!(reply, "Freeze the card first.");
    }
}
