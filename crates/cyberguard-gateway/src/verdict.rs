//! Verdict types.
//!
//! The structured results the gateway must return for each analysis kind,
//! plus the validation that stands between a model reply and the store: a
//! record is written only after a fully-parsed, schema-valid verdict.

use serde::{Deserialize, Serialize};

/// Classification of a scanned website
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteStatus {
    Safe,
    Suspicious,
    Fake,
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiteStatus::Safe => write!(f, "Safe"),
            SiteStatus::Suspicious => write!(f, "Suspicious"),
            SiteStatus::Fake => write!(f, "Fake"),
        }
    }
}

impl std::str::FromStr for SiteStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Safe" => Ok(SiteStatus::Safe),
            "Suspicious" => Ok(SiteStatus::Suspicious),
            "Fake" => Ok(SiteStatus::Fake),
            _ => Err(format!("Unknown site status: {}", s)),
        }
    }
}

/// Verdict for a website risk request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteVerdict {
    pub status: SiteStatus,
    /// Risk score in 0..=100
    pub risk_score: u8,
    /// Ordered findings that justify the status
    pub reasons: Vec<String>,
    pub details: String,
}

impl WebsiteVerdict {
    /// Parse and validate a JSON verdict body.
    pub fn from_json(text: &str) -> std::result::Result<Self, String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            status: String,
            risk_score: i64,
            reasons: Vec<String>,
            details: String,
        }

        let raw: Raw =
            serde_json::from_str(text).map_err(|e| format!("malformed website verdict: {}", e))?;
        let status = raw.status.parse::<SiteStatus>()?;
        if !(0..=100).contains(&raw.risk_score) {
            return Err(format!("risk score out of range: {}", raw.risk_score));
        }

        Ok(Self {
            status,
            risk_score: raw.risk_score as u8,
            reasons: raw.reasons,
            details: raw.details,
        })
    }

    /// Whether this verdict should produce incident + honeypot writes.
    pub fn is_flagged(&self) -> bool {
        self.status != SiteStatus::Safe
    }
}

/// Verdict for an audio/transcript risk request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioVerdict {
    /// Scam confidence in 0..=100
    pub scam_probability: u8,
    pub is_scam: bool,
    /// Ordered risk indicators detected in the transcript
    pub alerts: Vec<String>,
    pub explanation: String,
}

impl AudioVerdict {
    /// Parse and validate a JSON verdict body.
    pub fn from_json(text: &str) -> std::result::Result<Self, String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            scam_probability: i64,
            is_scam: bool,
            alerts: Vec<String>,
            explanation: String,
        }

        let raw: Raw =
            serde_json::from_str(text).map_err(|e| format!("malformed audio verdict: {}", e))?;
        if !(0..=100).contains(&raw.scam_probability) {
            return Err(format!("scam probability out of range: {}", raw.scam_probability));
        }

        Ok(Self {
            scam_probability: raw.scam_probability as u8,
            is_scam: raw.is_scam,
            alerts: raw.alerts,
            explanation: raw.explanation,
        })
    }
}

/// Role in a support-chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One prior turn of the support chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_website_verdict_parses() {
        let verdict = WebsiteVerdict::from_json(
            r#"{"status":"Fake","riskScore":92,"reasons":["lookalike domain","no SSL"],"details":"Mimics a bank login page."}"#,
        )
        .unwrap();
        assert_eq!(verdict.status, SiteStatus::Fake);
        assert_eq!(verdict.risk_score, 92);
        assert_eq!(verdict.reasons, vec!["lookalike domain", "no SSL"]);
        assert!(verdict.is_flagged());
    }

    #[test]
    fn test_safe_is_not_flagged() {
        let verdict = WebsiteVerdict::from_json(
            r#"{"status":"Safe","riskScore":5,"reasons":[],"details":"Well-known domain."}"#,
        )
        .unwrap();
        assert!(!verdict.is_flagged());
    }

    #[test]
    fn test_website_verdict_rejects_out_of_range_score() {
        let err = WebsiteVerdict::from_json(
            r#"{"status":"Fake","riskScore":150,"reasons":[],"details":""}"#,
        )
        .unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_website_verdict_rejects_unknown_status() {
        let err = WebsiteVerdict::from_json(
            r#"{"status":"Dangerous","riskScore":50,"reasons":[],"details":""}"#,
        )
        .unwrap_err();
        assert!(err.contains("Unknown site status"));
    }

    #[test]
    fn test_website_verdict_rejects_missing_field() {
        let err = WebsiteVerdict::from_json(r#"{"status":"Safe","riskScore":5}"#).unwrap_err();
        assert!(err.contains("malformed"));
    }

    #[test]
    fn test_audio_verdict_parses() {
        let verdict = AudioVerdict::from_json(
            r#"{"scamProbability":87,"isScam":true,"alerts":["urgency","bank impersonation"],"explanation":"Caller pressures for account details."}"#,
        )
        .unwrap();
        assert_eq!(verdict.scam_probability, 87);
        assert!(verdict.is_scam);
        assert_eq!(verdict.alerts.len(), 2);
    }

    #[test]
    fn test_audio_verdict_rejects_negative_probability() {
        let err = AudioVerdict::from_json(
            r#"{"scamProbability":-1,"isScam":false,"alerts":[],"explanation":""}"#,
        )
        .unwrap_err();
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_chat_turn_serialization() {
        let turn = ChatTurn::assistant("Stay calm, here is what to do next.");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"assistant\""));
    }
}
