//! Deterministic gateway stand-in.
//!
//! The external service is an uncontrolled dependency, so everything above
//! this crate tests against [`StaticGateway`]: fixed verdict payloads, or a
//! simulated outage, with zero network traffic.

use async_trait::async_trait;

use crate::verdict::{AudioVerdict, ChatTurn, SiteStatus, WebsiteVerdict};
use crate::{AnalysisGateway, GatewayError, Result};

/// A gateway that returns fixed verdicts, or fails every call.
#[derive(Debug, Clone)]
pub struct StaticGateway {
    website: WebsiteVerdict,
    audio: AudioVerdict,
    reply: String,
    fail: bool,
}

impl StaticGateway {
    /// A gateway that flags everything (website: Fake/92, audio: scam/87).
    pub fn flagged() -> Self {
        Self {
            website: WebsiteVerdict {
                status: SiteStatus::Fake,
                risk_score: 92,
                reasons: vec!["lookalike domain".to_string(), "no SSL".to_string()],
                details: "Mimics a bank login page.".to_string(),
            },
            audio: AudioVerdict {
                scam_probability: 87,
                is_scam: true,
                alerts: vec!["urgency".to_string(), "bank impersonation".to_string()],
                explanation: "Caller pressures for account details.".to_string(),
            },
            reply: "Stay calm. Here is what to do next.".to_string(),
            fail: false,
        }
    }

    /// A gateway that considers everything safe.
    pub fn safe() -> Self {
        Self {
            website: WebsiteVerdict {
                status: SiteStatus::Safe,
                risk_score: 4,
                reasons: vec![],
                details: "Well-known domain with valid SSL.".to_string(),
            },
            audio: AudioVerdict {
                scam_probability: 3,
                is_scam: false,
                alerts: vec![],
                explanation: "Ordinary conversation, no pressure tactics.".to_string(),
            },
            reply: "Glad everything looks fine.".to_string(),
            fail: false,
        }
    }

    /// A gateway where every call fails (simulated outage).
    pub fn failing() -> Self {
        let mut gateway = Self::safe();
        gateway.fail = true;
        gateway
    }

    /// Override the website verdict.
    pub fn with_website(mut self, verdict: WebsiteVerdict) -> Self {
        self.website = verdict;
        self
    }

    /// Override the audio verdict.
    pub fn with_audio(mut self, verdict: AudioVerdict) -> Self {
        self.audio = verdict;
        self
    }

    /// Override the chat reply.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    fn check_available(&self) -> Result<()> {
        if self.fail {
            return Err(GatewayError::Api {
                status: 503,
                message: "simulated outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AnalysisGateway for StaticGateway {
    fn name(&self) -> &str {
        "static"
    }

    async fn analyze_website(&self, _url: &str) -> Result<WebsiteVerdict> {
        self.check_available()?;
        Ok(self.website.clone())
    }

    async fn analyze_transcript(&self, _transcript: &str) -> Result<AudioVerdict> {
        self.check_available()?;
        Ok(self.audio.clone())
    }

    async fn support_reply(&self, _message: &str, _history: &[ChatTurn]) -> Result<String> {
        self.check_available()?;
        Ok(self.reply.clone())
    }
}
