//! The gateway trait.
//!
//! One trait, three request kinds. Implementations make at most one attempt
//! per call; retry policy belongs to no one (no error in this system is
//! retried automatically).

use crate::verdict::{AudioVerdict, ChatTurn, WebsiteVerdict};
use crate::Result;
use async_trait::async_trait;

/// The external analysis collaborator.
///
/// All three operations are synchronous request/response from the caller's
/// point of view and may take seconds; the presentation layer disables
/// re-submission while a call is pending.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// Gateway name (e.g., "gemini", "static")
    fn name(&self) -> &str;

    /// Assess a website URL for phishing/scam indicators.
    async fn analyze_website(&self, url: &str) -> Result<WebsiteVerdict>;

    /// Assess a call transcript for scam indicators.
    async fn analyze_transcript(&self, transcript: &str) -> Result<AudioVerdict>;

    /// Produce one support-chat reply given the prior turns.
    async fn support_reply(&self, message: &str, history: &[ChatTurn]) -> Result<String>;
}
