//! # CyberGuard Gateway
//!
//! The analysis gateway boundary. Every analytical judgment in CyberGuard -
//! risk score, classification, explanation - is produced by an external
//! generative-language model behind this crate. The application forwards
//! raw input, parses the structured JSON reply, and trusts nothing else.
//!
//! The gateway is a fully substitutable dependency: [`GeminiGateway`] talks
//! to the real API, [`StaticGateway`] returns fixed verdicts for tests and
//! offline use.

pub mod gemini;
pub mod stub;
pub mod traits;
pub mod verdict;

pub use gemini::GeminiGateway;
pub use stub::StaticGateway;
pub use traits::AnalysisGateway;
pub use verdict::{AudioVerdict, ChatRole, ChatTurn, SiteStatus, WebsiteVerdict};

use thiserror::Error;

/// Gateway errors. All of them are recoverable: the calling flow aborts the
/// current analysis and persists nothing.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Empty response: {0}")]
    MissingContent(String),

    #[error("Invalid verdict: {0}")]
    InvalidVerdict(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
