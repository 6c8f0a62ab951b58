//! # Gemini Gateway
//!
//! Implementation against the Google Gemini `generateContent` REST API in
//! structured-output mode: each analysis request carries a response schema
//! and the reply body is parsed and validated before anything is persisted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::verdict::{AudioVerdict, ChatRole, ChatTurn, WebsiteVerdict};
use crate::{AnalysisGateway, GatewayError, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// System instruction for the victim-support chat
const SUPPORT_SYSTEM_PROMPT: &str = "You are CyberGuard Support, an empathetic and calm AI assistant for cybercrime victims. \
Your goal is to reduce panic, provide step-by-step practical advice, and encourage reporting to official channels. \
You are NOT a lawyer or a therapist, but a supportive guidance assistant. \
Keep a professional yet warm tone. \
If the user is in immediate distress, guide them to the nearest police station or official helpline.";

fn website_prompt(url: &str) -> String {
    format!(
        "Analyze this website URL for potential phishing or scam indicators: {}. \
         Consider URL structure, common phishing keywords, and typical malicious patterns.",
        url
    )
}

fn audio_prompt(transcript: &str) -> String {
    format!(
        "Analyze this transcript of an audio call for scam indicators: \"{}\". \
         Look for urgency, manipulation, requests for sensitive info, or known scam scripts \
         (e.g., tech support, bank fraud, lottery).",
        transcript
    )
}

fn website_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "status": { "type": "STRING", "enum": ["Safe", "Suspicious", "Fake"] },
            "riskScore": { "type": "NUMBER", "description": "Risk score from 0 to 100" },
            "reasons": { "type": "ARRAY", "items": { "type": "STRING" } },
            "details": { "type": "STRING" }
        },
        "required": ["status", "riskScore", "reasons", "details"]
    })
}

fn audio_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "scamProbability": { "type": "NUMBER" },
            "isScam": { "type": "BOOLEAN" },
            "alerts": { "type": "ARRAY", "items": { "type": "STRING" } },
            "explanation": { "type": "STRING" }
        },
        "required": ["scamProbability", "isScam", "alerts", "explanation"]
    })
}

/// Google Gemini gateway
pub struct GeminiGateway {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiGateway {
    /// Create a new gateway with the default endpoint, model, and a 30 s
    /// request timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_client(Duration::from_secs(30)),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Override the base URL (tests point this at a local mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// One `generateContent` round trip; returns the first candidate's text.
    async fn generate(
        &self,
        contents: Vec<GeminiContent>,
        system_instruction: Option<&str>,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String> {
        let request = GenerateRequest {
            contents,
            system_instruction: system_instruction.map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: text.to_string() }],
            }),
            generation_config: response_schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Some(schema),
            }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!(model = %self.model, "Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status,
                message: body,
            });
        }

        let body: GenerateResponse = response.json().await?;

        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| GatewayError::MissingContent("No candidates in response".to_string()))
    }
}

#[async_trait]
impl AnalysisGateway for GeminiGateway {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze_website(&self, url: &str) -> Result<WebsiteVerdict> {
        let contents = vec![GeminiContent::user(website_prompt(url))];
        let text = self.generate(contents, None, Some(website_schema())).await?;
        WebsiteVerdict::from_json(&text).map_err(GatewayError::InvalidVerdict)
    }

    async fn analyze_transcript(&self, transcript: &str) -> Result<AudioVerdict> {
        let contents = vec![GeminiContent::user(audio_prompt(transcript))];
        let text = self.generate(contents, None, Some(audio_schema())).await?;
        AudioVerdict::from_json(&text).map_err(GatewayError::InvalidVerdict)
    }

    async fn support_reply(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let mut contents: Vec<GeminiContent> = history
            .iter()
            .map(|turn| GeminiContent {
                role: Some(match turn.role {
                    ChatRole::User => "user".to_string(),
                    ChatRole::Assistant => "model".to_string(),
                }),
                parts: vec![GeminiPart {
                    text: turn.content.clone(),
                }],
            })
            .collect();
        contents.push(GeminiContent::user(message.to_string()));

        self.generate(contents, Some(SUPPORT_SYSTEM_PROMPT), None).await
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn user(text: String) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![GeminiPart { text }],
        }
    }
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}
