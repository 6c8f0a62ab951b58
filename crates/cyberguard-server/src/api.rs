//! REST API.
//!
//! JSON only, no authentication. Read endpoints degrade to empty results on
//! store faults so the dashboard stays usable; analyze endpoints surface
//! gateway faults as 502 without persisting anything. Write endpoints always
//! generate ids and timestamps server-side, ignoring any client-supplied
//! values.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::warn;
use uuid::Uuid;

use cyberguard_core::{Database, HoneypotEvent, HoneypotLog, Incident, IncidentKind, IncidentLog};
use cyberguard_gateway::{AnalysisGateway, ChatTurn};

use crate::dashboard;
use crate::flow::{self, Persistence};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub incidents: IncidentLog,
    pub honeypot: HoneypotLog,
    pub gateway: Arc<dyn AnalysisGateway>,
}

impl AppState {
    /// Assemble state over one database and gateway.
    pub fn new(db: Database, gateway: Arc<dyn AnalysisGateway>) -> Self {
        Self {
            incidents: IncidentLog::new(db.clone()),
            honeypot: HoneypotLog::new(db.clone()),
            db,
            gateway,
        }
    }

    /// Replace the ingest services (used to attach retention policies).
    pub fn with_logs(mut self, incidents: IncidentLog, honeypot: HoneypotLog) -> Self {
        self.incidents = incidents;
        self.honeypot = honeypot;
        self
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::page))
        .route("/api/incidents", get(list_incidents).post(submit_incident))
        .route("/api/honeypot", get(list_honeypot).post(submit_event))
        .route("/api/analyze/website", post(analyze_website))
        .route("/api/analyze/audio", post(analyze_audio))
        .route("/api/chat", post(chat))
        .route("/api/stats", get(stats))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct IncidentDto {
    id: String,
    #[serde(rename = "type")]
    kind: IncidentKind,
    target: String,
    timestamp: String,
    #[serde(rename = "riskScore")]
    risk_score: u8,
    patterns: Vec<String>,
}

impl From<Incident> for IncidentDto {
    fn from(incident: Incident) -> Self {
        Self {
            id: incident.id.to_string(),
            kind: incident.kind,
            target: incident.target,
            timestamp: incident.created_at.to_rfc3339(),
            risk_score: incident.risk_score,
            patterns: incident.patterns,
        }
    }
}

#[derive(Debug, Serialize)]
struct HoneypotEventDto {
    id: String,
    scam_type: String,
    intel_extracted: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    incident_id: Option<String>,
    timestamp: String,
}

impl From<HoneypotEvent> for HoneypotEventDto {
    fn from(event: HoneypotEvent) -> Self {
        Self {
            id: event.id.to_string(),
            scam_type: event.scam_type,
            intel_extracted: event.extracted_intel,
            incident_id: event.incident_id.map(|id| id.to_string()),
            timestamp: event.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
enum PersistenceDto {
    /// The incident is durably stored
    Committed { incident: IncidentDto },
    /// The store rejected the write; this record is transient
    Failed { incident: IncidentDto, error: String },
    /// Nothing was flagged, nothing was written
    NotFlagged,
}

impl From<Persistence> for PersistenceDto {
    fn from(persistence: Persistence) -> Self {
        match persistence {
            Persistence::Committed { incident } => PersistenceDto::Committed {
                incident: incident.into(),
            },
            Persistence::Failed { incident, error } => PersistenceDto::Failed {
                incident: incident.into(),
                error,
            },
            Persistence::NotFlagged => PersistenceDto::NotFlagged,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IncidentSubmission {
    #[serde(rename = "type", alias = "kind")]
    kind: IncidentKind,
    target: String,
    #[serde(rename = "riskScore", alias = "risk_score")]
    risk_score: u8,
    #[serde(default)]
    patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EventSubmission {
    scam_type: String,
    intel_extracted: serde_json::Value,
    #[serde(default)]
    incident_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeWebsiteRequest {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AnalyzeAudioRequest {
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({ "status": "error", "error": message.into() })),
    )
        .into_response()
}

// ── Incident endpoints ───────────────────────────────────────────────────

async fn list_incidents(State(state): State<AppState>) -> impl IntoResponse {
    let incidents = match state.incidents.list() {
        Ok(incidents) => incidents,
        Err(e) => {
            warn!(error = %e, "Incident listing failed; serving empty list");
            Vec::new()
        }
    };
    let dtos: Vec<IncidentDto> = incidents.into_iter().map(Into::into).collect();
    Json(dtos)
}

async fn submit_incident(
    State(state): State<AppState>,
    Json(submission): Json<IncidentSubmission>,
) -> axum::response::Response {
    if submission.risk_score > 100 {
        return error_response(StatusCode::BAD_REQUEST, "riskScore must be in 0..=100");
    }

    match state.incidents.record(
        submission.kind,
        submission.target,
        submission.risk_score,
        submission.patterns,
    ) {
        Ok(incident) => Json(serde_json::json!({
            "status": "ok",
            "incident": IncidentDto::from(incident),
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Incident write failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ── Honeypot endpoints ───────────────────────────────────────────────────

async fn list_honeypot(State(state): State<AppState>) -> impl IntoResponse {
    let events = match state.honeypot.recent() {
        Ok(events) => events,
        Err(e) => {
            warn!(error = %e, "Honeypot listing failed; serving empty list");
            Vec::new()
        }
    };
    let dtos: Vec<HoneypotEventDto> = events.into_iter().map(Into::into).collect();
    Json(dtos)
}

async fn submit_event(
    State(state): State<AppState>,
    Json(submission): Json<EventSubmission>,
) -> axum::response::Response {
    let intel = normalize_intel(submission.intel_extracted);

    match state
        .honeypot
        .record(submission.scam_type, intel, submission.incident_id)
    {
        Ok(event) => Json(serde_json::json!({
            "status": "ok",
            "event": HoneypotEventDto::from(event),
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Honeypot write failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Callers historically posted the intel blob as a JSON-encoded string;
/// unwrap that form so the store always holds structure.
fn normalize_intel(intel: serde_json::Value) -> serde_json::Value {
    if let serde_json::Value::String(s) = &intel {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(s) {
            return parsed;
        }
    }
    intel
}

// ── Analysis endpoints ───────────────────────────────────────────────────

async fn analyze_website(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeWebsiteRequest>,
) -> axum::response::Response {
    if request.url.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "url must not be empty");
    }

    match flow::analyze_website(
        state.gateway.as_ref(),
        &state.incidents,
        &state.honeypot,
        request.url.trim(),
    )
    .await
    {
        Ok(analysis) => Json(serde_json::json!({
            "verdict": analysis.verdict,
            "persistence": PersistenceDto::from(analysis.persistence),
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Website analysis failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

async fn analyze_audio(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeAudioRequest>,
) -> axum::response::Response {
    if request.transcript.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "transcript must not be empty");
    }

    match flow::analyze_audio(
        state.gateway.as_ref(),
        &state.incidents,
        &state.honeypot,
        &request.transcript,
    )
    .await
    {
        Ok(analysis) => Json(serde_json::json!({
            "verdict": analysis.verdict,
            "persistence": PersistenceDto::from(analysis.persistence),
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "Audio analysis failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> axum::response::Response {
    if request.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    match flow::chat_reply(state.gateway.as_ref(), &request.message, &request.history).await {
        Ok(content) => Json(serde_json::json!({ "content": content })).into_response(),
        Err(e) => {
            warn!(error = %e, "Support chat failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

// ── Aggregates ───────────────────────────────────────────────────────────

async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.stats() {
        Ok(stats) => Json(serde_json::json!({
            "incidents": stats.incident_count,
            "website_incidents": stats.website_count,
            "audio_incidents": stats.audio_count,
            "honeypot_events": stats.event_count,
        })),
        Err(e) => {
            warn!(error = %e, "Stats query failed; serving zeros");
            Json(serde_json::json!({
                "incidents": 0,
                "website_incidents": 0,
                "audio_incidents": 0,
                "honeypot_events": 0,
            }))
        }
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "healthy": true })))
}
