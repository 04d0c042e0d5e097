//! Conversation route handlers
//!
//! Thin wire layer over the session manager: requests deserialize into
//! plain structs, outcomes serialize into response bodies, and domain
//! errors map through `HttpError`. Backend failures never surface as
//! HTTP errors — a turn always yields a well-formed body.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::{Deserialize, Serialize};
use switchboard_catalog::ModelId;
use switchboard_core::{HttpError, error_body};
use switchboard_routing::{ComplexityTier, RoutingDecision};
use switchboard_session::{EscalationReport, SessionManager};

/// Build the conversation router with all endpoints
pub fn conversation_router(sessions: SessionManager) -> Router {
    Router::new()
        .route("/conversation/start", routing::post(start_conversation))
        .route("/conversation/{session_id}/turn", routing::post(conversation_turn))
        .route("/conversation/{session_id}/summary", routing::get(conversation_summary))
        .route("/status", routing::get(engine_status))
        .with_state(sessions)
}

/// Handle the health endpoint
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// -- Wire types --

#[derive(Debug, Deserialize)]
struct StartRequest {
    /// Opening message used to pick the primary model
    text: String,
    /// Caller-chosen session id; generated when absent
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct StartResponse {
    session_id: String,
    routing: RoutingInfo,
}

#[derive(Debug, Serialize)]
struct RoutingInfo {
    model: ModelId,
    lane: &'static str,
    confidence: f64,
    reason: String,
    estimated_cost: f64,
    tier: ComplexityTier,
}

impl From<RoutingDecision> for RoutingInfo {
    fn from(decision: RoutingDecision) -> Self {
        Self {
            model: decision.target,
            lane: decision.target.lane(),
            confidence: decision.confidence,
            reason: decision.reason,
            estimated_cost: decision.estimated_cost,
            tier: decision.tier,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TurnRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct TurnResponse {
    response_text: String,
    model: ModelId,
    model_used: String,
    cost: f64,
    switched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    escalation: Option<EscalationReport>,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    active_sessions: usize,
    total_cost: f64,
    total_turns: usize,
    lanes: Vec<LaneInfo>,
}

#[derive(Debug, Serialize)]
struct LaneInfo {
    model: ModelId,
    lane: &'static str,
    cost_per_1k_input: f64,
    cost_per_1k_output: f64,
    description: String,
}

// -- Handlers --

/// Handle `POST /conversation/start`
async fn start_conversation(State(sessions): State<SessionManager>, Json(request): Json<StartRequest>) -> Response {
    let started = sessions.start(&request.text, request.session_id);

    Json(StartResponse {
        session_id: started.session_id,
        routing: started.decision.into(),
    })
    .into_response()
}

/// Handle `POST /conversation/{session_id}/turn`
async fn conversation_turn(
    State(sessions): State<SessionManager>,
    Path(session_id): Path<String>,
    Json(request): Json<TurnRequest>,
) -> Response {
    let outcome = sessions.turn(&session_id, &request.text).await;

    Json(TurnResponse {
        response_text: outcome.response_text,
        model: outcome.model,
        model_used: outcome.model_used,
        cost: outcome.cost,
        switched: outcome.switched,
        escalation: outcome.escalation,
    })
    .into_response()
}

/// Handle `GET /conversation/{session_id}/summary`
async fn conversation_summary(State(sessions): State<SessionManager>, Path(session_id): Path<String>) -> Response {
    match sessions.summary(&session_id).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => (e.status_code(), Json(error_body(&e))).into_response(),
    }
}

/// Handle `GET /status`
async fn engine_status(State(sessions): State<SessionManager>) -> Response {
    let stats = sessions.stats().await;

    let lanes = sessions
        .catalog()
        .descriptors()
        .iter()
        .map(|descriptor| LaneInfo {
            model: descriptor.id,
            lane: descriptor.id.lane(),
            cost_per_1k_input: descriptor.cost_per_1k_input,
            cost_per_1k_output: descriptor.cost_per_1k_output,
            description: descriptor.description.clone(),
        })
        .collect();

    Json(StatusResponse {
        active_sessions: stats.active_sessions,
        total_cost: stats.total_cost,
        total_turns: stats.total_turns,
        lanes,
    })
    .into_response()
}
