//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::dto::{conversion::session_detail, http::SessionDetailDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Current session state and participants.
///
/// Read through the session actor, so the result is never torn by a
/// concurrent mutation.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionDetailDto>, StatusCode> {
    match state.session.snapshot().await {
        Ok(snapshot) => Ok(Json(session_detail(
            &snapshot.state,
            &snapshot.participants,
        ))),
        Err(e) => {
            tracing::error!("Failed to read session: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
