use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use tracing::{debug, instrument};

use crate::db::ConnectionStatus;
use crate::models::AppState;

/// Reports whether the database connection has been established.
///
/// GET /api/ready
///
/// # Returns
///
/// - `200 OK` with `{"status": "connected"}`
/// - `503 Service Unavailable` with `{"status": "connecting", "attempt": n}`,
///   `{"status": "exhausted", "attempts": n}` or `{"status": "closed"}`
#[instrument(skip_all)]
pub async fn readiness(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ConnectionStatus>) {
    let status = state.db.status();
    debug!(?status, "Readiness endpoint accessed");

    let code = match status {
        ConnectionStatus::Connected => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };

    (code, Json(status))
}
