use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::{debug, instrument};

use crate::error::AppResult;
use crate::models::{AppState, DbNow};

/// Runs `SELECT NOW() as now` on the shared connection.
///
/// GET /api/database-connectivity
///
/// The response is always terminated, whatever the state of the connection.
///
/// # Returns
///
/// - `200 OK` with `{"now": "<RFC 3339>"}` - Database reachable
/// - `503 Service Unavailable` - Connection not (yet) established
/// - `504 Gateway Timeout` - Query did not finish in time
/// - `500 Internal Server Error` - Query failed
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn database_connectivity(State(state): State<Arc<AppState>>) -> AppResult<Json<DbNow>> {
    let row = state.db.now().await?;
    debug!(now = %row.now, "Connectivity query succeeded");

    Ok(Json(row))
}
