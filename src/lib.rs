//! # pgpulse - Database Connectivity Backend
//!
//! A small HTTP service that reports its own liveness and whether it can reach
//! its PostgreSQL database. One connection is opened at startup by a
//! supervised retry task and shared with every request.
//!
//! ## Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`db`] - Connection retry loop and the shared connection handle
//! - [`handlers`] - HTTP request handlers
//! - [`models`] - Shared state and response rows
//! - [`telemetry`] - Tracing subscriber setup
//! - [`utils`] - Constants and secret loading

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod telemetry;
pub mod utils;

use std::sync::Arc;

use axum::{Router, http::StatusCode, routing::get};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::db::DbHandle;
use crate::handlers::{api_status, database_connectivity, readiness};
use crate::models::AppState;
use crate::utils::constant::REQUEST_TIMEOUT;

/// Creates the Axum router with all routes and middleware.
///
/// # Arguments
///
/// * `db` - Handle to the database connection; it may still be empty, in
///   which case the connectivity route answers `503`
///
/// # Routes
///
/// - `GET /api` - Liveness
/// - `GET /api/database-connectivity` - Database time
/// - `GET /api/ready` - Readiness of the database connection
pub fn app(db: DbHandle) -> Router {
    let state = Arc::new(AppState::new(db));

    Router::new()
        .route("/api", get(api_status))
        .route("/api/database-connectivity", get(database_connectivity))
        .route("/api/ready", get(readiness))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .with_state(state)
}
