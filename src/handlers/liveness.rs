//! # Liveness Handler
//!
//! Answers as long as the process is serving HTTP. It never touches the
//! database, so it stays green while the connection is still being set up or
//! after the retry budget ran out.

use tracing::{debug, instrument};

use crate::utils::constant::LIVENESS_BODY;

/// Liveness endpoint.
///
/// GET /api
///
/// # Returns
///
/// Always `200 OK` with the plain-text body `API is running`.
#[instrument]
pub async fn api_status() -> &'static str {
    debug!("Liveness endpoint accessed");
    LIVENESS_BODY
}
