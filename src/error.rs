//! # Centralized Error Handling
//!
//! Every failure a handler can hit is an [`AppError`]. Converting it into a
//! response always produces a status code and a JSON body, so no request is
//! ever left without an answer.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Central application error type.
///
/// _Db errors are logged automatically when turned into a response; the other
/// variants are expected conditions and are logged where they are created._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("database connection not established")]
    DatabaseUnavailable,

    #[error("database query timed out")]
    QueryTimeout,
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Db(e) = &self {
            error!(?e, "Database error occurred");
        }

        let (status, message) = match self {
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error"),
            AppError::DatabaseUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database connection not established",
            ),
            AppError::QueryTimeout => (StatusCode::GATEWAY_TIMEOUT, "Database query timed out"),
        };

        let body = Json(ErrorBody { message });
        (status, body).into_response()
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;
