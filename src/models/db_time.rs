use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Row returned by the connectivity query.
///
/// Serialized as `{"now": "<RFC 3339 timestamp>"}`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbNow {
    #[serde(with = "time::serde::rfc3339")]
    pub now: OffsetDateTime,
}
