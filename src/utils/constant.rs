//! # Application Constants
//!
//! Defaults for every tunable read from the environment, plus the fixed
//! strings and limits used by the HTTP layer.

use std::time::Duration;

/// Listen port used when `PORT` is absent or empty
pub const DEFAULT_LISTEN_PORT: u16 = 8080;

/// Number of connection attempts made before giving up on the database
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 5;

/// Fixed pause between two consecutive connection attempts
pub const DEFAULT_CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Upper bound on the connectivity query, lock acquisition included
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on any single request handled by the router
///
/// Kept above [`DEFAULT_QUERY_TIMEOUT`] so the query timeout answers first
/// with its own status code.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Body returned by the liveness route
pub const LIVENESS_BODY: &str = "API is running";

/// Query issued by the connectivity route
pub const CONNECTIVITY_QUERY: &str = "SELECT NOW() as now";

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "pgpulse=info,tower_http=info";
