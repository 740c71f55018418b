//! # Bounded Connection Retry
//!
//! Linear retry with a fixed pause: at most `max_attempts` attempts, `delay`
//! apart, no pause after the last one.

use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument, warn};

use super::Connector;
use crate::utils::constant::{DEFAULT_CONNECT_ATTEMPTS, DEFAULT_CONNECT_RETRY_DELAY};

/// How many times to try, and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts. `0` is treated as `1`.
    pub max_attempts: u32,
    /// Fixed pause between two consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_CONNECT_ATTEMPTS,
            delay: DEFAULT_CONNECT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Number of attempts actually made when every attempt fails.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Raised once the retry budget is spent.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("gave up connecting to the database after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// Opens a connection through `connector`, retrying according to `policy`.
///
/// `on_attempt` is called with the 1-based attempt number right before each
/// attempt is made.
///
/// # Errors
///
/// Returns [`ConnectError::Exhausted`] with the last driver error when no
/// attempt succeeds.
#[instrument(skip_all, fields(max_attempts = policy.attempts(), delay_secs = policy.delay.as_secs_f64()))]
pub async fn establish<C: Connector>(
    connector: &C,
    policy: RetryPolicy,
    mut on_attempt: impl FnMut(u32) + Send,
) -> Result<C::Conn, ConnectError> {
    let attempts = policy.attempts();
    let mut remaining = attempts;
    let mut attempt = 0;

    loop {
        attempt += 1;
        on_attempt(attempt);

        match connector.connect().await {
            Ok(conn) => {
                info!(attempt, "Connected to database");
                return Ok(conn);
            }
            Err(e) => {
                remaining -= 1;
                warn!(attempt, retries_left = remaining, error = %e, "Database connection attempt failed");

                if remaining == 0 {
                    return Err(ConnectError::Exhausted {
                        attempts,
                        source: e,
                    });
                }

                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}
