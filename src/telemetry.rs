//! # Tracing Setup
//!
//! Installs the global subscriber. `RUST_LOG` drives filtering, falling back to
//! [`DEFAULT_LOG_FILTER`]; [`LogFormat`] picks human or JSON output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogFormat;
use crate::utils::constant::DEFAULT_LOG_FILTER;

/// Initializes the global tracing subscriber.
///
/// Calling it a second time is a no-op apart from a message on stderr.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}
