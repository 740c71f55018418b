//! # Configuration
//!
//! Everything the service needs is read once from the process environment
//! (after `.env` has been loaded by `main`). Loading never fails: database
//! values are passed through untouched so that bad values show up as
//! connection failures, and ambient tunables fall back to their defaults.
//!
//! ## Environment Variables
//!
//! - `PORT` - HTTP listen port, `8080` when absent or empty
//! - `POSTGRES_USER`, `POSTGRES_HOST`, `POSTGRES_DB`, `POSTGRES_PORT` - connection parameters
//! - `POSTGRES_PASSWORD` / `POSTGRES_PASSWORD_FILE` - password, inline or from a mounted file
//! - `DB_CONNECT_RETRIES` - connection attempts before giving up (default 5)
//! - `DB_CONNECT_RETRY_DELAY_SECS` - fixed pause between attempts (default 5)
//! - `DB_QUERY_TIMEOUT_SECS` - bound on the connectivity query (default 5)
//! - `LOG_FORMAT` - `json` for JSON log lines, anything else for human output

use std::env;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use tracing::{error, warn};

use crate::db::RetryPolicy;
use crate::utils::{constant::*, secret::get_secret_with};

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT` from the process environment.
    pub fn from_env() -> Self {
        Self::parse(env::var("LOG_FORMAT").ok().as_deref())
    }

    /// `json` (any case) selects JSON output, anything else the default.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Connection parameters for the single database connection.
///
/// Every field is optional and opaque; anything left unset falls back to the
/// driver's own defaults (including the `PG*` environment variables).
#[derive(Debug, Default)]
pub struct DatabaseConfig {
    pub user: Option<String>,
    pub host: Option<String>,
    pub database: Option<String>,
    pub password: Option<SecretString>,
    pub port: Option<String>,
}

impl DatabaseConfig {
    /// Builds driver connect options from the configured values.
    ///
    /// A port that is not a valid `u16` is ignored with a warning, leaving the
    /// driver's default port in place.
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new();

        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }
        if let Some(port) = &self.port {
            match port.parse::<u16>() {
                Ok(port) => options = options.port(port),
                Err(_) => warn!(%port, "Ignoring unparsable POSTGRES_PORT"),
            }
        }

        options
    }
}

/// Process-wide configuration record
///
/// `LOG_FORMAT` is not part of it: tracing is installed before the
/// configuration loads so that fallback warnings are not lost, and reads it
/// through [`LogFormat::from_env`].
#[derive(Debug)]
pub struct AppConfig {
    pub listen_port: u16,
    pub database: DatabaseConfig,
    pub retry: RetryPolicy,
    pub query_timeout: Duration,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let listen_port = parse_or(&lookup, "PORT", DEFAULT_LISTEN_PORT);

        let database = DatabaseConfig {
            user: lookup("POSTGRES_USER"),
            host: lookup("POSTGRES_HOST"),
            database: lookup("POSTGRES_DB"),
            password: get_secret_with(&lookup, "POSTGRES_PASSWORD_FILE", "POSTGRES_PASSWORD"),
            port: lookup("POSTGRES_PORT"),
        };

        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "DB_CONNECT_RETRIES", DEFAULT_CONNECT_ATTEMPTS),
            delay: Duration::from_secs(parse_or(
                &lookup,
                "DB_CONNECT_RETRY_DELAY_SECS",
                DEFAULT_CONNECT_RETRY_DELAY.as_secs(),
            )),
        };

        let query_timeout = Duration::from_secs(parse_or(
            &lookup,
            "DB_QUERY_TIMEOUT_SECS",
            DEFAULT_QUERY_TIMEOUT.as_secs(),
        ));

        Self {
            listen_port,
            database,
            retry,
            query_timeout,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parses an optional tunable, logging and falling back on bad input.
fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, fallback: T) -> T
where
    T: FromStr + std::fmt::Display + Copy,
{
    match non_empty(lookup(key)) {
        None => fallback,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            error!(%raw, "Invalid {key} env var, using fallback {fallback}");
            fallback
        }),
    }
}
