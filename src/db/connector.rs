//! # Connectors
//!
//! A [`Connector`] knows how to open one connection. The retry loop only sees
//! this trait, which lets tests drive it with scripted failures.

use async_trait::async_trait;
use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};
use tracing::{debug, instrument};

/// Something that can open a single database connection.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced on success.
    type Conn: Send + 'static;

    /// Makes one connection attempt.
    ///
    /// # Errors
    ///
    /// Returns the driver error for unreachable hosts, refused or failed
    /// authentication, unknown databases and similar conditions.
    async fn connect(&self) -> Result<Self::Conn, sqlx::Error>;
}

/// Opens PostgreSQL connections from fixed connect options.
#[derive(Debug, Clone)]
pub struct PgConnector {
    options: PgConnectOptions,
}

impl PgConnector {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Conn = PgConnection;

    #[instrument(skip_all, fields(host = %self.options.get_host(), port = self.options.get_port()))]
    async fn connect(&self) -> Result<PgConnection, sqlx::Error> {
        debug!("Opening database connection");
        PgConnection::connect_with(&self.options).await
    }
}
