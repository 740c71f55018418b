//! # Database Handle
//!
//! [`DbHandle`] owns the service's only database connection. It starts out
//! empty, is filled at most once by the startup task, and publishes its
//! progress through a [`ConnectionStatus`] watch channel so that readiness can
//! be observed or awaited.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::{Connection, PgConnection};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::{Connector, RetryPolicy, establish};
use crate::error::{AppError, AppResult};
use crate::models::DbNow;
use crate::utils::constant::CONNECTIVITY_QUERY;

/// Progress of the startup connection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Attempt number `attempt` is in flight or about to start.
    Connecting { attempt: u32 },
    /// The connection is installed and serving queries.
    Connected,
    /// Every attempt failed; the handle stays empty until restart.
    Exhausted { attempts: u32 },
    /// The connection was closed during shutdown.
    Closed,
}

impl ConnectionStatus {
    /// Whether the startup task has finished, one way or the other.
    pub fn is_settled(&self) -> bool {
        !matches!(self, ConnectionStatus::Connecting { .. })
    }
}

struct Inner {
    conn: Mutex<Option<PgConnection>>,
    status: watch::Sender<ConnectionStatus>,
    query_timeout: Duration,
}

/// Shared, cheaply clonable handle to the single database connection.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<Inner>,
}

impl DbHandle {
    /// Creates an empty handle, reporting `Connecting { attempt: 0 }` until a
    /// startup task is spawned.
    pub fn new(query_timeout: Duration) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Connecting { attempt: 0 });
        Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(None),
                status,
                query_timeout,
            }),
        }
    }

    /// Creates a handle around an already open connection.
    pub fn with_connection(conn: PgConnection, query_timeout: Duration) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Connected);
        Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(Some(conn)),
                status,
                query_timeout,
            }),
        }
    }

    /// Current status of the connection.
    pub fn status(&self) -> ConnectionStatus {
        *self.inner.status.borrow()
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    /// Waits until the startup task has either connected or given up.
    ///
    /// Never returns on a handle created with [`DbHandle::new`] that has no
    /// startup task spawned.
    pub async fn wait_settled(&self) -> ConnectionStatus {
        let mut rx = self.subscribe();
        match rx.wait_for(ConnectionStatus::is_settled).await {
            Ok(status) => *status,
            // The sender lives as long as `self`, so this cannot be reached.
            Err(_) => self.status(),
        }
    }

    /// Spawns the supervised startup task that connects through `connector`.
    ///
    /// The returned task never fails: on success the connection is installed,
    /// on exhaustion the status moves to [`ConnectionStatus::Exhausted`] and
    /// the error is logged. The task does nothing on a handle that already
    /// holds a connection, and stops as soon as the handle is closed.
    pub fn spawn_establish<C>(&self, connector: C, policy: RetryPolicy) -> JoinHandle<()>
    where
        C: Connector<Conn = PgConnection>,
    {
        let handle = self.clone();
        tokio::spawn(async move {
            if handle.status() == ConnectionStatus::Connected {
                warn!("Database connection already installed, not connecting again");
                return;
            }

            let mut status = handle.subscribe();
            let closed = async move {
                let _ = status
                    .wait_for(|status| *status == ConnectionStatus::Closed)
                    .await;
            };
            let connecting = establish(&connector, policy, |attempt| {
                handle.publish(ConnectionStatus::Connecting { attempt });
            });

            let result = tokio::select! {
                biased;
                () = closed => {
                    debug!("Database handle closed, abandoning connection attempts");
                    return;
                }
                result = connecting => result,
            };

            match result {
                Ok(conn) => handle.install(conn).await,
                Err(e) => {
                    let attempts = policy.attempts();
                    error!(?e, attempts, "Database unavailable, no further attempts will be made");
                    handle.publish(ConnectionStatus::Exhausted { attempts });
                }
            }
        })
    }

    /// Publishes progress of the startup task.
    ///
    /// `Connected` and `Closed` are final for the startup task: only
    /// [`DbHandle::close`] moves a connected handle on.
    fn publish(&self, next: ConnectionStatus) {
        self.inner.status.send_if_modified(|current| {
            if matches!(current, ConnectionStatus::Connected | ConnectionStatus::Closed) {
                return false;
            }
            *current = next;
            true
        });
    }

    /// Installs a freshly opened connection.
    ///
    /// A second install is refused, and so is an install on a closed handle;
    /// in both cases the new connection is closed right away.
    async fn install(&self, conn: PgConnection) {
        let mut slot = self.inner.conn.lock().await;
        let refused = if slot.is_some() {
            Some("Database connection already installed, closing the new one")
        } else if self.status() == ConnectionStatus::Closed {
            Some("Database handle closed, closing the new connection")
        } else {
            None
        };

        if let Some(reason) = refused {
            drop(slot);
            warn!("{reason}");
            if let Err(e) = conn.close().await {
                warn!(?e, "Error while closing refused database connection");
            }
            return;
        }

        *slot = Some(conn);
        self.inner.status.send_replace(ConnectionStatus::Connected);
        drop(slot);

        info!("Database connection installed");
    }

    /// Asks the database for its current time.
    ///
    /// # Errors
    ///
    /// - [`AppError::DatabaseUnavailable`] when no connection is installed
    /// - [`AppError::QueryTimeout`] when the query exceeds the configured bound
    /// - [`AppError::Db`] when the query itself fails
    #[instrument(skip_all)]
    pub async fn now(&self) -> AppResult<DbNow> {
        let query = async {
            let mut slot = self.inner.conn.lock().await;
            let Some(conn) = slot.as_mut() else {
                return Err(AppError::DatabaseUnavailable);
            };

            let row = sqlx::query_as::<_, DbNow>(CONNECTIVITY_QUERY)
                .fetch_one(conn)
                .await?;
            Ok::<_, AppError>(row)
        };

        match tokio::time::timeout(self.inner.query_timeout, query).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.inner.query_timeout.as_secs_f64(), "Connectivity query timed out");
                Err(AppError::QueryTimeout)
            }
        }
    }

    /// Closes the connection, if any. Called once the server has stopped.
    pub async fn close(&self) {
        // Status changes under the lock so `install` cannot slip in between.
        let conn = {
            let mut slot = self.inner.conn.lock().await;
            self.inner.status.send_replace(ConnectionStatus::Closed);
            slot.take()
        };

        let Some(conn) = conn else {
            debug!("No database connection to close");
            return;
        };

        match conn.close().await {
            Ok(()) => info!("Database connection closed"),
            Err(e) => warn!(?e, "Error while closing database connection"),
        }
    }
}
