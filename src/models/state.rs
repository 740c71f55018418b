use tracing::info;

use crate::db::DbHandle;

/// Application state shared across requests. Needs to be thread-safe.
pub struct AppState {
    /// Handle to the single database connection, possibly still empty.
    pub db: DbHandle,
}

impl AppState {
    /// Creates a new application state around the database handle.
    pub fn new(db: DbHandle) -> Self {
        info!(db_status = ?db.status(), "Initializing application state");
        Self { db }
    }
}
