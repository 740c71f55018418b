mod db_time;
mod state;

pub use db_time::DbNow;
pub use state::AppState;
