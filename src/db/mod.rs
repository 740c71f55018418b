//! # Database Connection
//!
//! - [`Connector`] / [`PgConnector`] - open one connection
//! - [`establish`] / [`RetryPolicy`] - bounded fixed-delay retry around a connector
//! - [`DbHandle`] - owner of the single connection, with an observable status

mod connector;
mod handle;
mod retry;

pub use connector::{Connector, PgConnector};
pub use handle::{ConnectionStatus, DbHandle};
pub use retry::{ConnectError, RetryPolicy, establish};
