//! # HTTP Request Handlers
//!
//! ## Available Handlers
//!
//! - **Liveness** (`liveness`) - Static "API is running" answer
//! - **Database Connectivity** (`database_connectivity`) - Current time from the database
//! - **Readiness** (`readiness`) - State of the startup connection task

mod database_connectivity;
mod liveness;
mod readiness;

pub use database_connectivity::*;
pub use liveness::*;
pub use readiness::*;
