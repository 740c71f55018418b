//! # Utility Modules
//!
//! - **Constants** (`constant`) - Defaults and fixed values
//! - **Secrets** (`secret`) - Reading secrets from env vars or mounted files

pub mod constant;
pub mod secret;
