//! # NetReach Core
//!
//! Shared foundation for the NetReach workspace: the error taxonomy,
//! the configuration system, and the action-kind vocabulary every other
//! crate speaks.

pub mod config;
pub mod error;

pub use config::NetreachConfig;
pub use error::{ActionKind, NetreachError, Result};
