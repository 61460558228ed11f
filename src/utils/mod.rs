//! Utility modules
//!
//! Common utilities used throughout the crate: error handling, logging setup
//! and input normalization helpers.

pub mod errors;
pub mod logging;
pub mod helpers;

pub use errors::{ErrorKind, Result, ValidationErrors, VoloConnectError};
