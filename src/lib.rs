//! VoloConnect core
//!
//! Event lifecycle and volunteer participation for the VoloConnect
//! coordination platform. Organizers publish events, volunteers sign up,
//! organizers decide on signups, track hours and feedback, and answer
//! questions posted on event pages. Capacity accounting and ownership checks
//! are enforced here; HTTP routing and rendering live in the caller.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ErrorKind, Result, VoloConnectError};

// Re-export main components for easy access
pub use database::{DatabaseService, MemoryStore};
pub use services::{EventRegistry, QueryService, ServiceFactory, StatsAggregator, VolunteerLedger};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
