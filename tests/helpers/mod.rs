//! Test helpers module
//!
//! Database setup, per-backend service contexts and request builders.

#![allow(dead_code)]

pub mod database_helper;
pub mod test_context;
pub mod test_data;

pub use database_helper::*;
pub use test_context::*;
pub use test_data::*;
