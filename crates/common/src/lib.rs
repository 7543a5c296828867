//! Heatfield Common Utilities
//!
//! Shared infrastructure for all Heatfield crates:
//! - Error types and result aliases
//! - Tracing/logging initialization
//! - Application configuration loading

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
