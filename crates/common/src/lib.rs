//! Trackcut Common Utilities
//!
//! Shared infrastructure for all Trackcut crates:
//! - Error types and result aliases
//! - Debounce timing for the auto-preview path
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod debounce;
pub mod error;
pub mod logging;

pub use config::*;
pub use debounce::*;
pub use error::*;
