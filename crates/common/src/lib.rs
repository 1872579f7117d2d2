//! motiontrace Common Utilities
//!
//! Shared infrastructure for all motiontrace crates:
//! - Error types and result aliases
//! - Frame clock: frame index to video-time conversion
//! - Tracing/logging initialization
//! - Configuration loading (thresholds, overlay style, logging)

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
