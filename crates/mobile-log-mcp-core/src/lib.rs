//! # mobile-log-mcp-core
//!
//! Core types for the Mobile Log MCP Server.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other mobile-log-mcp crates. It provides:
//!
//! - Platform types (Android / iOS)
//! - Device classification (simulator vs. physical device)
//! - Error types
//! - Server configuration
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other mobile-log-mcp crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod device;
pub mod error;
pub mod platform;

// Re-export commonly used types
pub use config::{CaptureSettings, ResolverSettings, ServerConfig, ServerSettings};
pub use device::{DeviceClass, DeviceClassifier, HeuristicClassifier};
pub use error::{Error, Result};
pub use platform::Platform;
