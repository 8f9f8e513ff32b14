//! Utility functions shared by the library and the CLI.
//!
//! - [`config`] - Application configuration in the platform data directory
//! - [`paths`] - Working-directory path resolution
//! - [`progress`] - Build spinner (no-op without the `progress` feature)

pub mod config;
pub mod paths;
pub mod progress;

pub use config::*;
pub use paths::*;
