//! OCI MCP Core - Foundational Types
//!
//! This crate provides the error taxonomy, configuration and logging setup
//! shared by the registry client and the tool server.

pub mod config;
pub mod error;
pub mod log;

// Re-export commonly used types
pub use config::{ClientOptions, ServerConfig, Transport};
pub use error::{OciError, Result};
pub use log::{LogConfig, LogFormat};

/// OCI MCP version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
