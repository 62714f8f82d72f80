//! # Common Components
//!
//! Shared utilities used by the library and every binary.
//!
//! ## Modules
//!
//! - [`config`]: TOML configuration with environment overrides
//! - [`error`]: typed error enums for the enclave, inference and metrics layers
//! - [`logging`]: `env_logger` setup with the house log format

pub mod config;
pub mod error;
pub mod logging;
