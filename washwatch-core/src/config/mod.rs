//! Configuration types
//!
//! Device configuration is written in TOML and parsed at boot. A default
//! `device.toml` is compiled into the crate.

pub mod loader;
pub mod types;

pub use loader::{parse_config, ConfigError, EMBEDDED_CONFIG};
pub use types::*;
