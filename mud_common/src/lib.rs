//! Small utilities shared between the `mud_server` binary and its tests:
//! logging setup and layered TOML configuration.

#[macro_use]
extern crate log;

pub mod config;
pub mod logging;

pub use config::ConfigError;
