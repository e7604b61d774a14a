//! # Node Runtime Library
//!
//! Configuration loading and logging setup for the `node-runtime` binary,
//! exposed as a library for testing.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod telemetry;

pub use config::{load_config, load_config_from, ConfigError, NodeConfig, TransportMode};
pub use telemetry::init_tracing;
