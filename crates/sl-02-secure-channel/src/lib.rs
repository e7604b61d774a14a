//! # SL-02: Secure Channel Manager
//!
//! Establishes the TLS-protected gRPC connection to a ledger peer.
//!
//! - One attempt per call, no built-in retry
//! - Certificate validation pinned to the peer host alias
//! - `close()` exactly once; use after close is a [`ChannelError::Closed`]

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod errors;

pub use channel::{open_channel, open_channel_from_config, ChannelSession, DEFAULT_CONNECT_TIMEOUT};
pub use config::ChannelConfig;
pub use errors::ChannelError;
