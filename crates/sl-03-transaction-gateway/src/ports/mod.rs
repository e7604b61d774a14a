//! Ports for the Transaction Gateway.

pub mod outbound;

pub use outbound::LedgerTransport;
