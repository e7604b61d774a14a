//! Adapters implementing [`LedgerTransport`](crate::ports::outbound::LedgerTransport).

pub mod grpc;
pub mod memory;

pub use memory::{ChaincodeLogic, InMemoryLedger, Invocation, WorldState};
