//! # SL-03: Transaction Gateway
//!
//! Client side of the ledger's Gateway service. Distinguishes the two kinds
//! of contract call:
//!
//! - **submit**: endorsed, ordered into a block, and awaited until its
//!   validation code is known
//! - **evaluate**: executed on one peer, never ordered, possibly stale
//!
//! ## Architecture
//!
//! - **Proto**: hand-declared wire messages (`common`, `msp`, `peer`, `gateway`)
//! - **Proposal / Envelope**: building, signing input and decoding
//! - **Session**: `GatewaySession` → `Ledger` → `Contract`
//! - **Ports**: `LedgerTransport` (outbound)
//! - **Adapters**: gRPC over `ChannelSession`, `InMemoryLedger`

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod envelope;
pub mod hash;
pub mod ports;
pub mod proposal;
pub mod proto;
pub mod session;

pub use adapters::memory::{ChaincodeLogic, InMemoryLedger, Invocation, WorldState};
pub use domain::errors::{GatewayError, TransportError};
pub use domain::options::CallOptions;
pub use hash::{HashAlgorithm, UnknownHashAlgorithm};
pub use ports::outbound::LedgerTransport;
pub use proposal::{decode_proposal, serialize_identity, DecodedProposal};
pub use session::{open_session, Contract, GatewaySession, Ledger, SubmittedTransaction};
