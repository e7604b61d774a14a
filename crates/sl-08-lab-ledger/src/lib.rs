//! # SL-08: Lab Ledger
//!
//! Application operations of the lab network: tests, images, spreadsheets
//! and model artifacts stored through the `sollytch-chain` and
//! `sollytch-image` contracts.
//!
//! ## Architecture
//!
//! - **Profile**: `LedgerProfile` (MSP, channel, contracts, peer, deadlines)
//! - **Connector**: `LedgerConnector::with_ledger` opens one scoped session
//!   per operation and always closes it
//! - **Operations**: `LabLedger` (encode, address, submit, evaluate, decode)
//! - **Simulation**: both contracts hosted on an in-process ledger

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod connector;
pub mod errors;
pub mod ledger;
pub mod simulated;

pub use config::LedgerProfile;
pub use connector::{CredentialSource, LedgerConnector, TransportSource};
pub use errors::LabError;
pub use ledger::{resolve_test_id, LabLedger, StoredTest, TEST_ID_FIELDS};
pub use simulated::{simulated_network, SollytchChainContract, SollytchImageContract};
