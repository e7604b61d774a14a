//! # SL-01: Identity Store
//!
//! Resolves the client's signing credential from a local MSP layout:
//!
//! ```text
//! users/User1@org1.example.com/msp/
//! ├── signcerts/   → Identity (certificate bytes + MSP id)
//! └── keystore/    → Signer   (P-256 private key)
//! ```
//!
//! Nothing is cached. Each gateway session reloads both files.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod errors;
pub mod identity;
pub mod selection;
pub mod signer;

pub use errors::IdentityError;
pub use identity::{load_identity, Identity};
pub use selection::{select_entry, CredentialSelection};
pub use signer::{load_signer, Signer};
