//! # SL-06: Content Addressing
//!
//! Ledger keys for binary artifacts. Images and spreadsheets are
//! content-addressed by SHA-512; models are stored as base64 under a key
//! naming their purpose.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod digest;
pub mod errors;
pub mod model;

pub use digest::{digest, digest_file, ContentDigest, DIGEST_HEX_LEN};
pub use errors::AddressingError;
pub use model::{encode_model, model_from_base64, ModelArtifact, KNOWN_MODEL_KEYS};
