//! # SL-04: Response Codec
//!
//! Turns raw response bytes from ledger reads into JSON values.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod codec;
pub mod errors;

pub use codec::{decode, decode_utf8, encode, hash_data};
pub use errors::DecodeError;
