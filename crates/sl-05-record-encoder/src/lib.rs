//! # SL-05: Record Encoder
//!
//! Fixed-schema feature vectors for the prediction models that run inside
//! the test contract. A vector is always 21 comma-separated values in
//! [`FEATURE_ORDER`].

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod encoder;
pub mod errors;
pub mod schema;

pub use encoder::{encode_features, encode_object, FeatureVector};
pub use errors::EncodeError;
pub use schema::{FEATURE_COUNT, FEATURE_ORDER};
