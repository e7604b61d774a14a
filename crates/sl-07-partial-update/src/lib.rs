//! # SL-07: Partial Update Engine
//!
//! Edits one field of a previously committed record before it is
//! resubmitted with `UpdateTest`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod coerce;
pub mod errors;
pub mod patch;

pub use coerce::coerce_value;
pub use errors::PatchError;
pub use patch::apply_field_update;
