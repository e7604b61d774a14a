//! Domain module for the Transaction Gateway.

pub mod errors;
pub mod options;

pub use errors::*;
pub use options::*;
