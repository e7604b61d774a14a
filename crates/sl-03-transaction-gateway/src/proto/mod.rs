//! # Ledger Wire Messages
//!
//! Hand-declared subset of the Fabric protobuf schema needed by a gateway
//! client. Field tags match the upstream `.proto` definitions so the
//! encoded bytes are interchangeable with code generated from them.

pub mod common;
pub mod gateway;
pub mod msp;
pub mod peer;
