//! # Integration Flows
//!
//! Cross-crate scenarios run against the simulated lab network.

pub mod facade_flows;
pub mod gateway_flows;
pub mod lab_flows;
