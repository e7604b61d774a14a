//! # Sollytch Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── gateway_flows.rs   # session → in-process network → codec
//! │   ├── lab_flows.rs       # connector scopes, MSP credentials, record lifecycle
//! │   └── facade_flows.rs    # HTTP routes and library calls over one network
//! └── benches/
//!     └── codec_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sl-tests
//! cargo test -p sl-tests integration::lab_flows
//! cargo bench -p sl-tests
//! ```

pub mod integration;
