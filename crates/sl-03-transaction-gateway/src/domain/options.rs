//! Per-call deadlines.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deadlines applied to each gateway RPC, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    pub evaluate_timeout_ms: u64,
    pub endorse_timeout_ms: u64,
    pub submit_timeout_ms: u64,
    /// Waiting for commit spans a block cut, so this is the longest.
    pub commit_status_timeout_ms: u64,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            evaluate_timeout_ms: 5_000,
            endorse_timeout_ms: 15_000,
            submit_timeout_ms: 5_000,
            commit_status_timeout_ms: 60_000,
        }
    }
}

impl CallOptions {
    pub fn evaluate_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluate_timeout_ms)
    }

    pub fn endorse_timeout(&self) -> Duration {
        Duration::from_millis(self.endorse_timeout_ms)
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.submit_timeout_ms)
    }

    pub fn commit_status_timeout(&self) -> Duration {
        Duration::from_millis(self.commit_status_timeout_ms)
    }

    /// Reject zero deadlines, which would fail every call.
    pub fn validate(&self) -> Result<(), String> {
        let deadlines = [
            ("evaluate_timeout_ms", self.evaluate_timeout_ms),
            ("endorse_timeout_ms", self.endorse_timeout_ms),
            ("submit_timeout_ms", self.submit_timeout_ms),
            ("commit_status_timeout_ms", self.commit_status_timeout_ms),
        ];
        for (name, value) in deadlines {
            if value == 0 {
                return Err(format!("{name} must be greater than zero"));
            }
        }
        Ok(())
    }
}
