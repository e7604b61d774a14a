//! HTTP facade configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Largest accepted request body (images and models travel base64-encoded).
pub const DEFAULT_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    pub listen_addr: SocketAddr,
    pub body_limit_bytes: usize,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl FacadeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.body_limit_bytes == 0 {
            return Err("body_limit_bytes must be greater than zero".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FacadeConfig::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.body_limit_bytes, 52_428_800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = FacadeConfig {
            body_limit_bytes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
