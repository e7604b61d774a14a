//! Peer connection configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Where and how to reach the ledger peer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChannelConfig {
    /// Address dialled (`host:port` or a full `https://` URI)
    pub endpoint: String,
    /// Name the peer's TLS certificate must be valid for
    pub peer_host_alias: String,
    /// PEM file of the CA that issued the peer's TLS certificate
    pub tls_root_cert_path: PathBuf,
    /// Connection establishment deadline in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            endpoint: "localhost:7051".into(),
            peer_host_alias: "peer0.org1.example.com".into(),
            tls_root_cert_path: PathBuf::from(
                "fabric/organizations/peerOrganizations/org1.example.com/peers/peer0.org1.example.com/tls/ca.crt",
            ),
            connect_timeout_ms: 10_000,
        }
    }
}

impl ChannelConfig {
    /// Connect deadline as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// URI actually dialled: bare `host:port` endpoints get an `https` scheme.
    pub fn uri(&self) -> String {
        endpoint_uri(&self.endpoint)
    }
}

pub(crate) fn endpoint_uri(endpoint: &str) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChannelConfig::default();
        assert_eq!(config.endpoint, "localhost:7051");
        assert_eq!(config.peer_host_alias, "peer0.org1.example.com");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_uri_adds_scheme() {
        let config = ChannelConfig::default();
        assert_eq!(config.uri(), "https://localhost:7051");
        assert_eq!(endpoint_uri("https://peer:443"), "https://peer:443");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ChannelConfig =
            serde_json::from_str(r#"{"endpoint":"10.0.0.5:7051"}"#).unwrap();
        assert_eq!(config.endpoint, "10.0.0.5:7051");
        assert_eq!(config.connect_timeout_ms, 10_000);
    }
}
