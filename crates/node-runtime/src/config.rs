//! # Node Configuration
//!
//! Defaults match the lab network (`mainchannel`, `org1MSP`, peer at
//! `localhost:7051`, HTTP on port 3000). Any value can be overridden with a
//! `SOLLYTCH_`-prefixed environment variable:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SOLLYTCH_MSP_ID` | client organization |
//! | `SOLLYTCH_CHANNEL` | ledger (channel) name |
//! | `SOLLYTCH_CHAIN_CONTRACT`, `SOLLYTCH_IMAGE_CONTRACT` | contract names |
//! | `SOLLYTCH_CERT_DIR`, `SOLLYTCH_KEY_DIR` | MSP `signcerts/`, `keystore/` |
//! | `SOLLYTCH_CREDENTIAL_SELECTION` | `first` or `single` |
//! | `SOLLYTCH_PEER_ENDPOINT`, `SOLLYTCH_PEER_HOST_ALIAS` | peer address and TLS name |
//! | `SOLLYTCH_TLS_ROOT_CERT` | peer CA certificate (PEM) |
//! | `SOLLYTCH_HASH` | `SHA256`, `SHA384`, `SHA3_256`, `SHA3_384` |
//! | `SOLLYTCH_EVALUATE_TIMEOUT_MS`, `SOLLYTCH_ENDORSE_TIMEOUT_MS`, `SOLLYTCH_SUBMIT_TIMEOUT_MS`, `SOLLYTCH_COMMIT_STATUS_TIMEOUT_MS` | call deadlines |
//! | `SOLLYTCH_LISTEN_ADDR` / `SOLLYTCH_PORT` | HTTP listener |
//! | `SOLLYTCH_BODY_LIMIT` | request body limit in bytes |
//! | `SOLLYTCH_TRANSPORT` | `peer` or `memory` |
//! | `SOLLYTCH_LOG_LEVEL`, `SOLLYTCH_LOG_JSON` | logging |

use sl_01_identity_store::CredentialSelection;
use sl_03_transaction_gateway::HashAlgorithm;
use sl_08_lab_ledger::LedgerProfile;
use sl_09_http_facade::FacadeConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

/// Where ledger calls go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportMode {
    /// The configured peer over TLS.
    #[default]
    Peer,
    /// Simulated contracts in this process; nothing is persisted.
    Memory,
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "peer" | "grpc" => Ok(Self::Peer),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(format!("unknown transport {other}")),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub ledger: LedgerProfile,
    pub facade: FacadeConfig,
    pub transport: TransportMode,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerProfile::default(),
            facade: FacadeConfig::default(),
            transport: TransportMode::default(),
            log_level: "info".into(),
            log_json: false,
        }
    }
}

impl NodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ledger.validate().map_err(ConfigError::Invalid)?;
        self.facade.validate().map_err(ConfigError::Invalid)
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{variable}={value} is invalid: {reason}")]
    BadValue {
        variable: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, ConfigError> {
    load_config_from(|name| std::env::var(name).ok())
}

/// Load configuration from `lookup`, applied over the defaults.
pub fn load_config_from<F>(lookup: F) -> Result<NodeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = NodeConfig::default();
    let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    let ledger = &mut config.ledger;
    if let Some(value) = var("SOLLYTCH_MSP_ID") {
        ledger.msp_id = value;
    }
    if let Some(value) = var("SOLLYTCH_CHANNEL") {
        ledger.channel_name = value;
    }
    if let Some(value) = var("SOLLYTCH_CHAIN_CONTRACT") {
        ledger.chain_contract = value;
    }
    if let Some(value) = var("SOLLYTCH_IMAGE_CONTRACT") {
        ledger.image_contract = value;
    }
    if let Some(value) = var("SOLLYTCH_CERT_DIR") {
        ledger.cert_dir = value.into();
    }
    if let Some(value) = var("SOLLYTCH_KEY_DIR") {
        ledger.key_dir = value.into();
    }
    if let Some(value) = var("SOLLYTCH_CREDENTIAL_SELECTION") {
        ledger.credential_selection = CredentialSelection::parse(&value).ok_or_else(|| ConfigError::BadValue {
            variable: "SOLLYTCH_CREDENTIAL_SELECTION",
            value: value.clone(),
            reason: "expected first or single".into(),
        })?;
    }
    if let Some(value) = var("SOLLYTCH_PEER_ENDPOINT") {
        ledger.peer.endpoint = value;
    }
    if let Some(value) = var("SOLLYTCH_PEER_HOST_ALIAS") {
        ledger.peer.peer_host_alias = value;
    }
    if let Some(value) = var("SOLLYTCH_TLS_ROOT_CERT") {
        ledger.peer.tls_root_cert_path = value.into();
    }
    if let Some(value) = var("SOLLYTCH_HASH") {
        ledger.hash_algorithm = parse::<HashAlgorithm>("SOLLYTCH_HASH", &value)?;
    }

    let options = &mut ledger.call_options;
    for (variable, slot) in [
        ("SOLLYTCH_EVALUATE_TIMEOUT_MS", &mut options.evaluate_timeout_ms),
        ("SOLLYTCH_ENDORSE_TIMEOUT_MS", &mut options.endorse_timeout_ms),
        ("SOLLYTCH_SUBMIT_TIMEOUT_MS", &mut options.submit_timeout_ms),
        ("SOLLYTCH_COMMIT_STATUS_TIMEOUT_MS", &mut options.commit_status_timeout_ms),
    ] {
        if let Some(value) = var(variable) {
            *slot = parse::<u64>(variable, &value)?;
        }
    }

    if let Some(value) = var("SOLLYTCH_LISTEN_ADDR") {
        config.facade.listen_addr = parse::<SocketAddr>("SOLLYTCH_LISTEN_ADDR", &value)?;
    }
    if let Some(value) = var("SOLLYTCH_PORT") {
        config.facade.listen_addr.set_port(parse::<u16>("SOLLYTCH_PORT", &value)?);
    }
    if let Some(value) = var("SOLLYTCH_BODY_LIMIT") {
        config.facade.body_limit_bytes = parse::<usize>("SOLLYTCH_BODY_LIMIT", &value)?;
    }
    if let Some(value) = var("SOLLYTCH_TRANSPORT") {
        config.transport = parse::<TransportMode>("SOLLYTCH_TRANSPORT", &value)?;
    }
    if let Some(value) = var("SOLLYTCH_LOG_LEVEL") {
        config.log_level = value;
    }
    if let Some(value) = var("SOLLYTCH_LOG_JSON") {
        config.log_json = matches!(value.trim(), "1" | "true" | "yes");
    }

    config.validate()?;
    Ok(config)
}

fn parse<T>(variable: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::BadValue {
        variable,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<NodeConfig, ConfigError> {
        let env: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        load_config_from(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert_eq!(config.ledger.channel_name, "mainchannel");
        assert_eq!(config.facade.listen_addr.port(), 3000);
        assert_eq!(config.transport, TransportMode::Peer);
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SOLLYTCH_CHANNEL", "labchannel"),
            ("SOLLYTCH_PEER_ENDPOINT", "10.0.0.5:7051"),
            ("SOLLYTCH_PORT", "8080"),
            ("SOLLYTCH_HASH", "sha3-256"),
            ("SOLLYTCH_TRANSPORT", "memory"),
            ("SOLLYTCH_CREDENTIAL_SELECTION", "single"),
            ("SOLLYTCH_SUBMIT_TIMEOUT_MS", "9000"),
            ("SOLLYTCH_LOG_JSON", "1"),
        ])
        .unwrap();
        assert_eq!(config.ledger.channel_name, "labchannel");
        assert_eq!(config.ledger.peer.endpoint, "10.0.0.5:7051");
        assert_eq!(config.facade.listen_addr.port(), 8080);
        assert_eq!(config.ledger.hash_algorithm, HashAlgorithm::Sha3_256);
        assert_eq!(config.transport, TransportMode::Memory);
        assert_eq!(config.ledger.credential_selection, CredentialSelection::RequireSingle);
        assert_eq!(config.ledger.call_options.submit_timeout_ms, 9000);
        assert!(config.log_json);
    }

    #[test]
    fn test_bad_port_names_variable() {
        let err = load(&[("SOLLYTCH_PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::BadValue { variable: "SOLLYTCH_PORT", .. }));
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let err = load(&[("SOLLYTCH_EVALUATE_TIMEOUT_MS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = load(&[("SOLLYTCH_MSP_ID", "  ")]).unwrap();
        assert_eq!(config.ledger.msp_id, "org1MSP");
    }
}
