//! Connection profile for the lab ledger network.

use serde::{Deserialize, Serialize};
use sl_01_identity_store::CredentialSelection;
use sl_02_secure_channel::ChannelConfig;
use sl_03_transaction_gateway::{CallOptions, HashAlgorithm};
use std::path::PathBuf;

const USER_MSP: &str = "fabric/organizations/peerOrganizations/org1.example.com/users/User1@org1.example.com/msp";

/// Everything needed to reach the network and address its contracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerProfile {
    /// Organization the client identity belongs to
    pub msp_id: String,
    /// Ledger (channel) both contracts are deployed on
    pub channel_name: String,
    /// Contract holding tests, models and spreadsheets
    pub chain_contract: String,
    /// Contract holding image digests
    pub image_contract: String,
    /// MSP `signcerts/` directory
    pub cert_dir: PathBuf,
    /// MSP `keystore/` directory
    pub key_dir: PathBuf,
    pub credential_selection: CredentialSelection,
    pub peer: ChannelConfig,
    pub hash_algorithm: HashAlgorithm,
    pub call_options: CallOptions,
}

impl Default for LedgerProfile {
    fn default() -> Self {
        Self {
            msp_id: "org1MSP".into(),
            channel_name: "mainchannel".into(),
            chain_contract: "sollytch-chain".into(),
            image_contract: "sollytch-image".into(),
            cert_dir: PathBuf::from(USER_MSP).join("signcerts"),
            key_dir: PathBuf::from(USER_MSP).join("keystore"),
            credential_selection: CredentialSelection::default(),
            peer: ChannelConfig::default(),
            hash_algorithm: HashAlgorithm::default(),
            call_options: CallOptions::default(),
        }
    }
}

impl LedgerProfile {
    /// Check the profile before the first connection attempt.
    pub fn validate(&self) -> Result<(), String> {
        let names = [
            ("msp_id", &self.msp_id),
            ("channel_name", &self.channel_name),
            ("chain_contract", &self.chain_contract),
            ("image_contract", &self.image_contract),
            ("peer.endpoint", &self.peer.endpoint),
            ("peer.peer_host_alias", &self.peer.peer_host_alias),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        if self.peer.connect_timeout_ms == 0 {
            return Err("peer.connect_timeout_ms must be greater than zero".into());
        }
        self.call_options.validate()
    }
}
