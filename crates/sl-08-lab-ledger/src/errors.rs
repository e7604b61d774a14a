//! Lab ledger error types.

use sl_01_identity_store::IdentityError;
use sl_02_secure_channel::ChannelError;
use sl_03_transaction_gateway::GatewayError;
use sl_04_response_codec::DecodeError;
use sl_05_record_encoder::EncodeError;
use sl_06_content_addressing::AddressingError;
use sl_07_partial_update::PatchError;
use thiserror::Error;

/// Errors surfaced by lab ledger operations.
#[derive(Debug, Error)]
pub enum LabError {
    #[error("Invalid ledger profile: {0}")]
    Config(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Addressing(#[from] AddressingError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A test record has no resolvable identifier.
    #[error("TestID missing in item {index}")]
    MissingTestId { index: usize },

    /// The record to edit does not exist.
    #[error("Test {test_id} not found")]
    TestNotFound { test_id: String },
}

impl LabError {
    /// Whether the caller's input caused the failure (as opposed to the
    /// ledger, the network or local credentials).
    pub fn is_caller_error(&self) -> bool {
        match self {
            Self::MissingTestId { .. } | Self::Encode(_) | Self::Patch(_) => true,
            Self::Addressing(err) => !matches!(err, AddressingError::Io { .. }),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TestNotFound { .. })
    }
}
