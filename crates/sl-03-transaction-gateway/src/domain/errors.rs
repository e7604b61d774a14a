//! Error types for the Transaction Gateway.

use sl_01_identity_store::IdentityError;
use sl_02_secure_channel::ChannelError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by gateway sessions, ledgers and contracts.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The underlying channel is closed or failed.
    #[error("Connection error: {0}")]
    Connection(#[from] ChannelError),

    /// The gateway session was closed.
    #[error("Gateway session is closed")]
    SessionClosed,

    /// The ledger rejected the transaction or its evaluation.
    #[error("Transaction {transaction_id} ({function}) failed: {diagnostic}")]
    Transaction {
        function: String,
        transaction_id: String,
        /// Diagnostic reported by the ledger
        diagnostic: String,
    },

    /// The peer could not be reached for this call.
    #[error("Ledger unavailable during {function}: {diagnostic}")]
    Unavailable { function: String, diagnostic: String },

    /// A per-call deadline expired.
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Signing a message failed.
    #[error("Signing failed: {0}")]
    Signing(#[from] IdentityError),

    /// A ledger reply could not be decoded.
    #[error("Malformed ledger reply: {0}")]
    Protocol(String),
}

impl GatewayError {
    /// Whether the same call may succeed if issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Unavailable { .. })
    }

    /// Whether this is a connection-kind failure (channel or session).
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::SessionClosed)
    }
}

/// Failure reported by a [`LedgerTransport`](crate::ports::outbound::LedgerTransport).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The channel the transport runs over is unusable.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// The peer could not be reached.
    #[error("Peer unavailable: {0}")]
    Unavailable(String),

    /// The peer answered with an error status.
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    /// Bytes on the wire did not decode.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl TransportError {
    pub(crate) fn into_gateway(self, function: &str, transaction_id: &str) -> GatewayError {
        match self {
            Self::Channel(err) => GatewayError::Connection(err),
            Self::Unavailable(diagnostic) => GatewayError::Unavailable {
                function: function.to_string(),
                diagnostic,
            },
            Self::Rejected { message, .. } => GatewayError::Transaction {
                function: function.to_string(),
                transaction_id: transaction_id.to_string(),
                diagnostic: message,
            },
            Self::Protocol(reason) => GatewayError::Protocol(reason),
        }
    }
}

impl From<prost::DecodeError> for TransportError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Protocol(err.to_string())
    }
}
