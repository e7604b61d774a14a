//! Outbound Ports (Driven Ports / SPI)
//!
//! The four Gateway service RPCs a session needs from the ledger.

use crate::domain::errors::TransportError;
use crate::proto::gateway::{
    CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
    SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use async_trait::async_trait;

/// Ledger peer gateway service.
///
/// Implemented over a TLS [`ChannelSession`](sl_02_secure_channel::ChannelSession)
/// for real peers and by [`InMemoryLedger`](crate::adapters::memory::InMemoryLedger)
/// for tests.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Execute a proposal on one peer without ordering it.
    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, TransportError>;

    /// Collect endorsements and return the prepared transaction envelope.
    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse, TransportError>;

    /// Send a signed envelope to the ordering service.
    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError>;

    /// Wait for the validation result of a submitted transaction.
    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse, TransportError>;
}
