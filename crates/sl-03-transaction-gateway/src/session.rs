//! # Gateway Session
//!
//! Binds an identity, its signer and one open transport. Ledgers and
//! contracts are borrowed views over the session; nothing is resolved
//! remotely until a call is made.
//!
//! ## Submit vs Evaluate
//!
//! ```text
//! submit:   Endorse ──→ sign envelope ──→ Submit ──→ CommitStatus (blocks)
//! evaluate: Evaluate (single peer, not ordered, may be stale)
//! ```
//!
//! The session borrows its transport, so it cannot outlive the channel it
//! was opened over.

use crate::domain::errors::{GatewayError, TransportError};
use crate::domain::options::CallOptions;
use crate::envelope::endorsed_result;
use crate::hash::HashAlgorithm;
use crate::ports::outbound::LedgerTransport;
use crate::proposal::{build_proposal, serialize_identity, ProposedTransaction};
use crate::proto::gateway::{
    CommitStatusRequest, EndorseRequest, EvaluateRequest, SignedCommitStatusRequest, SubmitRequest,
};
use crate::proto::peer::{SignedProposal, TxValidationCode, ERROR_THRESHOLD};
use prost::Message;
use sl_01_identity_store::{Identity, Signer};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Outcome of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTransaction {
    pub transaction_id: String,
    pub block_number: u64,
    /// Chaincode response payload from endorsement
    pub result: Vec<u8>,
}

/// A client connection to the gateway over a borrowed transport.
pub struct GatewaySession<'c> {
    identity: Identity,
    signer: Signer,
    creator: Vec<u8>,
    transport: &'c dyn LedgerTransport,
    hash: HashAlgorithm,
    options: CallOptions,
    closed: AtomicBool,
    submit_gate: tokio::sync::Mutex<()>,
}

/// Bind `identity` and `signer` to an open transport. Never fails.
pub fn open_session<'c>(
    identity: Identity,
    signer: Signer,
    transport: &'c dyn LedgerTransport,
    hash: HashAlgorithm,
) -> GatewaySession<'c> {
    let creator = serialize_identity(&identity);
    debug!(msp_id = identity.msp_id(), hash = %hash, "Gateway session opened");

    GatewaySession {
        identity,
        signer,
        creator,
        transport,
        hash,
        options: CallOptions::default(),
        closed: AtomicBool::new(false),
        submit_gate: tokio::sync::Mutex::new(()),
    }
}

impl<'c> GatewaySession<'c> {
    /// Replace the default per-call deadlines.
    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn options(&self) -> &CallOptions {
        &self.options
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Named ledger (channel). No network traffic.
    pub fn ledger(&self, name: &str) -> Ledger<'_> {
        Ledger {
            session: self,
            name: name.to_string(),
        }
    }

    /// Mark the session closed. A second call fails with `SessionClosed`.
    pub fn close(&self) -> Result<(), GatewayError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(GatewayError::SessionClosed);
        }
        info!(msp_id = self.identity.msp_id(), "Gateway session closed");
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), GatewayError> {
        if self.is_closed() {
            Err(GatewayError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, GatewayError> {
        Ok(self.signer.sign(&self.hash.digest(message))?)
    }

    fn signed_proposal(&self, proposed: &ProposedTransaction) -> Result<SignedProposal, GatewayError> {
        Ok(SignedProposal {
            proposal_bytes: proposed.proposal_bytes.clone(),
            signature: self.sign(&proposed.proposal_bytes)?,
        })
    }

    async fn evaluate(
        &self,
        channel_id: &str,
        chaincode: &str,
        function: &str,
        args: &[&str],
    ) -> Result<Vec<u8>, GatewayError> {
        self.ensure_open()?;

        let proposed = build_proposal(&self.creator, channel_id, chaincode, function, args);
        let tx_id = proposed.transaction_id.clone();
        let request = EvaluateRequest {
            transaction_id: tx_id.clone(),
            channel_id: channel_id.to_string(),
            proposed_transaction: Some(self.signed_proposal(&proposed)?),
            target_organizations: Vec::new(),
        };

        debug!(tx_id = %tx_id, chaincode, function, "Evaluating transaction");
        let response = deadline("evaluate", self.options.evaluate_timeout(), async {
            self.transport
                .evaluate(request)
                .await
                .map_err(|e| e.into_gateway(function, &tx_id))
        })
        .await?;

        let result = response
            .result
            .ok_or_else(|| GatewayError::Protocol("evaluate response carries no result".into()))?;

        if result.status >= ERROR_THRESHOLD {
            warn!(tx_id = %tx_id, function, status = result.status, "Evaluation rejected");
            return Err(GatewayError::Transaction {
                function: function.to_string(),
                transaction_id: tx_id,
                diagnostic: format!("chaincode response {}, {}", result.status, result.message),
            });
        }

        Ok(result.payload)
    }

    async fn submit(
        &self,
        channel_id: &str,
        chaincode: &str,
        function: &str,
        args: &[&str],
    ) -> Result<SubmittedTransaction, GatewayError> {
        self.ensure_open()?;
        let _turn = self.submit_gate.lock().await;

        let proposed = build_proposal(&self.creator, channel_id, chaincode, function, args);
        let tx_id = proposed.transaction_id.clone();
        let gateway_error = |e: TransportError| e.into_gateway(function, &tx_id);

        debug!(tx_id = %tx_id, chaincode, function, "Endorsing transaction");
        let endorse = EndorseRequest {
            transaction_id: tx_id.clone(),
            channel_id: channel_id.to_string(),
            proposed_transaction: Some(self.signed_proposal(&proposed)?),
            endorsing_organizations: Vec::new(),
        };
        let endorsed = deadline("endorse", self.options.endorse_timeout(), async {
            self.transport.endorse(endorse).await.map_err(gateway_error)
        })
        .await?;

        let mut envelope = endorsed
            .prepared_transaction
            .ok_or_else(|| GatewayError::Protocol("endorse response carries no transaction".into()))?;
        let result = endorsed_result(&envelope).map_err(gateway_error)?;
        envelope.signature = self.sign(&envelope.payload)?;

        let submit = SubmitRequest {
            transaction_id: tx_id.clone(),
            channel_id: channel_id.to_string(),
            prepared_transaction: Some(envelope),
        };
        deadline("submit", self.options.submit_timeout(), async {
            self.transport.submit(submit).await.map_err(gateway_error)
        })
        .await?;

        let status_request = CommitStatusRequest {
            transaction_id: tx_id.clone(),
            channel_id: channel_id.to_string(),
            identity: self.creator.clone(),
        }
        .encode_to_vec();
        let signed_status = SignedCommitStatusRequest {
            signature: self.sign(&status_request)?,
            request: status_request,
        };
        let status = deadline("commit_status", self.options.commit_status_timeout(), async {
            self.transport
                .commit_status(signed_status)
                .await
                .map_err(gateway_error)
        })
        .await?;

        let code = TxValidationCode::try_from(status.result).unwrap_or(TxValidationCode::InvalidOtherReason);
        if code != TxValidationCode::Valid {
            warn!(tx_id = %tx_id, function, code = code.as_str_name(), "Transaction failed to commit");
            return Err(GatewayError::Transaction {
                function: function.to_string(),
                transaction_id: tx_id,
                diagnostic: format!(
                    "transaction failed to commit with status code {} ({})",
                    status.result,
                    code.as_str_name()
                ),
            });
        }

        info!(tx_id = %tx_id, chaincode, function, block = status.block_number, "Transaction committed");
        Ok(SubmittedTransaction {
            transaction_id: tx_id,
            block_number: status.block_number,
            result,
        })
    }
}

impl std::fmt::Debug for GatewaySession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySession")
            .field("msp_id", &self.identity.msp_id())
            .field("hash", &self.hash)
            .field("closed", &self.is_closed())
            .finish()
    }
}

async fn deadline<T, F>(operation: &'static str, limit: Duration, call: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(outcome) => outcome,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Gateway call timed out");
            Err(GatewayError::Timeout {
                operation,
                timeout: limit,
            })
        }
    }
}

/// A named ledger (channel) resolved through a session.
#[derive(Debug, Clone)]
pub struct Ledger<'a> {
    session: &'a GatewaySession<'a>,
    name: String,
}

impl<'a> Ledger<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Named contract on this ledger. No network traffic.
    pub fn contract(&self, name: &str) -> Contract<'a> {
        Contract {
            session: self.session,
            channel_id: self.name.clone(),
            chaincode: name.to_string(),
        }
    }
}

/// A smart contract on a ledger.
#[derive(Debug, Clone)]
pub struct Contract<'a> {
    session: &'a GatewaySession<'a>,
    channel_id: String,
    chaincode: String,
}

impl<'a> Contract<'a> {
    pub fn name(&self) -> &str {
        &self.chaincode
    }

    pub fn ledger_name(&self) -> &str {
        &self.channel_id
    }

    /// Order a state-changing call and wait for it to commit.
    pub async fn submit(&self, function: &str, args: &[&str]) -> Result<SubmittedTransaction, GatewayError> {
        self.session
            .submit(&self.channel_id, &self.chaincode, function, args)
            .await
    }

    /// Run a read-only call on one peer. The result may be empty.
    pub async fn evaluate(&self, function: &str, args: &[&str]) -> Result<Vec<u8>, GatewayError> {
        self.session
            .evaluate(&self.channel_id, &self.chaincode, function, args)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::mocks::{StalledTransport, UnreachableTransport};
    use p256::ecdsa::SigningKey;

    fn identity() -> Identity {
        Identity::new("org1MSP", b"-----BEGIN CERTIFICATE-----\n".to_vec())
    }

    fn signer() -> Signer {
        Signer::from_signing_key(SigningKey::random(&mut rand::rngs::OsRng))
    }

    #[tokio::test]
    async fn test_close_twice() {
        let transport = UnreachableTransport;
        let session = open_session(identity(), signer(), &transport, HashAlgorithm::Sha256);
        assert!(session.close().is_ok());
        assert!(matches!(session.close(), Err(GatewayError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_calls_after_close_fail() {
        let transport = UnreachableTransport;
        let session = open_session(identity(), signer(), &transport, HashAlgorithm::Sha256);
        let contract = session.ledger("mainchannel").contract("sollytch-chain");
        session.close().unwrap();

        let err = contract.evaluate("GetTestByID", &["t1"]).await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionClosed));
        let err = contract.submit("StoreTest", &["t1", "{}", ""]).await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn test_lookups_are_lazy() {
        let transport = UnreachableTransport;
        let session = open_session(identity(), signer(), &transport, HashAlgorithm::Sha384);
        let ledger = session.ledger("mainchannel");
        let a = ledger.contract("sollytch-chain");
        let b = ledger.contract("sollytch-chain");
        assert_eq!(a.name(), b.name());
        assert_eq!(a.ledger_name(), "mainchannel");
        assert_eq!(session.hash_algorithm(), HashAlgorithm::Sha384);
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_retryable() {
        let transport = UnreachableTransport;
        let session = open_session(identity(), signer(), &transport, HashAlgorithm::Sha256);
        let err = session
            .ledger("mainchannel")
            .contract("sollytch-chain")
            .evaluate("GetTestByID", &["t1"])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unavailable { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_evaluate_deadline() {
        let transport = StalledTransport;
        let options = CallOptions {
            evaluate_timeout_ms: 20,
            ..Default::default()
        };
        let session =
            open_session(identity(), signer(), &transport, HashAlgorithm::Sha256).with_options(options);

        let err = session
            .ledger("mainchannel")
            .contract("sollytch-chain")
            .evaluate("GetTestByID", &["t1"])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout { operation: "evaluate", .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_endorse_deadline() {
        let transport = StalledTransport;
        let options = CallOptions {
            endorse_timeout_ms: 20,
            ..Default::default()
        };
        let session =
            open_session(identity(), signer(), &transport, HashAlgorithm::Sha256).with_options(options);

        let err = session
            .ledger("mainchannel")
            .contract("sollytch-chain")
            .submit("StoreModel", &["k", "AA=="])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Timeout { operation: "endorse", .. }));
    }

    #[tokio::test]
    async fn test_debug_hides_signer() {
        let transport = UnreachableTransport;
        let session = open_session(identity(), signer(), &transport, HashAlgorithm::Sha256);
        let rendered = format!("{session:?}");
        assert!(rendered.contains("org1MSP"));
        assert!(!rendered.contains("key"));
    }
}
