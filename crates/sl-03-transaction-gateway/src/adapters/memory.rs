//! # In-Memory Ledger
//!
//! A single-process stand-in for a peer gateway. Proposals are decoded the
//! way a peer would decode them and dispatched to registered
//! [`ChaincodeLogic`] by contract name.
//!
//! - `Evaluate` runs against a scratch copy of the world state
//! - `Endorse` simulates and parks the invocation until `Submit`
//! - `Submit` re-executes against the live state and cuts a block
//!
//! A transaction whose re-execution fails at commit time is recorded as
//! `MVCC_READ_CONFLICT` and leaves the state untouched. A commit record is
//! dropped once its status has been read; at most [`RETAINED_COMMITS`]
//! unread records are kept.

use crate::domain::errors::TransportError;
use crate::envelope::prepare_envelope;
use crate::ports::outbound::LedgerTransport;
use crate::proposal::{decode_proposal, DecodedProposal};
use crate::proto::gateway::{
    CommitStatusRequest, CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest,
    EvaluateResponse, SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use crate::proto::peer::{Response, SignedProposal, TxValidationCode};
use async_trait::async_trait;
use parking_lot::Mutex;
use prost::Message;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

const STATUS_OK: i32 = 200;
const STATUS_ERROR: i32 = 500;

/// Commit records kept for transactions whose status was never read.
pub const RETAINED_COMMITS: usize = 1024;

/// Key-value state of one contract on one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldState {
    entries: BTreeMap<String, Vec<u8>>,
}

impl WorldState {
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.entries.insert(key.into(), value);
    }

    pub fn delete(&mut self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key)
    }

    /// Entries whose key starts with `prefix`, in key order.
    pub fn scan_prefix<'s>(&'s self, prefix: &'s str) -> impl Iterator<Item = (&'s str, &'s [u8])> + 's {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.as_str(), value.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One chaincode call as seen by [`ChaincodeLogic`].
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub transaction_id: &'a str,
    /// Proposal time, RFC 3339 with seconds precision
    pub timestamp: &'a str,
    pub function: &'a str,
    pub args: &'a [String],
}

/// Contract behaviour hosted by an [`InMemoryLedger`].
///
/// An `Err` is the chaincode's error message, reported to the client as a
/// rejected transaction.
pub trait ChaincodeLogic: Send + Sync {
    fn invoke(&self, state: &mut WorldState, call: Invocation<'_>) -> Result<Vec<u8>, String>;
}

#[derive(Debug)]
struct PendingTransaction {
    channel_id: String,
    chaincode: String,
    timestamp: String,
    function: String,
    args: Vec<String>,
}

impl PendingTransaction {
    fn invocation<'a>(&'a self, transaction_id: &'a str) -> Invocation<'a> {
        Invocation {
            transaction_id,
            timestamp: &self.timestamp,
            function: &self.function,
            args: &self.args,
        }
    }
}

fn render_timestamp(timestamp: Option<&prost_types::Timestamp>) -> String {
    timestamp
        .map(|t| {
            prost_types::Timestamp {
                seconds: t.seconds,
                nanos: 0,
            }
            .to_string()
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy)]
struct CommitRecord {
    code: TxValidationCode,
    block_number: u64,
}

#[derive(Default)]
struct LedgerState {
    worlds: HashMap<(String, String), WorldState>,
    pending: HashMap<String, PendingTransaction>,
    committed: HashMap<String, CommitRecord>,
    commit_order: VecDeque<String>,
    height: u64,
}

impl LedgerState {
    fn record_commit(&mut self, transaction_id: String, record: CommitRecord) {
        self.commit_order.push_back(transaction_id.clone());
        self.committed.insert(transaction_id, record);
        while self.commit_order.len() > RETAINED_COMMITS {
            if let Some(oldest) = self.commit_order.pop_front() {
                self.committed.remove(&oldest);
            }
        }
    }
}

/// In-process [`LedgerTransport`].
#[derive(Default)]
pub struct InMemoryLedger {
    contracts: HashMap<String, Arc<dyn ChaincodeLogic>>,
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host `logic` under the contract name `name` on every channel.
    pub fn with_contract(mut self, name: impl Into<String>, logic: impl ChaincodeLogic + 'static) -> Self {
        self.contracts.insert(name.into(), Arc::new(logic));
        self
    }

    /// Number of blocks cut so far.
    pub fn block_height(&self) -> u64 {
        self.state.lock().height
    }

    /// Snapshot of a contract's committed state.
    pub fn world_state(&self, channel_id: &str, chaincode: &str) -> WorldState {
        self.state
            .lock()
            .worlds
            .get(&(channel_id.to_string(), chaincode.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn logic(&self, chaincode: &str) -> Result<Arc<dyn ChaincodeLogic>, TransportError> {
        self.contracts
            .get(chaincode)
            .cloned()
            .ok_or_else(|| TransportError::Rejected {
                code: "NotFound".into(),
                message: format!("chaincode {chaincode} is not installed"),
            })
    }

    fn decode(proposal: Option<SignedProposal>, transaction_id: &str) -> Result<DecodedProposal, TransportError> {
        let proposal = proposal.ok_or_else(|| TransportError::Protocol("request carries no proposal".into()))?;
        let decoded = decode_proposal(&proposal)?;
        if decoded.transaction_id != transaction_id {
            return Err(TransportError::Rejected {
                code: "InvalidArgument".into(),
                message: format!(
                    "request transaction id {transaction_id} does not match proposal {}",
                    decoded.transaction_id
                ),
            });
        }
        Ok(decoded)
    }

    /// Run against a copy of the committed state; the copy is discarded.
    fn simulate(&self, proposal: &DecodedProposal) -> Result<Result<Vec<u8>, String>, TransportError> {
        let logic = self.logic(&proposal.chaincode)?;
        let mut scratch = self.world_state(&proposal.channel_id, &proposal.chaincode);
        let timestamp = render_timestamp(proposal.timestamp.as_ref());
        Ok(logic.invoke(
            &mut scratch,
            Invocation {
                transaction_id: &proposal.transaction_id,
                timestamp: &timestamp,
                function: &proposal.function,
                args: &proposal.args,
            },
        ))
    }
}

#[async_trait]
impl LedgerTransport for InMemoryLedger {
    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, TransportError> {
        let proposal = Self::decode(request.proposed_transaction, &request.transaction_id)?;
        debug!(tx_id = %proposal.transaction_id, function = %proposal.function, "Evaluate");

        let result = match self.simulate(&proposal)? {
            Ok(payload) => Response {
                status: STATUS_OK,
                message: String::new(),
                payload,
            },
            Err(message) => Response {
                status: STATUS_ERROR,
                message,
                payload: Vec::new(),
            },
        };

        Ok(EvaluateResponse { result: Some(result) })
    }

    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse, TransportError> {
        let proposal = Self::decode(request.proposed_transaction, &request.transaction_id)?;
        debug!(tx_id = %proposal.transaction_id, function = %proposal.function, "Endorse");

        let payload = self.simulate(&proposal)?.map_err(|message| TransportError::Rejected {
            code: "Aborted".into(),
            message: format!("chaincode response {STATUS_ERROR}, {message}"),
        })?;

        let envelope = prepare_envelope(
            &proposal,
            Response {
                status: STATUS_OK,
                message: String::new(),
                payload,
            },
            &proposal.creator.encode_to_vec(),
        );

        self.state.lock().pending.insert(
            proposal.transaction_id.clone(),
            PendingTransaction {
                channel_id: proposal.channel_id,
                chaincode: proposal.chaincode,
                timestamp: render_timestamp(proposal.timestamp.as_ref()),
                function: proposal.function,
                args: proposal.args,
            },
        );

        Ok(EndorseResponse {
            prepared_transaction: Some(envelope),
        })
    }

    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
        let envelope = request
            .prepared_transaction
            .ok_or_else(|| TransportError::Protocol("submit carries no transaction".into()))?;
        if envelope.signature.is_empty() {
            return Err(TransportError::Rejected {
                code: "PermissionDenied".into(),
                message: "transaction envelope is not signed".into(),
            });
        }

        let mut state = self.state.lock();
        let pending = state
            .pending
            .remove(&request.transaction_id)
            .ok_or_else(|| TransportError::Rejected {
                code: "NotFound".into(),
                message: format!("no endorsed transaction {}", request.transaction_id),
            })?;
        let logic = self.logic(&pending.chaincode)?;

        let key = (pending.channel_id.clone(), pending.chaincode.clone());
        let mut next = state.worlds.get(&key).cloned().unwrap_or_default();
        let code = match logic.invoke(&mut next, pending.invocation(&request.transaction_id)) {
            Ok(_) => {
                state.worlds.insert(key, next);
                TxValidationCode::Valid
            }
            Err(_) => TxValidationCode::MvccReadConflict,
        };

        state.height += 1;
        let block_number = state.height;
        state.record_commit(request.transaction_id.clone(), CommitRecord { code, block_number });

        info!(
            tx_id = %request.transaction_id,
            function = %pending.function,
            code = code.as_str_name(),
            block = block_number,
            "Block cut"
        );
        Ok(SubmitResponse {})
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse, TransportError> {
        if request.signature.is_empty() {
            return Err(TransportError::Rejected {
                code: "PermissionDenied".into(),
                message: "commit status request is not signed".into(),
            });
        }
        let status_request = CommitStatusRequest::decode(request.request.as_slice())?;

        let record = self
            .state
            .lock()
            .committed
            .remove(&status_request.transaction_id)
            .ok_or_else(|| TransportError::Rejected {
                code: "NotFound".into(),
                message: format!("transaction {} has not been committed", status_request.transaction_id),
            })?;

        Ok(CommitStatusResponse {
            result: record.code as i32,
            block_number: record.block_number,
        })
    }
}
