//! # Proposal Construction
//!
//! A proposal names the channel, the contract and the invocation
//! `[function, args...]`, and is bound to its creator through the
//! transaction id:
//!
//! ```text
//! transaction_id = hex(SHA-256(nonce ‖ SerializedIdentity))
//! ```

use crate::domain::errors::TransportError;
use crate::proto::common::{header_type, ChannelHeader, Header, SignatureHeader};
use crate::proto::msp::SerializedIdentity;
use crate::proto::peer::{
    ChaincodeHeaderExtension, ChaincodeId, ChaincodeInput, ChaincodeInvocationSpec,
    ChaincodeProposalPayload, ChaincodeSpec, Proposal, SignedProposal,
};
use prost::Message;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sl_01_identity_store::Identity;
use std::time::SystemTime;

/// Random bytes mixed into every transaction id.
pub const NONCE_LEN: usize = 24;

/// Wire form of a client identity, as carried in signature headers.
pub fn serialize_identity(identity: &Identity) -> Vec<u8> {
    SerializedIdentity {
        mspid: identity.msp_id().to_string(),
        id_bytes: identity.credentials().to_vec(),
    }
    .encode_to_vec()
}

/// Derive the transaction id from a nonce and the serialized creator.
pub fn transaction_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}

/// Unsigned proposal plus the identifiers the later RPCs need.
#[derive(Debug, Clone)]
pub struct ProposedTransaction {
    pub transaction_id: String,
    pub channel_id: String,
    pub proposal_bytes: Vec<u8>,
}

/// Build a chaincode invocation proposal from `creator` (a serialized identity).
pub fn build_proposal(
    creator: &[u8],
    channel_id: &str,
    chaincode: &str,
    function: &str,
    args: &[&str],
) -> ProposedTransaction {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    let tx_id = transaction_id(&nonce, creator);

    let chaincode_id = ChaincodeId {
        name: chaincode.to_string(),
        ..Default::default()
    };

    let channel_header = ChannelHeader {
        r#type: header_type::ENDORSER_TRANSACTION,
        timestamp: Some(prost_types::Timestamp::from(SystemTime::now())),
        channel_id: channel_id.to_string(),
        tx_id: tx_id.clone(),
        extension: ChaincodeHeaderExtension {
            chaincode_id: Some(chaincode_id.clone()),
        }
        .encode_to_vec(),
        ..Default::default()
    };

    let signature_header = SignatureHeader {
        creator: creator.to_vec(),
        nonce: nonce.to_vec(),
    };

    let header = Header {
        channel_header: channel_header.encode_to_vec(),
        signature_header: signature_header.encode_to_vec(),
    };

    let mut input_args = Vec::with_capacity(args.len() + 1);
    input_args.push(function.as_bytes().to_vec());
    input_args.extend(args.iter().map(|arg| arg.as_bytes().to_vec()));

    let invocation = ChaincodeInvocationSpec {
        chaincode_spec: Some(ChaincodeSpec {
            chaincode_id: Some(chaincode_id),
            input: Some(ChaincodeInput {
                args: input_args,
                is_init: false,
            }),
            ..Default::default()
        }),
    };

    let proposal = Proposal {
        header: header.encode_to_vec(),
        payload: ChaincodeProposalPayload {
            input: invocation.encode_to_vec(),
        }
        .encode_to_vec(),
        extension: Vec::new(),
    };

    ProposedTransaction {
        transaction_id: tx_id,
        channel_id: channel_id.to_string(),
        proposal_bytes: proposal.encode_to_vec(),
    }
}

/// A proposal taken apart again, as a peer sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedProposal {
    pub transaction_id: String,
    pub channel_id: String,
    pub chaincode: String,
    pub function: String,
    pub args: Vec<String>,
    pub creator: SerializedIdentity,
    pub timestamp: Option<prost_types::Timestamp>,
    /// Raw header, reused when the endorsed envelope is assembled
    pub header: Header,
    /// Raw proposal payload
    pub payload: Vec<u8>,
}

/// Decode a signed proposal back into its invocation.
pub fn decode_proposal(signed: &SignedProposal) -> Result<DecodedProposal, TransportError> {
    if signed.signature.is_empty() {
        return Err(TransportError::Rejected {
            code: "PermissionDenied".into(),
            message: "proposal is not signed".into(),
        });
    }

    let proposal = Proposal::decode(signed.proposal_bytes.as_slice())?;
    let header = Header::decode(proposal.header.as_slice())?;
    let channel_header = ChannelHeader::decode(header.channel_header.as_slice())?;
    let signature_header = SignatureHeader::decode(header.signature_header.as_slice())?;
    let creator = SerializedIdentity::decode(signature_header.creator.as_slice())?;

    let expected_id = transaction_id(&signature_header.nonce, &signature_header.creator);
    if expected_id != channel_header.tx_id {
        return Err(TransportError::Rejected {
            code: "InvalidArgument".into(),
            message: format!("transaction id {} does not match its nonce and creator", channel_header.tx_id),
        });
    }

    let extension = ChaincodeHeaderExtension::decode(channel_header.extension.as_slice())?;
    let chaincode = extension
        .chaincode_id
        .map(|id| id.name)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| TransportError::Protocol("proposal names no chaincode".into()))?;

    let payload = ChaincodeProposalPayload::decode(proposal.payload.as_slice())?;
    let invocation = ChaincodeInvocationSpec::decode(payload.input.as_slice())?;
    let mut args = invocation
        .chaincode_spec
        .and_then(|spec| spec.input)
        .map(|input| input.args)
        .unwrap_or_default()
        .into_iter()
        .map(|arg| String::from_utf8(arg).map_err(|e| TransportError::Protocol(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    if args.is_empty() {
        return Err(TransportError::Protocol("proposal has no function name".into()));
    }
    let function = args.remove(0);

    Ok(DecodedProposal {
        transaction_id: channel_header.tx_id,
        channel_id: channel_header.channel_id,
        chaincode,
        function,
        args,
        creator,
        timestamp: channel_header.timestamp,
        header,
        payload: proposal.payload,
    })
}
