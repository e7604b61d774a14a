//! Prepared transaction envelopes: assembling one from an endorsed
//! simulation and reading the chaincode result back out of it.

use crate::domain::errors::TransportError;
use crate::proposal::DecodedProposal;
use crate::proto::common::{Envelope, Payload};
use crate::proto::peer::{
    ChaincodeAction, ChaincodeActionPayload, ChaincodeEndorsedAction, ChaincodeId, Endorsement,
    ProposalResponsePayload, Response, Transaction, TransactionAction,
};
use prost::Message;
use sha2::{Digest, Sha256};

/// Assemble the unsigned envelope a gateway returns from `Endorse`.
pub fn prepare_envelope(proposal: &DecodedProposal, response: Response, endorser: &[u8]) -> Envelope {
    let action = ChaincodeAction {
        response: Some(response),
        chaincode_id: Some(ChaincodeId {
            name: proposal.chaincode.clone(),
            ..Default::default()
        }),
        ..Default::default()
    };

    let response_payload = ProposalResponsePayload {
        proposal_hash: Sha256::digest(&proposal.payload).to_vec(),
        extension: action.encode_to_vec(),
    };

    let action_payload = ChaincodeActionPayload {
        chaincode_proposal_payload: proposal.payload.clone(),
        action: Some(ChaincodeEndorsedAction {
            proposal_response_payload: response_payload.encode_to_vec(),
            endorsements: vec![Endorsement {
                endorser: endorser.to_vec(),
                signature: Vec::new(),
            }],
        }),
    };

    let transaction = Transaction {
        actions: vec![TransactionAction {
            header: proposal.header.signature_header.clone(),
            payload: action_payload.encode_to_vec(),
        }],
    };

    let payload = Payload {
        header: Some(proposal.header.clone()),
        data: transaction.encode_to_vec(),
    };

    Envelope {
        payload: payload.encode_to_vec(),
        signature: Vec::new(),
    }
}

/// Chaincode response payload carried by an endorsed envelope.
pub fn endorsed_result(envelope: &Envelope) -> Result<Vec<u8>, TransportError> {
    let payload = Payload::decode(envelope.payload.as_slice())?;
    let transaction = Transaction::decode(payload.data.as_slice())?;
    let action = transaction
        .actions
        .first()
        .ok_or_else(|| TransportError::Protocol("prepared transaction has no actions".into()))?;

    let action_payload = ChaincodeActionPayload::decode(action.payload.as_slice())?;
    let endorsed = action_payload
        .action
        .ok_or_else(|| TransportError::Protocol("prepared transaction has no endorsed action".into()))?;
    let response_payload = ProposalResponsePayload::decode(endorsed.proposal_response_payload.as_slice())?;
    let chaincode_action = ChaincodeAction::decode(response_payload.extension.as_slice())?;

    Ok(chaincode_action
        .response
        .map(|response| response.payload)
        .unwrap_or_default())
}
