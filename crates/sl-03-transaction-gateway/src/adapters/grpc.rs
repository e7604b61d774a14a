//! Gateway RPCs over a TLS [`ChannelSession`].

use crate::domain::errors::TransportError;
use crate::ports::outbound::LedgerTransport;
use crate::proto::gateway::{
    paths, CommitStatusResponse, EndorseRequest, EndorseResponse, EvaluateRequest, EvaluateResponse,
    SignedCommitStatusRequest, SubmitRequest, SubmitResponse,
};
use async_trait::async_trait;
use sl_02_secure_channel::ChannelSession;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::Code;
use tracing::debug;

impl From<tonic::Status> for TransportError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            Code::Unavailable => Self::Unavailable(status.message().to_string()),
            code => Self::Rejected {
                code: format!("{code:?}"),
                message: status.message().to_string(),
            },
        }
    }
}

async fn unary<Req, Resp>(
    session: &ChannelSession,
    path: &'static str,
    request: Req,
) -> Result<Resp, TransportError>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = tonic::client::Grpc::new(session.transport()?);
    grpc.ready()
        .await
        .map_err(|e| TransportError::Unavailable(e.to_string()))?;

    debug!(endpoint = session.endpoint(), path, "Gateway RPC");
    let response = grpc
        .unary(
            tonic::Request::new(request),
            PathAndQuery::from_static(path),
            ProstCodec::<Req, Resp>::default(),
        )
        .await?;

    Ok(response.into_inner())
}

#[async_trait]
impl LedgerTransport for ChannelSession {
    async fn evaluate(&self, request: EvaluateRequest) -> Result<EvaluateResponse, TransportError> {
        unary(self, paths::EVALUATE, request).await
    }

    async fn endorse(&self, request: EndorseRequest) -> Result<EndorseResponse, TransportError> {
        unary(self, paths::ENDORSE, request).await
    }

    async fn submit(&self, request: SubmitRequest) -> Result<SubmitResponse, TransportError> {
        unary(self, paths::SUBMIT, request).await
    }

    async fn commit_status(
        &self,
        request: SignedCommitStatusRequest,
    ) -> Result<CommitStatusResponse, TransportError> {
        unary(self, paths::COMMIT_STATUS, request).await
    }
}
