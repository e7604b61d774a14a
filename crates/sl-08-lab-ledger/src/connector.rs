//! # Scoped Ledger Access
//!
//! Every operation runs inside [`LedgerConnector::with_ledger`]:
//!
//! ```text
//! load identity + signer → open channel → open session
//!     → operation(LabLedger)
//! close session → close channel        (on success and on failure)
//! ```
//!
//! Nothing is kept between calls; each scope reads its credentials and
//! dials the peer afresh.

use crate::config::LedgerProfile;
use crate::errors::LabError;
use crate::ledger::LabLedger;
use futures::future::BoxFuture;
use sl_01_identity_store::{load_identity, load_signer, Identity, Signer};
use sl_02_secure_channel::open_channel_from_config;
use sl_03_transaction_gateway::{open_session, InMemoryLedger, LedgerTransport};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where ledger calls are sent.
#[derive(Clone)]
pub enum TransportSource {
    /// TLS channel to the peer named in the profile.
    Peer,
    /// In-process ledger.
    InMemory(Arc<InMemoryLedger>),
}

/// Where the client identity comes from.
#[derive(Clone)]
pub enum CredentialSource {
    /// Read from the profile's MSP directories on every connection.
    MspDirectories,
    /// Fixed identity and key.
    Fixed { identity: Identity, signer: Signer },
}

/// Opens one scoped ledger session per operation.
#[derive(Clone)]
pub struct LedgerConnector {
    profile: LedgerProfile,
    transport: TransportSource,
    credentials: CredentialSource,
}

impl LedgerConnector {
    pub fn new(profile: LedgerProfile, transport: TransportSource, credentials: CredentialSource) -> Self {
        Self {
            profile,
            transport,
            credentials,
        }
    }

    /// Real peer, credentials from disk.
    pub fn peer(profile: LedgerProfile) -> Self {
        Self::new(profile, TransportSource::Peer, CredentialSource::MspDirectories)
    }

    /// In-process ledger with a throwaway key for the profile's MSP.
    pub fn in_memory(profile: LedgerProfile, ledger: Arc<InMemoryLedger>) -> Self {
        let identity = Identity::new(profile.msp_id.clone(), Vec::new());
        Self::new(
            profile,
            TransportSource::InMemory(ledger),
            CredentialSource::Fixed {
                identity,
                signer: Signer::generate(),
            },
        )
    }

    pub fn profile(&self) -> &LedgerProfile {
        &self.profile
    }

    /// Run `operation` against a freshly opened session, releasing the
    /// session and channel on every exit path.
    pub async fn with_ledger<T, F>(&self, operation: F) -> Result<T, LabError>
    where
        F: for<'a> FnOnce(LabLedger<'a>) -> BoxFuture<'a, Result<T, LabError>>,
    {
        let (identity, signer) = self.credentials()?;

        match &self.transport {
            TransportSource::Peer => {
                let channel = open_channel_from_config(&self.profile.peer).await?;
                let outcome = self.run(&channel, identity, signer, operation).await;
                let closed = channel.close();
                match (outcome, closed) {
                    (Ok(value), Ok(())) => Ok(value),
                    (Ok(_), Err(close_err)) => Err(close_err.into()),
                    (Err(err), Ok(())) => Err(err),
                    (Err(err), Err(close_err)) => {
                        warn!(error = %close_err, "Channel close failed after operation error");
                        Err(err)
                    }
                }
            }
            TransportSource::InMemory(ledger) => self.run(ledger.as_ref(), identity, signer, operation).await,
        }
    }

    fn credentials(&self) -> Result<(Identity, Signer), LabError> {
        match &self.credentials {
            CredentialSource::MspDirectories => {
                let policy = self.profile.credential_selection;
                let identity = load_identity(&self.profile.msp_id, &self.profile.cert_dir, policy)?;
                let signer = load_signer(&self.profile.key_dir, policy)?;
                Ok((identity, signer))
            }
            CredentialSource::Fixed { identity, signer } => Ok((identity.clone(), signer.clone())),
        }
    }

    async fn run<T, F>(
        &self,
        transport: &dyn LedgerTransport,
        identity: Identity,
        signer: Signer,
        operation: F,
    ) -> Result<T, LabError>
    where
        F: for<'a> FnOnce(LabLedger<'a>) -> BoxFuture<'a, Result<T, LabError>>,
    {
        let session = open_session(identity, signer, transport, self.profile.hash_algorithm)
            .with_options(self.profile.call_options.clone());

        let outcome = operation(LabLedger::new(&session, &self.profile)).await;
        let closed = session.close();
        debug!(ok = outcome.is_ok(), "Ledger scope finished");

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(close_err)) => Err(close_err.into()),
            (Err(err), _) => Err(err),
        }
    }
}

impl std::fmt::Debug for LedgerConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transport = match self.transport {
            TransportSource::Peer => "peer",
            TransportSource::InMemory(_) => "in-memory",
        };
        f.debug_struct("LedgerConnector")
            .field("channel", &self.profile.channel_name)
            .field("endpoint", &self.profile.peer.endpoint)
            .field("transport", &transport)
            .finish()
    }
}
