//! # Channel Session
//!
//! One authenticated HTTP/2 connection to one peer. The TLS server name is
//! pinned to the configured host alias, so a peer reached through
//! `localhost:7051` (port-forward, load balancer) still has its certificate
//! validated as `peer0.org1.example.com`.
//!
//! A session is opened exactly once (no retry) and closed exactly once.

use crate::config::{endpoint_uri, ChannelConfig};
use crate::errors::{describe, ChannelError};
use parking_lot::Mutex;
use std::time::Duration;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info, warn};

const PEM_CERTIFICATE_TAG: &str = "-----BEGIN CERTIFICATE-----";

/// Default connect deadline for [`open_channel`].
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// An open transport handle to a single peer endpoint.
pub struct ChannelSession {
    endpoint: String,
    peer_host_alias: String,
    transport: Mutex<Option<Channel>>,
}

impl ChannelSession {
    /// Wrap an already established tonic channel.
    pub fn from_transport(
        endpoint: impl Into<String>,
        peer_host_alias: impl Into<String>,
        channel: Channel,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            peer_host_alias: peer_host_alias.into(),
            transport: Mutex::new(Some(channel)),
        }
    }

    /// Endpoint this session dialled.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Name the peer certificate was validated against.
    pub fn peer_host_alias(&self) -> &str {
        &self.peer_host_alias
    }

    /// Whether `close()` has not been called yet.
    pub fn is_open(&self) -> bool {
        self.transport.lock().is_some()
    }

    /// Handle for issuing RPCs. Fails once the session is closed.
    pub fn transport(&self) -> Result<Channel, ChannelError> {
        self.transport
            .lock()
            .as_ref()
            .cloned()
            .ok_or_else(|| ChannelError::Closed {
                endpoint: self.endpoint.clone(),
            })
    }

    /// Release the connection. A second call fails with `AlreadyClosed`.
    pub fn close(&self) -> Result<(), ChannelError> {
        match self.transport.lock().take() {
            Some(channel) => {
                drop(channel);
                info!(endpoint = %self.endpoint, "Channel closed");
                Ok(())
            }
            None => Err(ChannelError::AlreadyClosed {
                endpoint: self.endpoint.clone(),
            }),
        }
    }
}

impl Drop for ChannelSession {
    fn drop(&mut self) {
        if self.transport.get_mut().take().is_some() {
            debug!(endpoint = %self.endpoint, "Channel dropped without close, releasing");
        }
    }
}

impl std::fmt::Debug for ChannelSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSession")
            .field("endpoint", &self.endpoint)
            .field("peer_host_alias", &self.peer_host_alias)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Open a TLS channel to `endpoint`, validating the peer as `peer_host_alias`.
pub async fn open_channel(
    endpoint: &str,
    peer_host_alias: &str,
    trusted_root_cert: &[u8],
) -> Result<ChannelSession, ChannelError> {
    connect(endpoint, peer_host_alias, trusted_root_cert, DEFAULT_CONNECT_TIMEOUT).await
}

/// Read the trusted root from `config.tls_root_cert_path`, then connect.
pub async fn open_channel_from_config(config: &ChannelConfig) -> Result<ChannelSession, ChannelError> {
    let root = std::fs::read(&config.tls_root_cert_path).map_err(|e| {
        ChannelError::RootCertificateUnreadable {
            path: config.tls_root_cert_path.clone(),
            reason: e.to_string(),
        }
    })?;

    connect(
        &config.endpoint,
        &config.peer_host_alias,
        &root,
        config.connect_timeout(),
    )
    .await
}

async fn connect(
    endpoint: &str,
    peer_host_alias: &str,
    trusted_root_cert: &[u8],
    connect_timeout: Duration,
) -> Result<ChannelSession, ChannelError> {
    let pem_text = String::from_utf8_lossy(trusted_root_cert);
    if !pem_text.contains(PEM_CERTIFICATE_TAG) {
        return Err(ChannelError::InvalidRootCertificate);
    }

    let tls = ClientTlsConfig::new()
        .ca_certificate(Certificate::from_pem(trusted_root_cert))
        .domain_name(peer_host_alias);

    let handshake_error = |reason: String| ChannelError::Handshake {
        endpoint: endpoint.to_string(),
        host_alias: peer_host_alias.to_string(),
        reason,
    };

    let uri = endpoint_uri(endpoint);
    let channel = Endpoint::from_shared(uri)
        .map_err(|e| ChannelError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?
        .connect_timeout(connect_timeout)
        .tls_config(tls)
        .map_err(|e| handshake_error(describe(&e)))?
        .connect()
        .await
        .map_err(|e| {
            warn!(endpoint, host_alias = peer_host_alias, "Peer connection failed");
            handshake_error(describe(&e))
        })?;

    info!(endpoint, host_alias = peer_host_alias, "Channel established");
    Ok(ChannelSession::from_transport(endpoint, peer_host_alias, channel))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lazy_session() -> ChannelSession {
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        ChannelSession::from_transport("127.0.0.1:1", "peer0.org1.example.com", channel)
    }

    #[tokio::test]
    async fn test_close_twice_fails_cleanly() {
        let session = lazy_session();
        assert!(session.close().is_ok());
        assert_eq!(
            session.close(),
            Err(ChannelError::AlreadyClosed {
                endpoint: "127.0.0.1:1".into()
            })
        );
    }

    #[tokio::test]
    async fn test_transport_after_close_fails() {
        let session = lazy_session();
        assert!(session.transport().is_ok());
        session.close().unwrap();
        assert!(!session.is_open());
        assert!(matches!(
            session.transport(),
            Err(ChannelError::Closed { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_pem_root() {
        let err = open_channel("localhost:7051", "peer0", b"garbage")
            .await
            .unwrap_err();
        assert_eq!(err, ChannelError::InvalidRootCertificate);
    }

    #[tokio::test]
    async fn test_unreadable_root_file() {
        let config = ChannelConfig {
            tls_root_cert_path: "/no/such/ca.crt".into(),
            ..Default::default()
        };
        let err = open_channel_from_config(&config).await.unwrap_err();
        assert!(matches!(err, ChannelError::RootCertificateUnreadable { .. }));
    }

    #[tokio::test]
    async fn test_root_file_read_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.crt");
        std::fs::write(&path, b"not a certificate").unwrap();

        let config = ChannelConfig {
            tls_root_cert_path: path,
            ..Default::default()
        };
        let err = open_channel_from_config(&config).await.unwrap_err();
        assert_eq!(err, ChannelError::InvalidRootCertificate);
    }

    #[tokio::test]
    async fn test_debug_shows_state() {
        let session = lazy_session();
        assert!(format!("{session:?}").contains("open: true"));
    }
}
