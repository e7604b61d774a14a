//! Channel error types. Every variant is a connection-level failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening, using or closing a peer channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The trusted root certificate file could not be read.
    #[error("Cannot read TLS root certificate {}: {reason}", path.display())]
    RootCertificateUnreadable {
        /// Configured certificate path
        path: PathBuf,
        /// I/O diagnostic
        reason: String,
    },

    /// The trusted root bytes are not a PEM certificate.
    #[error("TLS root certificate is not a PEM certificate")]
    InvalidRootCertificate,

    /// The endpoint string is not a valid URI.
    #[error("Invalid peer endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as configured
        endpoint: String,
        /// Parser diagnostic
        reason: String,
    },

    /// TLS setup or handshake with the peer failed.
    #[error("Connection to {endpoint} (as {host_alias}) failed: {reason}")]
    Handshake {
        /// Endpoint dialled
        endpoint: String,
        /// Name the certificate was validated against
        host_alias: String,
        /// Transport diagnostic
        reason: String,
    },

    /// The channel was used after `close()`.
    #[error("Channel to {endpoint} is closed")]
    Closed {
        /// Endpoint of the closed channel
        endpoint: String,
    },

    /// `close()` was called on an already closed channel.
    #[error("Channel to {endpoint} was already closed")]
    AlreadyClosed {
        /// Endpoint of the closed channel
        endpoint: String,
    },
}

/// Flatten an error and its source chain into one line.
pub(crate) fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_error_mentions_alias() {
        let err = ChannelError::Handshake {
            endpoint: "localhost:7051".into(),
            host_alias: "peer0.org1.example.com".into(),
            reason: "certificate unknown".into(),
        };
        let text = err.to_string();
        assert!(text.contains("localhost:7051"));
        assert!(text.contains("peer0.org1.example.com"));
    }

    #[test]
    fn test_describe_walks_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "inner");
        assert_eq!(describe(&io), "inner");
    }
}
