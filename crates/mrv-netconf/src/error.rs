//! Error types for NETCONF operations.

use std::io;
use thiserror::Error;

/// Result type alias for NETCONF operations.
pub type NetconfResult<T> = Result<T, NetconfError>;

/// Errors that can occur while talking NETCONF to a switch.
#[derive(Debug, Error)]
pub enum NetconfError {
    /// TCP connection to the device failed.
    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        /// Device host.
        host: String,
        /// Device port.
        port: u16,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// SSH protocol error.
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Password authentication was rejected.
    #[error("Authentication failed for user '{username}'")]
    AuthFailed {
        /// The rejected username.
        username: String,
    },

    /// Session establishment or an RPC exceeded the protocol timeout.
    #[error("NETCONF operation timed out after {seconds}s")]
    Timeout {
        /// The configured timeout.
        seconds: u64,
    },

    /// The server replied with one or more `<rpc-error>` elements.
    #[error("RPC failed: {message}")]
    Rpc {
        /// Error text extracted from the reply.
        message: String,
    },

    /// The byte stream could not be parsed as framed NETCONF messages.
    #[error("Framing error: {message}")]
    Framing {
        /// What went wrong.
        message: String,
    },

    /// The SSH channel closed before a full reply arrived.
    #[error("Channel closed by peer")]
    ChannelClosed,
}

impl NetconfError {
    /// Creates an RPC failure from reply text.
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
        }
    }

    /// Creates a framing error.
    pub fn framing(message: impl Into<String>) -> Self {
        Self::Framing {
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient transport
    /// condition that a later sync pass may recover from.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NetconfError::Connect { .. }
                | NetconfError::Timeout { .. }
                | NetconfError::ChannelClosed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_display() {
        let err = NetconfError::rpc("data exists");
        assert_eq!(err.to_string(), "RPC failed: data exists");
    }

    #[test]
    fn test_timeout_display() {
        let err = NetconfError::Timeout { seconds: 5 };
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_is_transient() {
        assert!(NetconfError::Timeout { seconds: 5 }.is_transient());
        assert!(NetconfError::ChannelClosed.is_transient());
        assert!(!NetconfError::rpc("bad-element").is_transient());
    }
}
