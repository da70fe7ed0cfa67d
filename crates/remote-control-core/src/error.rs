//! Error types for the remote-control protocol

use thiserror::Error;

/// Result type for remote-control operations
pub type Result<T> = std::result::Result<T, RemoteControlError>;

/// Remote-control error types
#[derive(Debug, Error)]
pub enum RemoteControlError {
    /// Listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure on an established connection
    #[error("Transport error: {0}")]
    TransportError(String),

    /// Operation did not complete in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Peer sent something that is not a protocol line
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Server answered with `ERROR: <message>`
    #[error("{0}")]
    RemoteError(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for RemoteControlError {
    fn from(err: std::io::Error) -> Self {
        RemoteControlError::TransportError(err.to_string())
    }
}

/// Failure raised by a host read or write handler.
///
/// Displays as exactly its message so it can be forwarded verbatim in an
/// `ERROR: <message>` reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_displays_message_verbatim() {
        let err = HandlerError::new("Throttle must be between 0.0 and 1.0, got 2");
        assert_eq!(err.to_string(), "Throttle must be between 0.0 and 1.0, got 2");
        assert_eq!(err.message(), err.to_string());
    }

    #[test]
    fn test_remote_error_has_no_prefix() {
        let err = RemoteControlError::RemoteError("Unknown path '/z'".into());
        assert_eq!(err.to_string(), "Unknown path '/z'");
    }
}
