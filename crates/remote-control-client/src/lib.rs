//! Client for the remote-control command server
//!
//! Every call opens a fresh TCP connection, sends one command line and
//! reads the single response line the server writes before closing.

use remote_control_core::{RemoteControlError, Response, Result};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

/// Client for a remote-control command server
#[derive(Debug, Clone)]
pub struct RemoteControlClient {
    /// Server address (host:port)
    address: String,
    /// Limit for connect + request + response
    timeout: Duration,
}

impl RemoteControlClient {
    /// Create a client for the server at `address`
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Override the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read a property
    pub async fn get(&self, path: &str) -> Result<String> {
        check_token("path", path)?;
        match self.send_line(&format!("GET {}", path)).await? {
            Response::Value(value) => Ok(value),
            Response::Done => Err(RemoteControlError::ProtocolError(
                "Expected a value, got bare OK".into(),
            )),
            Response::Error(message) => Err(RemoteControlError::RemoteError(message)),
        }
    }

    /// Write a property
    pub async fn set(&self, path: &str, value: &str) -> Result<()> {
        check_token("path", path)?;
        check_token("value", value)?;
        match self.send_line(&format!("SET {} {}", path, value)).await? {
            Response::Done => Ok(()),
            Response::Value(value) => Err(RemoteControlError::ProtocolError(format!(
                "Expected bare OK, got value '{}'",
                value
            ))),
            Response::Error(message) => Err(RemoteControlError::RemoteError(message)),
        }
    }

    /// Send a raw command line and decode the reply
    pub async fn send_line(&self, line: &str) -> Result<Response> {
        tokio::time::timeout(self.timeout, self.exchange(line))
            .await
            .map_err(|_| {
                RemoteControlError::Timeout(format!(
                    "No response from {} within {:?}",
                    self.address, self.timeout
                ))
            })?
    }

    async fn exchange(&self, line: &str) -> Result<Response> {
        let mut stream = TcpStream::connect(&self.address).await.map_err(|e| {
            RemoteControlError::TransportError(format!(
                "Failed to connect to {}: {}",
                self.address, e
            ))
        })?;

        debug!("Sending: {}", line);
        // One write: the server takes a single read per command
        let request = format!("{}\n", line);
        stream.write_all(request.as_bytes()).await?;
        stream.flush().await?;

        let mut reader = BufReader::new(stream);
        let mut reply = String::new();
        let bytes_read = reader.read_line(&mut reply).await?;
        if bytes_read == 0 {
            return Err(RemoteControlError::ProtocolError(
                "Connection closed without a response".into(),
            ));
        }

        debug!("Received: {}", reply.trim_end());
        Response::parse(&reply)
    }
}

/// Paths and values are single whitespace-free tokens on the wire
fn check_token(what: &str, token: &str) -> Result<()> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(RemoteControlError::ProtocolError(format!(
            "{} must be a single non-empty token, got {:?}",
            what, token
        )));
    }
    Ok(())
}
