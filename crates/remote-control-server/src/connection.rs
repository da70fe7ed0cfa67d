//! Per-connection request handling
//!
//! One command per connection: a single read, one response line, then close.
//! A command that does not arrive within that single read is not reassembled.

use crate::dispatch::dispatch;
use crate::registry::HandlerRegistry;
use remote_control_core::{Command, Response};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Serve one request on `stream`.
///
/// Returns the response that was sent, or `None` when the peer closed
/// before sending anything. Bytes that are not valid UTF-8 are an
/// `InvalidData` error and nothing is written back.
pub async fn serve<S>(
    stream: &mut S,
    registry: &HandlerRegistry,
    buffer_size: usize,
    read_timeout: Option<Duration>,
) -> io::Result<Option<Response>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; buffer_size];

    let bytes_read = match read_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.read(&mut buffer))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no command received"))??,
        None => stream.read(&mut buffer).await?,
    };

    if bytes_read == 0 {
        debug!("Peer closed without sending a command");
        return Ok(None);
    }

    let text = std::str::from_utf8(&buffer[..bytes_read])
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let line = text.trim();
    debug!("Received: {}", line);

    let response = dispatch(registry, Command::parse(line));
    debug!("Sending: {}", response);

    let mut reply = response.to_string();
    reply.push('\n');
    stream.write_all(reply.as_bytes()).await?;
    stream.flush().await?;
    stream.shutdown().await?;

    Ok(Some(response))
}
