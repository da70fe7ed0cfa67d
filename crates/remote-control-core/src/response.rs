//! Single-line responses
//!
//! - `OK <value>` answers a read
//! - `OK` answers a write
//! - `ERROR: <message>` reports any failure

use crate::error::{RemoteControlError, Result};
use std::fmt;

const OK: &str = "OK";
const ERROR_PREFIX: &str = "ERROR: ";

/// A response line, without its `\n` terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Successful read. An empty value still renders as `OK ` with a trailing space.
    Value(String),
    /// Successful write
    Done,
    /// Any failure
    Error(String),
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    pub fn unknown_path(path: &str) -> Self {
        Response::Error(format!("Unknown path '{}'", path))
    }

    /// Decode a line received from the server.
    ///
    /// Only the line terminator is stripped; a read value keeps any other
    /// whitespace the server sent.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line == OK {
            return Ok(Response::Done);
        }
        if let Some(value) = line.strip_prefix("OK ") {
            return Ok(Response::Value(value.to_string()));
        }
        if let Some(message) = line.strip_prefix(ERROR_PREFIX) {
            return Ok(Response::Error(message.to_string()));
        }

        Err(RemoteControlError::ProtocolError(format!(
            "Unrecognized response line: {:?}",
            line
        )))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Value(value) => write!(f, "{} {}", OK, value),
            Response::Done => f.write_str(OK),
            Response::Error(message) => write!(f, "{}{}", ERROR_PREFIX, message),
        }
    }
}
