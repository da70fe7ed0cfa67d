//! # remote-control-core
//!
//! Core types for the remote-control text protocol.
//!
//! This crate provides the vocabulary shared by the command server and its clients:
//! - Command line parsing (`GET /path`, `SET /path value`)
//! - Single-line responses (`OK`, `OK <value>`, `ERROR: <message>`)
//! - Error types

pub mod command;
pub mod error;
pub mod response;

pub use command::{Command, EMPTY_COMMAND, INVALID_FORMAT};
pub use error::{HandlerError, RemoteControlError, Result};
pub use response::Response;

/// Port the command server listens on unless configured otherwise
pub const DEFAULT_PORT: u16 = 8080;
