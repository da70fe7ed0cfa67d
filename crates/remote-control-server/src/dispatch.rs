//! Command dispatch
//!
//! Resolves a parsed command against the registry and renders the outcome as a
//! response. Handler failures, including panics, never escape this module.

use crate::registry::HandlerRegistry;
use remote_control_core::{Command, HandlerError, Response};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Execute a command and produce its response line
pub fn dispatch(registry: &HandlerRegistry, command: Command) -> Response {
    match command {
        Command::Get { path } => {
            let Some(handler) = registry.reader(&path) else {
                return Response::unknown_path(&path);
            };
            match contain(|| handler()) {
                Ok(value) => Response::Value(value),
                Err(e) => {
                    debug!("GET {} failed: {}", path, e);
                    Response::error(e.message())
                }
            }
        }
        Command::Set { path, value } => {
            let Some(handler) = registry.writer(&path) else {
                return Response::unknown_path(&path);
            };
            match contain(|| handler(&value)) {
                Ok(()) => Response::Done,
                Err(e) => {
                    debug!("SET {} {} failed: {}", path, value, e);
                    Response::error(e.message())
                }
            }
        }
        Command::Invalid(reason) => Response::Error(reason),
    }
}

/// Run a host handler, turning a panic into a handler error
fn contain<T>(f: impl FnOnce() -> Result<T, HandlerError>) -> Result<T, HandlerError> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(HandlerError::new(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
