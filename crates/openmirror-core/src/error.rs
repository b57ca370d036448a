//! The uniform error type and transport-failure translation.

use openmirror_registry::RegistryError;
use openmirror_transport::{MirrorTransport, TransportError};
use thiserror::Error;

/// Upper bound on the diagnostic message carried out of the transport.
pub const MAX_DIAGNOSTIC_LEN: usize = 256;

/// Substituted when the device cannot even report why it failed.
pub const PLACEHOLDER_DIAGNOSTIC: &str = "device error (diagnostic unavailable)";

/// Errors surfaced by mirror control operations.
///
/// Everything except [`MirrorError::Io`] is a local, synchronous failure the
/// caller may recover from: the operation aborts and the session's durable
/// state stays last-known-good. `Io` during open means the ambient process
/// state could not even be read; no partial session is ever returned.
/// Nothing here is retried automatically; blind retries of an actuator
/// command are a hardware-safety hazard, so retry is a caller-level decision.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Registry lookup or access-mode failure (`NotFound` / access denied).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Command vector length mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid command value: {0}")]
    InvalidValue(String),

    /// Any transport-reported failure, with the device's own diagnostic.
    #[error("Device error {code}: {message}")]
    Device { code: u32, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Convenience result alias for mirror control operations.
pub type MirrorResult<T> = Result<T, MirrorError>;

impl MirrorError {
    /// True for the errors a caller can sensibly handle and move on from.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, MirrorError::Io(_))
    }
}

/// Truncates a diagnostic to [`MAX_DIAGNOSTIC_LEN`] bytes on a char boundary.
fn bounded(mut message: String) -> String {
    if message.len() > MAX_DIAGNOSTIC_LEN {
        let mut end = MAX_DIAGNOSTIC_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

/// Converts a transport failure into the uniform [`MirrorError::Device`].
///
/// Retrieves the device's diagnostic through `last_error`; if that retrieval
/// itself fails, substitutes [`PLACEHOLDER_DIAGNOSTIC`]. Must be called
/// before the next transport operation overwrites the diagnostic.
pub fn translate(transport: &mut dyn MirrorTransport, failure: TransportError) -> MirrorError {
    match transport.last_error() {
        Ok(diag) => {
            let message = if diag.message.is_empty() {
                failure.to_string()
            } else {
                diag.message
            };
            MirrorError::Device {
                code: diag.code,
                message: bounded(message),
            }
        }
        Err(_) => MirrorError::Device {
            code: 0,
            message: PLACEHOLDER_DIAGNOSTIC.to_string(),
        },
    }
}
