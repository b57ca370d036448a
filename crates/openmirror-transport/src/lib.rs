//! Vendor transport abstraction for deformable mirror devices.
//!
//! The vendor SDK is an opaque communication layer addressing one physical
//! mirror. This crate models it as the narrow [`MirrorTransport`] trait so
//! the control core never links the SDK directly, and ships a mock
//! implementation for testing without hardware.
//!
//! Every operation is blocking and synchronous: it completes (or fails)
//! before the caller regains control. Cancellation and timeouts live inside
//! the transport (the device exposes a `Timeout` attribute), never here.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod traits;

pub use traits::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a transport implementation.
///
/// [`TransportError::Failed`] only signals *that* the device rejected an
/// operation; the human-readable reason comes from
/// [`MirrorTransport::last_error`], which the session layer queries when it
/// translates the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Device signalled failure")]
    Failed,

    #[error("Transport is not initialized")]
    NotInitialized,

    #[error("Transport is already initialized")]
    AlreadyInitialized,

    #[error("Failed to initialize transport for serial {serial:?}: {reason}")]
    InitFailed {
        /// Serial identifier passed to initialize.
        serial: String,
        /// Vendor-reported reason.
        reason: String,
    },
}

/// Convenience result alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Diagnostic retrieved from the device after a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportDiagnostic {
    /// Vendor error code.
    pub code: u32,
    /// Vendor diagnostic message. May be empty.
    pub message: String,
}

impl TransportDiagnostic {
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", TransportError::Failed),
            "Device signalled failure"
        );
        assert_eq!(
            format!("{}", TransportError::NotInitialized),
            "Transport is not initialized"
        );

        let err = TransportError::InitFailed {
            serial: "BAX153".to_string(),
            reason: "no such device".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("BAX153") && msg.contains("no such device"));
    }

    #[test]
    fn test_diagnostic_roundtrip() {
        let diag = TransportDiagnostic::new(57, "DAC underflow");
        let json = serde_json::to_string(&diag).expect("serializable");
        let back: TransportDiagnostic = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, diag);
    }
}
