//! Static device parameter registry for deformable mirror controllers.
//!
//! The vendor transport is untyped: an attribute name plus a single scalar
//! (or string) slot. This crate is the one place that knows which attribute
//! names exist, what kind of value each carries, and whether a given access
//! direction is safe. Command paths never query the transport with an
//! unchecked name.
//!
//! Lookups are case-insensitive and purely functional; the table itself is
//! immutable and process-wide.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod lookup;
pub mod table;

pub use lookup::*;
pub use table::*;

use thiserror::Error;

/// Errors returned by registry lookups and access checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown parameter: {0:?}")]
    NotFound(String),

    #[error("Parameter {name} is not readable")]
    ReadDenied {
        /// Canonical parameter name from the table.
        name: &'static str,
    },

    #[error("Parameter {name} is not writable")]
    WriteDenied {
        /// Canonical parameter name from the table.
        name: &'static str,
    },
}

/// Convenience result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
