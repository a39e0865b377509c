//! Converter error types

use thiserror::Error;
use valpack_wire::WireError;

/// Failures while converting between host graphs and value trees
#[derive(Debug, Error)]
pub enum GraphError {
    /// Back-reference index names a composite that was never materialized.
    ///
    /// Either the index is out of range or it points forward; both mean
    /// the stream is corrupt.
    #[error("back-reference {index} out of range ({materialized} composites materialized)")]
    BadBackReference {
        /// Index found on the wire
        index: u32,
        /// Composites materialized when the reference was hit
        materialized: usize,
    },

    /// Value kind with no native representation and no hook willing to take it
    #[error("cannot serialize {kind} value: no extension hook accepted it")]
    Unserializable {
        /// Kind name of the offending value
        kind: String,
    },

    /// Extension tag with no registered or matching deserialize hook
    #[error("unknown extension type {tag:?}: no deserialize hook accepted it")]
    UnknownExtension {
        /// The tag found on the wire
        tag: String,
    },

    /// An extension hook ran and reported a failure of its own
    #[error("extension hook failed: {message}")]
    Hook {
        /// Hook-provided failure description
        message: String,
    },

    /// Wire-layer failure underneath the converter
    #[error(transparent)]
    Wire(#[from] WireError),
}

impl GraphError {
    /// Convenience constructor for hook implementations
    pub fn hook(message: impl Into<String>) -> Self {
        GraphError::Hook {
            message: message.into(),
        }
    }
}
