//! Facade-level error type

use thiserror::Error;
use valpack_graph::GraphError;
use valpack_wire::WireError;

/// Any failure an encode or decode round trip can produce
#[derive(Debug, Error)]
pub enum Error {
    /// Frame, codec, or transport failure
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Value graph conversion failure
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Convenience alias used across the facade API
pub type Result<T> = std::result::Result<T, Error>;
