//! # valpack
//!
//! Versioned, chunked, compressible serialization for dynamic value
//! graphs. Graphs may contain cycles and shared subtrees; both survive a
//! round trip with identity intact. Frames embed the producer's version
//! identity so embedded function bytecode is only revived on a build that
//! can run it.
//!
//! ## Quick start
//!
//! ```
//! use valpack::prelude::*;
//!
//! let mut t = Table::new();
//! t.push(Value::Int(1));
//! t.push(Value::str("two"));
//! t.push(Value::Bool(true));
//! t.push(Value::Nil);
//! let original = Value::table(t);
//!
//! let bytes = Encoder::new().to_vec(&original)?;
//! let restored = Decoder::new().from_slice(&bytes)?;
//! assert!(restored.structural_eq(&original));
//! # Ok::<(), valpack::Error>(())
//! ```
//!
//! ## Workspace layout
//!
//! | Crate | Role |
//! |-------|------|
//! | `valpack-core` | host value model and version identity |
//! | `valpack-wire` | node encoding, frames, codecs, transports |
//! | `valpack-graph` | graph flattening/rebuilding, extension hooks |
//!
//! This crate re-exports the pieces a typical embedder needs; reach into
//! the member crates for the lower-level surfaces.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod prelude;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};

pub use valpack_core::{
    BytecodePolicy, Function, FunctionInfo, Table, TableRef, UserData, Value, VersionInfo,
    BYTECODE_FORMAT_REVISION,
};
pub use valpack_graph::{ExtensionNode, GraphError, HookRegistry};
pub use valpack_wire::{Codec, Node, WireError, DEFAULT_CHUNK_LIMIT, FORMAT_VERSION};
