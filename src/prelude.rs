//! One-line import for the common API surface
//!
//! ```
//! use valpack::prelude::*;
//! ```

pub use crate::decoder::Decoder;
pub use crate::encoder::Encoder;
pub use crate::error::{Error, Result};
pub use valpack_core::{Function, FunctionInfo, Table, TableRef, UserData, Value, VersionInfo};
pub use valpack_graph::{ExtensionNode, HookRegistry};
pub use valpack_wire::Codec;
