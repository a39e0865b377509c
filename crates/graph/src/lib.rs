//! Value graph conversion for valpack
//!
//! Bridges the host value model (`valpack-core`) and the Portable Value
//! Tree (`valpack-wire`). The serializer flattens arbitrary graphs,
//! including cycles and shared subtrees, into back-referenced trees; the
//! deserializer rebuilds them with identity intact. Non-native host
//! objects are routed through a caller-registered extension hook pair.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deserializer;
pub mod error;
pub mod hooks;
pub mod serializer;

pub use deserializer::Deserializer;
pub use error::GraphError;
pub use hooks::{DeserializeHook, ExtensionNode, HookRegistry, SerializeHook};
pub use serializer::Serializer;
