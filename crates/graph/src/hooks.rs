//! Extension hook registry
//!
//! Values the converter cannot classify natively (`Value::UserData`) are
//! offered to a caller-registered hook pair: a serialize hook that turns a
//! host object into a tagged byte payload, and a deserialize hook that
//! turns the tag and payload back into a host object.
//!
//! The registry is a single slot holding both hooks. Registration replaces
//! the pair atomically, so a reader never observes a new serialize hook
//! next to a stale deserialize hook. There are no default hooks: an empty
//! registry rejects every non-native value with a clear error rather than
//! degrading it to nil.
//!
//! Registries are cheap to clone and explicitly owned; independent
//! encoder/decoder instances can carry different hook pairs.

use crate::error::GraphError;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use valpack_core::{UserData, Value};

/// What a serialize hook produces for a value it handles
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionNode {
    /// Extension type tag, matched by the deserialize hook
    pub tag: String,
    /// Opaque payload; only the hook pair knows its layout
    pub payload: Vec<u8>,
}

/// Serialize hook: host object in, tagged payload out.
///
/// Returning `Ok(None)` means "not handled", which is a hard failure for
/// that value.
pub type SerializeHook =
    dyn Fn(&UserData) -> Result<Option<ExtensionNode>, GraphError> + Send + Sync;

/// Deserialize hook: tag and payload in, host value out.
///
/// Returning `Ok(None)` means the tag is not recognized, which fails the
/// subtree with an unknown-extension error.
pub type DeserializeHook =
    dyn Fn(&str, &[u8]) -> Result<Option<Value>, GraphError> + Send + Sync;

struct HookPair {
    serialize: Arc<SerializeHook>,
    deserialize: Arc<DeserializeHook>,
}

/// Single-slot, last-writer-wins registry for an extension hook pair
#[derive(Clone, Default)]
pub struct HookRegistry {
    slot: Arc<RwLock<Option<HookPair>>>,
}

impl HookRegistry {
    /// Create an empty registry (rejects every non-native value)
    pub fn new() -> Self {
        HookRegistry::default()
    }

    /// Install a hook pair, replacing any previous pair atomically
    pub fn set_hooks<S, D>(&self, serialize: S, deserialize: D)
    where
        S: Fn(&UserData) -> Result<Option<ExtensionNode>, GraphError> + Send + Sync + 'static,
        D: Fn(&str, &[u8]) -> Result<Option<Value>, GraphError> + Send + Sync + 'static,
    {
        let pair = HookPair {
            serialize: Arc::new(serialize),
            deserialize: Arc::new(deserialize),
        };
        *self.slot.write() = Some(pair);
    }

    /// Remove the installed pair, if any
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    /// Whether a hook pair is currently installed
    pub fn is_registered(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Offer an unknown value to the serialize hook
    pub(crate) fn serialize(&self, data: &UserData) -> Result<ExtensionNode, GraphError> {
        let hook = match self.slot.read().as_ref() {
            Some(pair) => Arc::clone(&pair.serialize),
            None => {
                return Err(GraphError::Unserializable {
                    kind: data.type_name.clone(),
                })
            }
        };
        match hook(data)? {
            Some(node) => Ok(node),
            None => Err(GraphError::Unserializable {
                kind: data.type_name.clone(),
            }),
        }
    }

    /// Route an extension node to the deserialize hook
    pub(crate) fn deserialize(&self, tag: &str, payload: &[u8]) -> Result<Value, GraphError> {
        let hook = match self.slot.read().as_ref() {
            Some(pair) => Arc::clone(&pair.deserialize),
            None => {
                return Err(GraphError::UnknownExtension {
                    tag: tag.to_string(),
                })
            }
        };
        match hook(tag, payload)? {
            Some(value) => Ok(value),
            None => Err(GraphError::UnknownExtension {
                tag: tag.to_string(),
            }),
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("registered", &self.is_registered())
            .finish()
    }
}
