//! Host graph to Portable Value Tree
//!
//! The serializer walks a host value graph depth-first and flattens it into
//! a tree. Tables are identity-tracked: the first visit assigns the table
//! the next composite index and emits its contents, every later visit emits
//! a back-reference to that index. This is what keeps cyclic graphs finite
//! and shared subtrees shared. Scalars are copied by value; functions are
//! deliberately not identity-tracked and duplicate on repeat visits.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::GraphError;
use crate::hooks::HookRegistry;
use valpack_core::Value;
use valpack_wire::Node;

/// One-shot converter from a host value graph to a [`Node`] tree
pub struct Serializer<'a> {
    hooks: &'a HookRegistry,
    /// Table pointer -> assigned composite index
    memo: HashMap<usize, u32>,
    next_index: u32,
}

impl<'a> Serializer<'a> {
    /// Create a serializer using the given hook registry for unknown kinds
    pub fn new(hooks: &'a HookRegistry) -> Self {
        Serializer {
            hooks,
            memo: HashMap::new(),
            next_index: 0,
        }
    }

    /// Flatten a value graph into a Portable Value Tree
    pub fn serialize(&mut self, value: &Value) -> Result<Node, GraphError> {
        self.walk(value)
    }

    fn walk(&mut self, value: &Value) -> Result<Node, GraphError> {
        match value {
            Value::Nil => Ok(Node::Nil),
            Value::Bool(b) => Ok(Node::Bool(*b)),
            Value::Int(i) => Ok(Node::Int(*i)),
            Value::Float(f) => Ok(Node::Float(*f)),
            Value::Str(s) => Ok(Node::Str(s.clone())),

            Value::Table(table) => {
                let identity = Rc::as_ptr(table) as usize;
                if let Some(&index) = self.memo.get(&identity) {
                    return Ok(Node::Ref(index));
                }
                // Assign the index before descending so self-references
                // resolve to this table.
                let index = self.next_index;
                self.next_index = self.next_index.checked_add(1).ok_or_else(|| {
                    GraphError::Unserializable {
                        kind: "Table (composite index space exhausted)".into(),
                    }
                })?;
                self.memo.insert(identity, index);

                let table = table.borrow();
                let mut array = Vec::with_capacity(table.array.len());
                for entry in &table.array {
                    array.push(self.walk(entry)?);
                }
                let mut hash = Vec::with_capacity(table.hash.len());
                for (key, entry) in &table.hash {
                    hash.push((self.walk(key)?, self.walk(entry)?));
                }
                Ok(Node::Table { array, hash })
            }

            Value::Function(function) => Ok(Node::Function {
                bytecode: function.bytecode.clone(),
                name: function.info.name.clone(),
                source: function.info.source.clone(),
                line: function.info.line,
            }),

            Value::UserData(data) => {
                let ext = self.hooks.serialize(data)?;
                Ok(Node::Extension {
                    tag: ext.tag,
                    payload: ext.payload,
                })
            }
        }
    }
}
