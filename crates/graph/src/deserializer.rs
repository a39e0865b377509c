//! Portable Value Tree to host graph
//!
//! The deserializer rebuilds a host value graph from a flattened tree.
//! Composite nodes are registered in an index table the moment they are
//! allocated, before their children are materialized, so back-references
//! into a table that is still being filled (self-references, cycles)
//! resolve to the real object. Function nodes are gated by a bytecode
//! policy: when the embedded bytecode revision does not match the running
//! one, functions materialize as inert stubs instead of failing the graph.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::GraphError;
use crate::hooks::HookRegistry;
use valpack_core::{BytecodePolicy, Function, FunctionInfo, Table, TableRef, Value};
use valpack_wire::Node;

/// One-shot converter from a [`Node`] tree back to a host value graph
pub struct Deserializer<'a> {
    hooks: &'a HookRegistry,
    policy: BytecodePolicy,
    /// Tables in first-visit order; back-references index into this
    refs: Vec<TableRef>,
    warned_stub: bool,
}

impl<'a> Deserializer<'a> {
    /// Create a deserializer with the given hook registry and bytecode policy
    pub fn new(hooks: &'a HookRegistry, policy: BytecodePolicy) -> Self {
        Deserializer {
            hooks,
            policy,
            refs: Vec::new(),
            warned_stub: false,
        }
    }

    /// Rebuild a host value graph from a Portable Value Tree
    pub fn deserialize(&mut self, node: &Node) -> Result<Value, GraphError> {
        self.walk(node)
    }

    fn walk(&mut self, node: &Node) -> Result<Value, GraphError> {
        match node {
            Node::Nil => Ok(Value::Nil),
            Node::Bool(b) => Ok(Value::Bool(*b)),
            Node::Int(i) => Ok(Value::Int(*i)),
            Node::Float(f) => Ok(Value::Float(*f)),
            Node::Str(s) => Ok(Value::Str(s.clone())),

            Node::Table { array, hash } => {
                let table = Rc::new(RefCell::new(Table::new()));
                // Register before filling so nested back-references to this
                // table resolve.
                self.refs.push(Rc::clone(&table));
                for entry in array {
                    let value = self.walk(entry)?;
                    table.borrow_mut().push(value);
                }
                for (key, entry) in hash {
                    let key = self.walk(key)?;
                    let value = self.walk(entry)?;
                    // A decoded key may alias the table being filled, and
                    // comparing against it re-borrows the cell. Find the
                    // slot under a shared borrow, then mutate.
                    let slot = {
                        let t = table.borrow();
                        t.hash.iter().position(|(k, _)| k.structural_eq(&key))
                    };
                    let mut t = table.borrow_mut();
                    match slot {
                        Some(i) => t.hash[i].1 = value,
                        None => t.hash.push((key, value)),
                    }
                }
                Ok(Value::Table(table))
            }

            Node::Function {
                bytecode,
                name,
                source,
                line,
            } => {
                let info = FunctionInfo {
                    name: name.clone(),
                    source: source.clone(),
                    line: *line,
                };
                let function = if self.policy.allow_bytecode && !bytecode.is_empty() {
                    Function::new(bytecode.clone(), info)
                } else {
                    if !bytecode.is_empty() && !self.warned_stub {
                        tracing::warn!(
                            name = %info.name,
                            "bytecode revision mismatch, materializing functions as stubs"
                        );
                        self.warned_stub = true;
                    }
                    Function::stub(info)
                };
                Ok(Value::Function(Rc::new(function)))
            }

            Node::Extension { tag, payload } => self.hooks.deserialize(tag, payload),

            Node::Ref(index) => match self.refs.get(*index as usize) {
                Some(table) => Ok(Value::Table(Rc::clone(table))),
                None => Err(GraphError::BadBackReference {
                    index: *index,
                    materialized: self.refs.len(),
                }),
            },
        }
    }
}
