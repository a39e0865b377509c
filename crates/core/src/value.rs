//! Host value graph for valpack
//!
//! This module defines the canonical `Value` type that the serializer walks.
//! Unlike a plain tree, a value graph may contain shared substructure and
//! cycles: tables are reference-counted cells, so two values can point at the
//! same table and a table can (transitively) contain itself.
//!
//! ## The Eight Kinds
//!
//! 1. `Nil` - absence of value
//! 2. `Bool` - boolean true or false
//! 3. `Int` - 64-bit signed integer
//! 4. `Float` - 64-bit IEEE-754 floating point
//! 5. `Str` - raw byte string (not necessarily UTF-8)
//! 6. `Table` - shared composite with an ordered array part and a keyed part
//! 7. `Function` - bytecode blob plus debug metadata
//! 8. `UserData` - opaque host object, only transportable via extension hooks
//!
//! ## Equality Rules
//!
//! - Different kinds are NEVER equal (no type coercion)
//! - `Int(1)` != `Float(1.0)`; `Str(b"abc")` is distinct from every other kind
//! - Float uses IEEE-754 equality: `NaN != NaN`, `-0.0 == 0.0`
//! - Tables compare structurally: shared substructure and cycles are
//!   equivalent when the graphs have the same shape, regardless of storage
//! - UserData compares by identity; its payload is opaque

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable handle to a [`Table`].
///
/// Multiple values holding the same `TableRef` observe each other's
/// mutations; this is what makes diamonds and cycles representable.
pub type TableRef = Rc<RefCell<Table>>;

/// Canonical valpack value
///
/// This is the host-side representation of a value graph. Scalars are owned
/// inline; tables, functions, and user data are reference-counted so the
/// graph can share nodes.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of value
    Nil,

    /// Boolean true or false
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit IEEE-754 floating point
    /// Supports: NaN, +Inf, -Inf, -0.0, subnormals
    Float(f64),

    /// Raw byte string; arbitrary bytes, not required to be UTF-8
    Str(Vec<u8>),

    /// Shared composite: ordered array part plus keyed part
    Table(TableRef),

    /// Function value: bytecode blob plus debug metadata
    Function(Rc<Function>),

    /// Opaque host object; only extension hooks know how to transport it
    UserData(Rc<UserData>),
}

impl Value {
    /// Build a `Str` value from anything byte-like
    pub fn str(s: impl AsRef<[u8]>) -> Value {
        Value::Str(s.as_ref().to_vec())
    }

    /// Wrap a [`Table`] into a shared `Table` value
    pub fn table(t: Table) -> Value {
        Value::Table(Rc::new(RefCell::new(t)))
    }

    /// Returns the kind name as a string (for error messages)
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::Table(_) => "Table",
            Value::Function(_) => "Function",
            Value::UserData(_) => "UserData",
        }
    }

    /// Check if this value is nil
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as raw byte string
    pub fn as_str(&self) -> Option<&[u8]> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the shared table handle
    pub fn as_table(&self) -> Option<&TableRef> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Try to get the function
    pub fn as_function(&self) -> Option<&Rc<Function>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Try to get the user data
    pub fn as_user_data(&self) -> Option<&Rc<UserData>> {
        match self {
            Value::UserData(u) => Some(u),
            _ => None,
        }
    }

    /// Structural graph equality
    ///
    /// Compares two value graphs by shape rather than by storage identity.
    /// Shared substructure and cycles are handled with a visited-pair set:
    /// once a pair of tables is under comparison, re-encountering the same
    /// pair is treated as equal instead of recursing forever.
    pub fn structural_eq(&self, other: &Value) -> bool {
        let mut seen = HashSet::new();
        structural_eq_inner(self, other, &mut seen)
    }
}

fn structural_eq_inner(a: &Value, b: &Value, seen: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        // IEEE-754 equality: NaN != NaN, -0.0 == 0.0
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Table(x), Value::Table(y)) => {
            let pair = (Rc::as_ptr(x) as usize, Rc::as_ptr(y) as usize);
            if !seen.insert(pair) {
                // Already comparing this pair further up the stack
                return true;
            }
            let x = x.borrow();
            let y = y.borrow();
            if x.array.len() != y.array.len() || x.hash.len() != y.hash.len() {
                return false;
            }
            for (xe, ye) in x.array.iter().zip(y.array.iter()) {
                if !structural_eq_inner(xe, ye, seen) {
                    return false;
                }
            }
            // Keyed part is order-insensitive
            for (xk, xv) in &x.hash {
                let found = y.hash.iter().any(|(yk, yv)| {
                    structural_eq_inner(xk, yk, seen) && structural_eq_inner(xv, yv, seen)
                });
                if !found {
                    return false;
                }
            }
            true
        }
        (Value::Function(f), Value::Function(g)) => {
            f.bytecode == g.bytecode && f.info == g.info && f.executable == g.executable
        }
        // Opaque payloads compare by identity only
        (Value::UserData(u), Value::UserData(v)) => Rc::ptr_eq(u, v),

        // Different kinds: NEVER equal (NO TYPE COERCION)
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other)
    }
}

/// Composite value with an ordered array part and a keyed part
///
/// The array part holds positionally-indexed entries; the keyed part holds
/// arbitrary key/value pairs. Insertion order of the keyed part carries no
/// meaning.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Ordered, positionally-indexed entries
    pub array: Vec<Value>,
    /// Keyed entries; keys may be any value kind
    pub hash: Vec<(Value, Value)>,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Table::default()
    }

    /// Append to the array part
    pub fn push(&mut self, value: Value) {
        self.array.push(value);
    }

    /// Insert into the keyed part, replacing any structurally-equal key
    pub fn set(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.hash.iter_mut().find(|(k, _)| k.structural_eq(&key)) {
            slot.1 = value;
        } else {
            self.hash.push((key, value));
        }
    }

    /// Look up a keyed entry by structural key equality
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.hash
            .iter()
            .find(|(k, _)| k.structural_eq(key))
            .map(|(_, v)| v)
    }

    /// Total number of entries across both parts
    pub fn len(&self) -> usize {
        self.array.len() + self.hash.len()
    }

    /// True when both parts are empty
    pub fn is_empty(&self) -> bool {
        self.array.is_empty() && self.hash.is_empty()
    }
}

/// Debug metadata carried alongside function bytecode
///
/// The minimum needed to reconstruct a useful callable (or a legible stub)
/// on the far side: name, defining source, and starting line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionInfo {
    /// Function name, possibly empty for anonymous functions
    pub name: String,
    /// Source identifier (file name or chunk label)
    pub source: String,
    /// Line where the function is defined
    pub line: u32,
}

/// Function value: an opaque bytecode blob plus debug metadata
///
/// `executable` records whether the bytecode is trusted for the running
/// bytecode format. Decoding a frame produced by an incompatible bytecode
/// version yields stubs: metadata intact, bytecode dropped, not callable.
#[derive(Debug, Clone)]
pub struct Function {
    /// Compiled bytecode; empty for stubs
    pub bytecode: Vec<u8>,
    /// Debug metadata
    pub info: FunctionInfo,
    /// Whether the bytecode may be materialized as live code
    pub executable: bool,
}

impl Function {
    /// Create an executable function from bytecode
    pub fn new(bytecode: Vec<u8>, info: FunctionInfo) -> Self {
        Function {
            bytecode,
            info,
            executable: true,
        }
    }

    /// Create an inert placeholder carrying only debug metadata
    pub fn stub(info: FunctionInfo) -> Self {
        Function {
            bytecode: Vec::new(),
            info,
            executable: false,
        }
    }
}

/// Opaque host object
///
/// The converter cannot classify these natively; they round-trip only
/// through the extension hook registry, keyed by `type_name`.
pub struct UserData {
    /// Extension type tag
    pub type_name: String,
    /// Host payload; hooks downcast this to the concrete type
    pub data: Box<dyn Any>,
}

impl UserData {
    /// Wrap a host object under a type tag
    pub fn new(type_name: impl Into<String>, data: impl Any) -> Self {
        UserData {
            type_name: type_name.into(),
            data: Box::new(data),
        }
    }

    /// Downcast the payload to a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }
}

impl fmt::Debug for UserData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserData")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
