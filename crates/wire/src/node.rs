//! Portable Value Tree
//!
//! The transport-neutral form a value graph takes between the converter and
//! the wire format. A [`Node`] is always a tree: sharing and cycles in the
//! source graph are flattened into [`Node::Ref`] back-references, indices
//! into the decode-time table of already-materialized composites. Raw memory
//! addresses never appear on the wire.

/// One node of the Portable Value Tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Absence of value
    Nil,

    /// Boolean
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// 64-bit IEEE-754 float
    Float(f64),

    /// Raw byte string
    Str(Vec<u8>),

    /// Composite: ordered array part plus keyed part
    Table {
        /// Positionally-indexed entries
        array: Vec<Node>,
        /// Keyed entries
        hash: Vec<(Node, Node)>,
    },

    /// Function bytecode plus debug metadata
    Function {
        /// Opaque bytecode blob
        bytecode: Vec<u8>,
        /// Function name (possibly empty)
        name: String,
        /// Defining source identifier
        source: String,
        /// Defining line
        line: u32,
    },

    /// Extension value produced by a serialize hook
    Extension {
        /// Extension type tag
        tag: String,
        /// Opaque payload owned by the hook pair
        payload: Vec<u8>,
    },

    /// Back-reference to a previously-materialized composite.
    ///
    /// The index counts `Table` nodes in depth-first encounter order.
    /// Forward references are invalid by construction.
    Ref(u32),
}

impl Node {
    /// Node kind name for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Nil => "Nil",
            Node::Bool(_) => "Bool",
            Node::Int(_) => "Int",
            Node::Float(_) => "Float",
            Node::Str(_) => "Str",
            Node::Table { .. } => "Table",
            Node::Function { .. } => "Function",
            Node::Extension { .. } => "Extension",
            Node::Ref(_) => "Ref",
        }
    }
}
