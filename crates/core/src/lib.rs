//! Core value model for valpack
//!
//! This crate defines the host-side value graph ([`Value`], [`Table`],
//! [`Function`], [`UserData`]) and the runtime version identity
//! ([`VersionInfo`], [`BytecodePolicy`]) that the rest of the workspace
//! builds on. It carries no wire-format knowledge.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod value;
pub mod version;

pub use value::{Function, FunctionInfo, Table, TableRef, UserData, Value};
pub use version::{BytecodePolicy, VersionInfo, BYTECODE_FORMAT_REVISION};
