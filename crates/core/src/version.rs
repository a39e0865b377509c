//! Runtime and bytecode version identity
//!
//! Every encoded frame embeds the identity of the runtime that produced it:
//! a human-readable interpreter version string and a bytecode-compat tag.
//! The tag gates whether embedded function bytecode may be materialized as
//! live code on decode.
//!
//! The policy is deliberately conservative: bytecode formats are routinely
//! incompatible across minor revisions, and loading foreign bytecode risks
//! crashes or undefined behavior. Any mismatch, including an empty embedded
//! tag, degrades functions to inert stubs rather than failing the decode.

/// Revision of the function bytecode format understood by this build.
///
/// Bump whenever the bytecode blob layout changes incompatibly.
pub const BYTECODE_FORMAT_REVISION: u32 = 1;

/// Identity of the runtime that produced (or is consuming) a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Human-readable interpreter version string
    pub interpreter: String,
    /// Bytecode-compat tag; exact string equality gates bytecode loading
    pub bytecode: String,
}

impl VersionInfo {
    /// Capture the identity of the running build
    pub fn current() -> Self {
        VersionInfo {
            interpreter: format!("valpack {}", env!("CARGO_PKG_VERSION")),
            bytecode: format!("valpack:{:04}", BYTECODE_FORMAT_REVISION),
        }
    }

    /// Build an explicit identity (for embedders with their own runtime)
    pub fn new(interpreter: impl Into<String>, bytecode: impl Into<String>) -> Self {
        VersionInfo {
            interpreter: interpreter.into(),
            bytecode: bytecode.into(),
        }
    }
}

/// Decode-time decision about embedded function bytecode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytecodePolicy {
    /// Whether embedded bytecode may be materialized as executable code
    pub allow_bytecode: bool,
}

impl BytecodePolicy {
    /// Decide the policy for a frame.
    ///
    /// Bytecode is allowed iff both tags are non-empty and exactly equal.
    /// Version mismatch is not an error: functions decode as stubs instead.
    pub fn decide(embedded: &VersionInfo, current: &VersionInfo) -> Self {
        let allow = !embedded.bytecode.is_empty()
            && !current.bytecode.is_empty()
            && embedded.bytecode == current.bytecode;
        BytecodePolicy {
            allow_bytecode: allow,
        }
    }

    /// Policy that always accepts bytecode (same-process round trips)
    pub fn allow() -> Self {
        BytecodePolicy {
            allow_bytecode: true,
        }
    }

    /// Policy that always degrades functions to stubs
    pub fn deny() -> Self {
        BytecodePolicy {
            allow_bytecode: false,
        }
    }
}
