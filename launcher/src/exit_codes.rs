//! Stable exit codes for launcher CLI commands.
//!
//! `launcher run` forwards the child's own exit code when it has one, so
//! these only apply when the launcher itself decides the outcome.

/// Command succeeded.
pub const OK: i32 = 0;
/// Descriptor discovery, config, parsing or placeholder resolution failed.
pub const INVALID: i32 = 1;
/// The target timed out or was terminated without an exit code.
pub const TARGET_FAILED: i32 = 2;
