//! Workspace launcher built on the `visitor` transform engine.
//!
//! The launcher finds a workspace descriptor by walking up from a start
//! directory, resolves `${...}` placeholders throughout it, and turns a named
//! target into a runnable command. The split follows the usual layering:
//!
//! - **[`core`]**: Pure logic (placeholder templates, target specs).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting helpers (discovery, config, child processes).
//!
//! Orchestration modules ([`resolve`], [`workspace`], [`run`]) coordinate core
//! logic with I/O to implement CLI commands.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod resolve;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workspace;
