//! Asynchronous, order-preserving transformer for JSON value trees.
//!
//! [`visit`] walks a [`serde_json::Value`] pre-order from the root and hands
//! every node, together with its structural [`Pointer`], to a replace
//! callback. The value the callback resolves to is what gets descended into,
//! so a callback can grow the tree (replace a leaf with an object) and have
//! the new children transformed in the same pass.
//!
//! - **[`pointer`]**: position addressing (`/`, `/a`, `/a/0`).
//! - **[`visit`](mod@visit)**: the traversal itself, its options, and the sync adapters.
//! - **[`error`]**: the single failure type a traversal can produce.
//!
//! The crate does no I/O and is runtime-agnostic: it only needs `futures`.

pub mod error;
pub mod pointer;
pub mod visit;

pub use error::TransformError;
pub use pointer::{Pointer, PointerStyle};
pub use visit::{DEFAULT_MAX_DEPTH, VisitOptions, sync, visit, visit_blocking, visit_with};
