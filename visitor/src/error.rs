//! Failure type for a traversal.

use thiserror::Error;

use crate::pointer::Pointer;

/// The one failure a traversal resolves to.
///
/// Whichever node fails first wins; no partial tree is produced for any of
/// its ancestors.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The replace callback returned an error for the node at `pointer`.
    #[error("replace failed at {pointer}")]
    Replace {
        pointer: Pointer,
        #[source]
        source: anyhow::Error,
    },

    /// Descent went past the configured depth limit.
    #[error("depth limit {limit} exceeded at {pointer}")]
    DepthExceeded { pointer: Pointer, limit: usize },
}

impl TransformError {
    /// Pointer of the node that triggered the failure.
    pub fn pointer(&self) -> &Pointer {
        match self {
            TransformError::Replace { pointer, .. } => pointer,
            TransformError::DepthExceeded { pointer, .. } => pointer,
        }
    }
}
