//! Pre-order traversal with concurrent siblings and ordered reassembly.

use std::future::Future;

use futures::future::{self, BoxFuture, FutureExt, Ready};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::TransformError;
use crate::pointer::{Pointer, PointerStyle};

/// Descent limit for callers whose replacements may grow without bound.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Knobs for a single traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitOptions {
    pub pointer_style: PointerStyle,
    /// Deepest pointer depth a node may be visited at. `None` (the default)
    /// disables the guard, in which case a callback that keeps wrapping its
    /// input never terminates.
    pub max_depth: Option<usize>,
    /// Maximum sibling visits in flight per container. `None` runs them all
    /// at once.
    pub concurrency: Option<usize>,
}

impl Default for VisitOptions {
    fn default() -> Self {
        Self {
            pointer_style: PointerStyle::Plain,
            max_depth: None,
            concurrency: None,
        }
    }
}

/// Transform `root` with default [`VisitOptions`].
///
/// `replace` is called exactly once for every node encountered, including
/// nodes that only exist because an ancestor was replaced. The returned
/// future resolves to the fully reassembled tree or to the first failure.
pub async fn visit<F, Fut>(root: Value, replace: F) -> Result<Value, TransformError>
where
    F: Fn(Value, Pointer) -> Fut + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    visit_with(root, replace, &VisitOptions::default()).await
}

/// Transform `root` with explicit options.
pub async fn visit_with<F, Fut>(
    root: Value,
    replace: F,
    options: &VisitOptions,
) -> Result<Value, TransformError>
where
    F: Fn(Value, Pointer) -> Fut + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    let pointer = Pointer::root_with(options.pointer_style);
    let result = visit_node(root, pointer, &replace, options).await;
    match &result {
        Ok(_) => debug!("transform finished"),
        Err(err) => debug!(pointer = %err.pointer(), "transform aborted"),
    }
    result
}

/// Run a synchronous callback to completion on the current thread.
pub fn visit_blocking<F>(
    root: Value,
    replace: F,
    options: &VisitOptions,
) -> Result<Value, TransformError>
where
    F: Fn(Value, &Pointer) -> anyhow::Result<Value> + Send + Sync,
{
    futures::executor::block_on(visit_with(root, sync(replace), options))
}

/// Adapt a synchronous callback into one returning an already-resolved future.
pub fn sync<F>(
    replace: F,
) -> impl Fn(Value, Pointer) -> Ready<anyhow::Result<Value>> + Send + Sync
where
    F: Fn(Value, &Pointer) -> anyhow::Result<Value> + Send + Sync,
{
    move |value, pointer| future::ready(replace(value, &pointer))
}

fn visit_node<'a, F, Fut>(
    value: Value,
    pointer: Pointer,
    replace: &'a F,
    options: &'a VisitOptions,
) -> BoxFuture<'a, Result<Value, TransformError>>
where
    F: Fn(Value, Pointer) -> Fut + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'a,
{
    async move {
        if let Some(limit) = options.max_depth
            && pointer.depth() > limit
        {
            return Err(TransformError::DepthExceeded { pointer, limit });
        }

        trace!(pointer = %pointer, "replacing node");
        let resolved = match replace(value, pointer.clone()).await {
            Ok(resolved) => resolved,
            Err(source) => return Err(TransformError::Replace { pointer, source }),
        };

        match resolved {
            Value::Object(map) => {
                let (keys, children): (Vec<String>, Vec<Value>) = map.into_iter().unzip();
                let visits = keys
                    .iter()
                    .zip(children)
                    .map(|(key, child)| visit_node(child, pointer.child(key), replace, options))
                    .collect::<Vec<_>>();
                let settled = settle_in_order(visits, options.concurrency).await?;
                Ok(Value::Object(keys.into_iter().zip(settled).collect::<Map<_, _>>()))
            }
            Value::Array(items) => {
                let visits = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| visit_node(item, pointer.index(index), replace, options))
                    .collect::<Vec<_>>();
                let settled = settle_in_order(visits, options.concurrency).await?;
                Ok(Value::Array(settled))
            }
            leaf @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
                Ok(leaf)
            }
        }
    }
    .boxed()
}

/// Await every child visit, returning results in input order regardless of
/// which settles first. The first failure drops the remaining visits.
async fn settle_in_order<'a>(
    visits: Vec<BoxFuture<'a, Result<Value, TransformError>>>,
    concurrency: Option<usize>,
) -> Result<Vec<Value>, TransformError> {
    match concurrency {
        None => future::try_join_all(visits).await,
        Some(limit) => {
            stream::iter(visits)
                .buffered(limit.max(1))
                .try_collect()
                .await
        }
    }
}
