//! Placeholder resolution for workspace descriptors.
//!
//! Resolution is a single [`visitor::visit_with`] pass over the raw
//! descriptor. String nodes holding placeholders are replaced; when a string
//! is exactly one placeholder the referenced value replaces the node as-is,
//! so `"${var:ports}"` can expand into an array whose elements are then
//! resolved in the same pass.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, instrument, trace};
use visitor::{Pointer, VisitOptions};

use crate::core::placeholder::{Placeholder, Segment, Template, may_contain_placeholder};

/// How many times a `var`/`ref` string may point at another placeholder
/// string before resolution gives up.
const MAX_EXPANSION_HOPS: usize = 32;

/// Where `${env:...}` placeholders read from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    #[default]
    Process,
    Fixed(BTreeMap<String, String>),
}

impl EnvSource {
    fn get(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

/// Resolves placeholders against one raw descriptor.
#[derive(Debug, Clone)]
pub struct Resolver {
    raw: Value,
    root_dir: PathBuf,
    env: EnvSource,
}

impl Resolver {
    pub fn new(raw: Value, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw,
            root_dir: root_dir.into(),
            env: EnvSource::Process,
        }
    }

    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }

    /// Resolve every placeholder in the raw descriptor.
    #[instrument(skip_all, fields(root_dir = %self.root_dir.display()))]
    pub async fn resolve(&self, options: &VisitOptions) -> Result<Value> {
        let resolved = visitor::visit_with(
            self.raw.clone(),
            |value, pointer| self.resolve_node(value, pointer),
            options,
        )
        .await
        .context("expand placeholders")?;
        debug!("descriptor resolved");
        Ok(resolved)
    }

    async fn resolve_node(&self, value: Value, pointer: Pointer) -> Result<Value> {
        match value {
            Value::String(text) if may_contain_placeholder(&text) => {
                trace!(pointer = %pointer, "expanding placeholders");
                self.expand(text, 0).await
            }
            other => Ok(other),
        }
    }

    fn expand(&self, text: String, hops: usize) -> BoxFuture<'_, Result<Value>> {
        self.expand_template(text, hops).boxed()
    }

    async fn expand_template(&self, text: String, hops: usize) -> Result<Value> {
        if hops > MAX_EXPANSION_HOPS {
            bail!("placeholder expansion exceeded {MAX_EXPANSION_HOPS} hops at {text:?}");
        }
        let template = Template::parse(&text)?;
        if let Some(literal) = template.literal_text() {
            return Ok(Value::String(literal));
        }
        if let Some(placeholder) = template.as_whole() {
            return self.lookup_expanded(placeholder, hops).await;
        }

        let mut out = String::new();
        for segment in template.into_segments() {
            match segment {
                Segment::Literal(text) => out.push_str(&text),
                Segment::Placeholder(placeholder) => {
                    match self.lookup_expanded(&placeholder, hops).await? {
                        Value::String(s) => out.push_str(&s),
                        other => out.push_str(&other.to_string()),
                    }
                }
            }
        }
        Ok(Value::String(out))
    }

    /// Look up a placeholder, following `var`/`ref` strings that are
    /// themselves templates.
    async fn lookup_expanded(&self, placeholder: &Placeholder, hops: usize) -> Result<Value> {
        let value = self.lookup(placeholder).await?;
        match (placeholder, value) {
            (Placeholder::Var(_) | Placeholder::Ref(_), Value::String(s))
                if may_contain_placeholder(&s) =>
            {
                self.expand(s, hops + 1).await
            }
            (_, value) => Ok(value),
        }
    }

    async fn lookup(&self, placeholder: &Placeholder) -> Result<Value> {
        match placeholder {
            Placeholder::Env(name) => self
                .env
                .get(name)
                .map(Value::String)
                .ok_or_else(|| anyhow!("environment variable {name} is not set")),
            Placeholder::Var(name) => self
                .raw
                .get("vars")
                .and_then(|vars| vars.get(name))
                .cloned()
                .ok_or_else(|| anyhow!("unknown var {name:?}")),
            Placeholder::Ref(pointer) => self
                .raw
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("ref {pointer} does not exist in the descriptor")),
            Placeholder::File(relative) => read_file_value(&self.root_dir.join(relative)).await,
            Placeholder::WorkspaceRoot => Ok(Value::String(self.root_dir.display().to_string())),
        }
    }
}

/// `.json` files are parsed; anything else is text with trailing newlines trimmed.
async fn read_file_value(path: &Path) -> Result<Value> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()));
    }
    Ok(Value::String(contents.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use visitor::TransformError;

    fn fixed_env(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::Fixed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn resolver(raw: Value) -> Resolver {
        Resolver::new(raw, "/ws").with_env(fixed_env(&[("USER", "ada"), ("PORT", "8080")]))
    }

    #[tokio::test]
    async fn env_and_interpolation() {
        let raw = json!({"greeting": "hi ${env:USER} on ${env:PORT}", "plain": 1});
        let resolved = resolver(raw).resolve(&VisitOptions::default()).await.expect("resolve");
        assert_eq!(resolved, json!({"greeting": "hi ada on 8080", "plain": 1}));
    }

    #[tokio::test]
    async fn whole_var_expands_to_container_that_is_resolved_in_place() {
        let raw = json!({
            "vars": {"args": ["--user", "${env:USER}"]},
            "targets": {"greet": {"command": "${var:args}"}}
        });
        let resolved = resolver(raw).resolve(&VisitOptions::default()).await.expect("resolve");
        assert_eq!(resolved["targets"]["greet"]["command"], json!(["--user", "ada"]));
        assert_eq!(resolved["vars"]["args"], json!(["--user", "ada"]));
    }

    #[tokio::test]
    async fn var_strings_are_followed_through_chains() {
        let raw = json!({
            "vars": {"host": "localhost", "url": "http://${var:host}:${env:PORT}"},
            "endpoint": "${var:url}",
            "embedded": "GET ${var:url}/health"
        });
        let resolved = resolver(raw).resolve(&VisitOptions::default()).await.expect("resolve");
        assert_eq!(resolved["endpoint"], json!("http://localhost:8080"));
        assert_eq!(resolved["embedded"], json!("GET http://localhost:8080/health"));
    }

    #[tokio::test]
    async fn ref_and_workspace_root() {
        let raw = json!({
            "settings": {"retries": 3},
            "copy": "${ref:/settings/retries}",
            "text": "retries=${ref:/settings}",
            "out": "${workspace_root}/target"
        });
        let resolved = resolver(raw).resolve(&VisitOptions::default()).await.expect("resolve");
        assert_eq!(resolved["copy"], json!(3));
        assert_eq!(resolved["text"], json!("retries={\"retries\":3}"));
        assert_eq!(resolved["out"], json!("/ws/target"));
    }

    #[tokio::test]
    async fn file_placeholders_read_json_and_text() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("extra.json"), r#"{"name": "${env:USER}"}"#).expect("write");
        fs::write(temp.path().join("VERSION"), "1.2.3\n").expect("write");
        let raw = json!({"extra": "${file:extra.json}", "version": "v${file:VERSION}"});

        let resolved = Resolver::new(raw, temp.path())
            .with_env(fixed_env(&[("USER", "ada")]))
            .resolve(&VisitOptions::default())
            .await
            .expect("resolve");
        assert_eq!(resolved, json!({"extra": {"name": "ada"}, "version": "v1.2.3"}));
    }

    #[tokio::test]
    async fn missing_var_reports_pointer() {
        let raw = json!({"targets": {"a": {"command": ["${var:nope}"]}}});
        let err = resolver(raw)
            .resolve(&VisitOptions::default())
            .await
            .expect_err("should fail");
        let transform = err
            .downcast_ref::<TransformError>()
            .expect("transform error");
        assert_eq!(transform.pointer(), "/targets/a/command/0");
        assert!(format!("{err:#}").contains("unknown var \"nope\""));
    }

    #[tokio::test]
    async fn self_referencing_string_hits_hop_limit() {
        let raw = json!({"vars": {"a": "${var:b}", "b": "${var:a}"}, "x": "${var:a}"});
        let err = resolver(raw)
            .resolve(&VisitOptions::default())
            .await
            .expect_err("cycle");
        assert!(format!("{err:#}").contains("hops"));
    }

    #[tokio::test]
    async fn self_referencing_container_hits_depth_limit() {
        let raw = json!({"vars": {"tree": {"again": "${var:tree}"}}});
        let options = VisitOptions {
            max_depth: Some(16),
            ..VisitOptions::default()
        };
        let err = resolver(raw).resolve(&options).await.expect_err("cycle");
        let transform = err
            .downcast_ref::<TransformError>()
            .expect("transform error");
        assert!(matches!(
            transform,
            TransformError::DepthExceeded { limit: 16, .. }
        ));
    }
}
