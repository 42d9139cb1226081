//! Loading a workspace descriptor and turning targets into run specs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::target::{RunSpec, run_spec};
use crate::io::config::{CONFIG_FILE_NAME, LauncherConfig, load_config};
use crate::resolve::{EnvSource, Resolver};

/// A fully resolved workspace descriptor.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root_dir: PathBuf,
    pub descriptor_path: PathBuf,
    pub config: LauncherConfig,
    pub resolved: Value,
}

impl Workspace {
    /// Read, parse and resolve the descriptor at `descriptor_path`.
    ///
    /// `launcher.toml` beside the descriptor is applied when present.
    pub async fn load(descriptor_path: &Path) -> Result<Self> {
        Self::load_with_env(descriptor_path, EnvSource::Process).await
    }

    pub async fn load_with_env(descriptor_path: &Path, env: EnvSource) -> Result<Self> {
        let root_dir = descriptor_path
            .parent()
            .with_context(|| format!("descriptor path missing parent {}", descriptor_path.display()))?
            .to_path_buf();
        let config = load_config(&root_dir.join(CONFIG_FILE_NAME)).await?;

        let contents = tokio::fs::read_to_string(descriptor_path)
            .await
            .with_context(|| format!("read {}", descriptor_path.display()))?;
        let raw: Value = serde_json::from_str(&contents)
            .with_context(|| format!("parse {}", descriptor_path.display()))?;
        if !raw.is_object() {
            bail!("{} must contain a JSON object", descriptor_path.display());
        }

        let resolved = Resolver::new(raw, root_dir.clone())
            .with_env(env)
            .resolve(&config.visit_options())
            .await
            .with_context(|| format!("resolve {}", descriptor_path.display()))?;
        if !resolved.get("targets").is_some_and(Value::is_object) {
            bail!("{} needs a `targets` object", descriptor_path.display());
        }

        info!(descriptor = %descriptor_path.display(), "workspace loaded");
        Ok(Self {
            root_dir,
            descriptor_path: descriptor_path.to_path_buf(),
            config,
            resolved,
        })
    }

    /// Target names in descriptor order.
    pub fn target_names(&self) -> Vec<&str> {
        self.targets()
            .map(|targets| targets.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Build the run spec for `name` from the resolved descriptor.
    pub fn resolve_target(&self, name: &str) -> Result<RunSpec> {
        let target = self
            .targets()
            .and_then(|targets| targets.get(name))
            .ok_or_else(|| {
                anyhow!(
                    "unknown target {name:?} (available: {})",
                    self.target_names().join(", ")
                )
            })?;
        let spec = run_spec(name, target, &self.root_dir, self.config.default_timeout())?;
        debug!(target_name = name, program = %spec.program, cwd = %spec.cwd.display(), "target resolved");
        Ok(spec)
    }

    fn targets(&self) -> Option<&serde_json::Map<String, Value>> {
        self.resolved.get("targets").and_then(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_descriptor, temp_workspace};
    use std::collections::BTreeMap;
    use std::fs;
    use std::time::Duration;

    fn env() -> EnvSource {
        EnvSource::Fixed(BTreeMap::from([("GREETING".to_string(), "hello".to_string())]))
    }

    #[tokio::test]
    async fn load_resolves_and_lists_targets_in_order() {
        let (_temp, descriptor) = temp_workspace(&sample_descriptor()).expect("workspace");
        let workspace = Workspace::load_with_env(&descriptor, env()).await.expect("load");
        assert_eq!(workspace.target_names(), vec!["greet", "fail", "where"]);

        let spec = workspace.resolve_target("greet").expect("greet");
        assert_eq!(spec.program, "sh");
        assert_eq!(spec.args, vec!["-c", "echo hello world"]);
        assert_eq!(spec.env.get("WHO").map(String::as_str), Some("world"));
        assert_eq!(spec.cwd, workspace.root_dir);
    }

    #[tokio::test]
    async fn config_next_to_descriptor_is_applied() {
        let (temp, descriptor) = temp_workspace(&sample_descriptor()).expect("workspace");
        fs::write(temp.path().join(CONFIG_FILE_NAME), "default_timeout_secs = 7\n")
            .expect("write config");
        let workspace = Workspace::load_with_env(&descriptor, env()).await.expect("load");
        let spec = workspace.resolve_target("greet").expect("greet");
        assert_eq!(spec.timeout, Duration::from_secs(7));
    }

    #[tokio::test]
    async fn unknown_config_key_fails_load() {
        let (temp, descriptor) = temp_workspace(&sample_descriptor()).expect("workspace");
        fs::write(temp.path().join(CONFIG_FILE_NAME), "descriptor_name = \"ws.json\"\n")
            .expect("write config");
        let err = Workspace::load_with_env(&descriptor, env())
            .await
            .expect_err("unknown key");
        assert!(format!("{err:#}").contains("descriptor_name"));
    }

    #[tokio::test]
    async fn unknown_target_lists_available() {
        let (_temp, descriptor) = temp_workspace(&sample_descriptor()).expect("workspace");
        let workspace = Workspace::load_with_env(&descriptor, env()).await.expect("load");
        let err = workspace.resolve_target("deploy").expect_err("unknown");
        assert!(err.to_string().contains("available: greet, fail, where"));
    }

    #[tokio::test]
    async fn descriptor_without_targets_is_rejected() {
        let (_temp, descriptor) =
            temp_workspace(&serde_json::json!({"vars": {}})).expect("workspace");
        let err = Workspace::load_with_env(&descriptor, env())
            .await
            .expect_err("no targets");
        assert!(err.to_string().contains("targets"));
    }
}
