//! Conversion of a resolved target entry into a runnable command spec.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

/// Everything needed to spawn a target's process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
    pub timeout: Duration,
}

/// Build a [`RunSpec`] from the resolved `targets.<name>` entry.
///
/// `cwd` is interpreted relative to `root_dir`; absolute paths are kept.
pub fn run_spec(
    name: &str,
    target: &Value,
    root_dir: &Path,
    default_timeout: Duration,
) -> Result<RunSpec> {
    let entry = target
        .as_object()
        .ok_or_else(|| anyhow!("target {name:?} must be an object"))?;

    let command = entry
        .get("command")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("target {name:?} needs a `command` array"))?;
    let mut words = command
        .iter()
        .map(|word| scalar_to_string(word).with_context(|| format!("target {name:?} command")))
        .collect::<Result<Vec<_>>>()?;
    if words.is_empty() || words[0].trim().is_empty() {
        bail!("target {name:?} has an empty command");
    }
    let program = words.remove(0);

    let cwd = match entry.get("cwd") {
        None | Some(Value::Null) => root_dir.to_path_buf(),
        Some(Value::String(dir)) => root_dir.join(dir),
        Some(other) => bail!("target {name:?} cwd must be a string, got {other}"),
    };

    let mut env = BTreeMap::new();
    match entry.get("env") {
        None | Some(Value::Null) => {}
        Some(Value::Object(vars)) => {
            for (key, value) in vars {
                let value = scalar_to_string(value)
                    .with_context(|| format!("target {name:?} env {key}"))?;
                env.insert(key.clone(), value);
            }
        }
        Some(other) => bail!("target {name:?} env must be an object, got {other}"),
    }

    let timeout = match entry.get("timeout_secs") {
        None | Some(Value::Null) => default_timeout,
        Some(value) => {
            let secs = value
                .as_u64()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| anyhow!("target {name:?} timeout_secs must be a positive integer"))?;
            Duration::from_secs(secs)
        }
    };

    Ok(RunSpec {
        name: name.to_string(),
        program,
        args: words,
        cwd,
        env,
        timeout,
    })
}

/// Strings pass through; numbers and booleans use their JSON text.
fn scalar_to_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            Err(anyhow!("expected a string, number or boolean, got {value}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DEFAULT: Duration = Duration::from_secs(60);

    #[test]
    fn full_target_maps_every_field() {
        let target = json!({
            "command": ["cargo", "test", "--jobs", 4],
            "cwd": "crates/core",
            "env": {"RUST_LOG": "debug", "RETRIES": 2, "CI": true},
            "timeout_secs": 30
        });
        let spec = run_spec("test", &target, Path::new("/ws"), DEFAULT).expect("spec");
        assert_eq!(spec.program, "cargo");
        assert_eq!(spec.args, vec!["test", "--jobs", "4"]);
        assert_eq!(spec.cwd, PathBuf::from("/ws/crates/core"));
        assert_eq!(spec.env.get("RETRIES").map(String::as_str), Some("2"));
        assert_eq!(spec.env.get("CI").map(String::as_str), Some("true"));
        assert_eq!(spec.timeout, Duration::from_secs(30));
    }

    #[test]
    fn minimal_target_uses_defaults() {
        let spec = run_spec("ls", &json!({"command": ["ls"]}), Path::new("/ws"), DEFAULT)
            .expect("spec");
        assert_eq!(spec.cwd, PathBuf::from("/ws"));
        assert!(spec.args.is_empty());
        assert!(spec.env.is_empty());
        assert_eq!(spec.timeout, DEFAULT);
    }

    #[test]
    fn invalid_targets_are_rejected() {
        let root = Path::new("/ws");
        assert!(run_spec("a", &json!("ls"), root, DEFAULT).is_err());
        assert!(run_spec("b", &json!({"command": []}), root, DEFAULT).is_err());
        assert!(run_spec("c", &json!({"command": [["nested"]]}), root, DEFAULT).is_err());
        assert!(run_spec("d", &json!({"command": ["x"], "timeout_secs": 0}), root, DEFAULT).is_err());
        assert!(run_spec("e", &json!({"command": ["x"], "env": ["A=1"]}), root, DEFAULT).is_err());
    }
}
