//! Test-only helpers for building workspace fixtures on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::io::discover::DEFAULT_DESCRIPTOR_NAME;

/// Descriptor exercising vars, env placeholders and several targets.
///
/// `greet` expects `GREETING` in the environment.
pub fn sample_descriptor() -> Value {
    json!({
        "vars": {
            "who": "world",
            "fail_command": ["sh", "-c", "exit 3"]
        },
        "targets": {
            "greet": {
                "command": ["sh", "-c", "echo ${env:GREETING} ${var:who}"],
                "env": {"WHO": "${var:who}"}
            },
            "fail": {
                "command": "${var:fail_command}"
            },
            "where": {
                "command": ["sh", "-c", "pwd"],
                "cwd": "sub"
            }
        }
    })
}

/// Write `descriptor` as `workspace.json` in `dir`.
pub fn write_descriptor(dir: &Path, descriptor: &Value) -> Result<PathBuf> {
    let path = dir.join(DEFAULT_DESCRIPTOR_NAME);
    let mut payload = serde_json::to_string_pretty(descriptor).context("serialize descriptor")?;
    payload.push('\n');
    fs::write(&path, payload).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// Create a temp dir holding `descriptor` plus an empty `sub/` directory.
pub fn temp_workspace(descriptor: &Value) -> Result<(TempDir, PathBuf)> {
    let temp = tempfile::tempdir().context("create tempdir")?;
    fs::create_dir_all(temp.path().join("sub")).context("create sub dir")?;
    let path = write_descriptor(temp.path(), descriptor)?;
    Ok((temp, path))
}
