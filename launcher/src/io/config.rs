//! Launcher configuration stored next to the descriptor as `launcher.toml`.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use visitor::{PointerStyle, VisitOptions};

/// File name looked up in the workspace root.
pub const CONFIG_FILE_NAME: &str = "launcher.toml";

/// Launcher configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults
/// below. Unknown keys are rejected.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LauncherConfig {
    /// Deepest pointer depth placeholder resolution may reach.
    pub max_depth: usize,

    /// Sibling nodes resolved concurrently per container (unbounded if unset).
    pub concurrency: Option<usize>,

    /// Pointer rendering used in resolution errors.
    pub pointer_style: PointerStyle,

    /// Timeout for targets that do not set `timeout_secs`.
    pub default_timeout_secs: u64,

    /// Truncate captured target stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            max_depth: visitor::DEFAULT_MAX_DEPTH,
            concurrency: None,
            pointer_style: PointerStyle::Rfc6901,
            default_timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl LauncherConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(anyhow!("max_depth must be > 0"));
        }
        if self.concurrency == Some(0) {
            return Err(anyhow!("concurrency must be > 0 when set"));
        }
        if self.default_timeout_secs == 0 {
            return Err(anyhow!("default_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn visit_options(&self) -> VisitOptions {
        VisitOptions {
            pointer_style: self.pointer_style,
            max_depth: Some(self.max_depth),
            concurrency: self.concurrency,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `LauncherConfig::default()`.
pub async fn load_config(path: &Path) -> Result<LauncherConfig> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let cfg = LauncherConfig::default();
            cfg.validate()?;
            return Ok(cfg);
        }
        Err(err) => return Err(err).with_context(|| format!("read {}", path.display())),
    };
    let cfg: LauncherConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
