//! Locating the workspace descriptor by walking parent directories.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use tracing::{debug, trace};

/// Descriptor file name used when none is given on the command line.
pub const DEFAULT_DESCRIPTOR_NAME: &str = "workspace.json";

/// Return the first `file_name` found in `start` or any of its ancestors.
pub fn find_descriptor(start: &Path, file_name: &str) -> Result<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(file_name);
        trace!(candidate = %candidate.display(), "probing for descriptor");
        if candidate.is_file() {
            debug!(descriptor = %candidate.display(), "found descriptor");
            return Ok(candidate);
        }
    }
    Err(anyhow!(
        "no {file_name} found in {} or any parent directory",
        start.display()
    ))
}
