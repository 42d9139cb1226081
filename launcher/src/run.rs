//! Executing a resolved target.

use std::process::Command;

use anyhow::Result;
use tracing::info;

use crate::core::target::RunSpec;
use crate::exit_codes;
use crate::io::process::{CommandOutput, run_command_with_timeout};

/// Spawn the target described by `spec` and wait for it.
pub fn run_target(spec: &RunSpec, output_limit_bytes: usize) -> Result<CommandOutput> {
    info!(target_name = %spec.name, program = %spec.program, "running target");
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args).current_dir(&spec.cwd).envs(&spec.env);
    run_command_with_timeout(cmd, spec.timeout, output_limit_bytes)
}

/// Exit code the launcher should report for a finished target.
pub fn exit_code_for(output: &CommandOutput) -> i32 {
    if output.timed_out {
        return exit_codes::TARGET_FAILED;
    }
    output.status.code().unwrap_or(exit_codes::TARGET_FAILED)
}
