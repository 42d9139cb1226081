//! Workspace launcher CLI.
//!
//! Finds the nearest workspace descriptor (default `workspace.json`) above the
//! start directory, resolves its placeholders, and lists, prints or runs
//! targets.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use launcher::exit_codes;
use launcher::io::discover::{DEFAULT_DESCRIPTOR_NAME, find_descriptor};
use launcher::logging;
use launcher::run::{exit_code_for, run_target};
use launcher::workspace::Workspace;

#[derive(Parser)]
#[command(
    name = "launcher",
    version,
    about = "Resolve a workspace descriptor and run its targets"
)]
struct Cli {
    /// Directory to start the descriptor search from (defaults to cwd).
    #[arg(long, global = true)]
    start: Option<PathBuf>,

    /// Descriptor file name to look for.
    #[arg(long, global = true, default_value = DEFAULT_DESCRIPTOR_NAME)]
    descriptor: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the descriptor with every placeholder resolved.
    Resolve,
    /// Print target names, one per line.
    Targets,
    /// Resolve and execute a target, exiting with its exit code.
    Run {
        /// Target name under `targets` in the descriptor.
        target: String,
    },
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let start = match cli.start {
        Some(dir) => dir,
        None => std::env::current_dir().context("read current directory")?,
    };
    let start = start
        .canonicalize()
        .with_context(|| format!("canonicalize {}", start.display()))?;
    let descriptor = find_descriptor(&start, &cli.descriptor)?;
    let workspace = Workspace::load(&descriptor).await?;

    match cli.command {
        Command::Resolve => cmd_resolve(&workspace),
        Command::Targets => cmd_targets(&workspace),
        Command::Run { target } => cmd_run(&workspace, &target).await,
    }
}

fn cmd_resolve(workspace: &Workspace) -> Result<i32> {
    let payload =
        serde_json::to_string_pretty(&workspace.resolved).context("serialize descriptor")?;
    println!("{payload}");
    Ok(exit_codes::OK)
}

fn cmd_targets(workspace: &Workspace) -> Result<i32> {
    for name in workspace.target_names() {
        println!("{name}");
    }
    Ok(exit_codes::OK)
}

async fn cmd_run(workspace: &Workspace, target: &str) -> Result<i32> {
    let spec = workspace.resolve_target(target)?;
    let limit = workspace.config.output_limit_bytes;
    let output = tokio::task::spawn_blocking(move || run_target(&spec, limit))
        .await
        .context("join target runner")??;

    std::io::stdout()
        .write_all(&output.stdout)
        .context("write target stdout")?;
    std::io::stderr()
        .write_all(&output.stderr)
        .context("write target stderr")?;
    if let Some(notice) = output.truncated_notice(target) {
        eprintln!("{notice}");
    }
    if output.timed_out {
        eprintln!("target {target} timed out");
    }
    Ok(exit_code_for(&output))
}
