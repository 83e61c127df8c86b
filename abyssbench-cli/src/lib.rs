#![warn(missing_docs)]
//! AbyssBench CLI Library
//!
//! This module provides the runner for benchmark binaries.
//! Use `abyssbench::run()` (or `abyssbench_cli::run()`) in your main function to list
//! and run every type registered with `#[benchmarks(register)]`.
//!
//! # Example
//!
//! ```ignore
//! use abyssbench::prelude::*;
//!
//! #[derive(Default)]
//! struct Workloads;
//!
//! #[benchmarks(register)]
//! impl Workloads {
//!     #[benchmark]
//!     pub fn fill(&self) -> Vec<u8> { vec![0; 4096] }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     abyssbench_cli::run()
//! }
//! ```

mod config;
mod planner;

pub use config::*;
pub use planner::*;

use abyssbench_core::{Harness, MemorySource, find_target, registered_targets};
use anyhow::Context;
use clap::{Parser, Subcommand};
use regex::Regex;
use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

/// AbyssBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "abyss")]
#[command(author, version, about = "AbyssBench - micro-benchmark harness")]
pub struct Cli {
    /// Optional subcommand (List, Run, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Only run operations whose name matches this regex
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Memory source: auto, allocator, resident
    #[arg(long, global = true)]
    pub memory: Option<MemorySource>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered targets and their operations
    List,
    /// Run registered targets (default)
    Run {
        /// Target type name; all targets when omitted
        target: Option<String>,
        /// Run a single operation by name (tagged or not)
        #[arg(long, short, requires = "target")]
        method: Option<String>,
    },
    /// Write a default abyss.toml to the current directory
    Init,
}

/// Settings after merging abyss.toml with CLI flags
#[derive(Debug)]
pub struct RunSettings {
    /// Memory source for the harness
    pub memory: MemorySource,
    /// Compiled operation filter
    pub filter: Option<Regex>,
    /// Report destination; stdout when `None`
    pub output: Option<PathBuf>,
}

impl RunSettings {
    /// Merge configuration and CLI flags; flags win.
    pub fn resolve(cli: &Cli, config: &AbyssConfig) -> anyhow::Result<Self> {
        let filter = cli
            .filter
            .as_deref()
            .or(config.runner.filter.as_deref())
            .map(Regex::new)
            .transpose()
            .context("Invalid filter regex")?;

        Ok(Self {
            memory: cli.memory.unwrap_or(config.runner.memory),
            filter,
            output: cli
                .output
                .clone()
                .or_else(|| config.output.path.as_ref().map(PathBuf::from)),
        })
    }
}

/// Run the AbyssBench CLI with the given arguments.
/// This is the main entry point for benchmark binaries.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the AbyssBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("abyssbench=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("abyssbench=info")
            .init();
    }

    // Discover abyss.toml configuration (CLI flags override)
    let config = AbyssConfig::discover()?.unwrap_or_default();
    let settings = RunSettings::resolve(&cli, &config)?;

    let report = match cli.command {
        Some(Commands::List) => list_targets(&settings)?,
        Some(Commands::Init) => return write_default_config(),
        Some(Commands::Run { target, method }) => {
            run_targets(&settings, target.as_deref(), method.as_deref())?
        }
        None => run_targets(&settings, None, None)?,
    };

    emit(&settings, &report)
}

fn list_targets(settings: &RunSettings) -> anyhow::Result<String> {
    let plan = build_plan(registered_targets(), None, settings.filter.as_ref())?;
    let mut out = String::new();

    for planned in &plan.targets {
        writeln!(
            out,
            "{} ({}:{})",
            planned.def.name, planned.def.file, planned.def.line
        )?;
        for op in &planned.operations {
            writeln!(out, "  {}", op.name)?;
        }
    }
    writeln!(
        out,
        "\n{} operations in {} targets",
        plan.operation_count(),
        plan.targets.len()
    )?;

    Ok(out)
}

fn run_targets(
    settings: &RunSettings,
    target: Option<&str>,
    method: Option<&str>,
) -> anyhow::Result<String> {
    let harness = Harness::new(settings.memory);
    tracing::debug!(memory = ?harness.memory_source(), "harness ready");
    if let Some(warning) = harness.memory_warning() {
        eprintln!(
            "Warning: {warning}.\n\
             Set TrackingAllocator as #[global_allocator] in your benchmark binary \
             or use --memory resident."
        );
    }

    if let (Some(target), Some(method)) = (target, method) {
        let def = find_target(target)?;
        tracing::info!(name = def.name, method, "running method");
        return Ok((def.run_method)(&harness, method)?);
    }

    let plan = build_plan(registered_targets(), target, settings.filter.as_ref())?;
    if plan.targets.is_empty() {
        tracing::warn!("no operations matched");
        return Ok(String::new());
    }

    let filter = settings.filter.as_ref();
    let keep = |name: &str| matches(filter, name);

    let mut out = String::new();
    for planned in &plan.targets {
        tracing::info!(
            name = planned.def.name,
            operations = planned.operations.len(),
            "running target"
        );
        writeln!(out, "# {}", planned.def.name)?;
        out.push_str(&(planned.def.run)(&harness, &keep)?);
    }

    Ok(out)
}

fn write_default_config() -> anyhow::Result<()> {
    let path = std::env::current_dir()?.join(CONFIG_FILE_NAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    std::fs::write(&path, AbyssConfig::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote default configuration");
    Ok(())
}

fn emit(settings: &RunSettings, report: &str) -> anyhow::Result<()> {
    match &settings.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
