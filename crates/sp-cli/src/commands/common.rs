//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sp_core::{Config, CoreError, CycleDecider, CycleStrategy, FirstEdge, SeedPlan};
use sp_engine::{EngineError, RunReport, StepReport, StepStatus};
use sp_org::{OrgError, SnapshotOrg};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::{BreakCycles, GlobalArgs};
use crate::prompt::PromptDecider;

/// Exit status for an invalid plan or a failed validation
pub(crate) const EXIT_INVALID: i32 = 1;

/// Exit status when the org rejected a whole request
pub(crate) const EXIT_TRANSPORT: i32 = 4;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that snapshots and reports are still flushed on the way out.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: the command has already printed what went wrong
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load seedplan.yml from `--config`, or from the project directory if present
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    match &global.config {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path)),
        None => Config::load_or_default(Path::new(&global.project_dir))
            .context("Failed to load seedplan.yml"),
    }
}

/// `--seed` wins over the config file
pub(crate) fn rng_seed(global: &GlobalArgs, config: &Config) -> Option<u64> {
    global.seed.or(config.seed)
}

/// Decider for the effective cycle strategy
pub(crate) fn cycle_decider(flag: Option<BreakCycles>, config: &Config) -> Box<dyn CycleDecider> {
    match flag.map(CycleStrategy::from).unwrap_or(config.break_cycles) {
        CycleStrategy::First => Box::new(FirstEdge),
        CycleStrategy::Prompt => Box::new(PromptDecider::new()),
    }
}

pub(crate) fn open_org(path: &str) -> Result<SnapshotOrg> {
    SnapshotOrg::from_path(Path::new(path))
        .with_context(|| format!("Failed to load org snapshot {}", path))
}

pub(crate) fn save_org(org: &SnapshotOrg, path: &str) -> Result<()> {
    org.save(Path::new(path))
        .with_context(|| format!("Failed to write org snapshot {}", path))
}

/// Load a seeding plan, printing every structural problem it has
pub(crate) fn load_seed_plan(path: &str) -> Result<SeedPlan> {
    SeedPlan::load(Path::new(path)).map_err(core_failure)
}

/// Report a plan or graph error and turn it into exit status 1
pub(crate) fn core_failure(err: CoreError) -> anyhow::Error {
    println!("✗ {}", err);
    if let CoreError::InvalidPlan { issues } = &err {
        for issue in issues {
            println!("    {}", issue);
        }
    }
    ExitCode(EXIT_INVALID).into()
}

/// Map an engine error onto the CLI's exit statuses
pub(crate) fn engine_failure(err: EngineError) -> anyhow::Error {
    match err {
        EngineError::Core(e) => core_failure(e),
        EngineError::StepFailed {
            source: OrgError::SObjectNotFound(_),
            ..
        } => {
            println!("✗ {}", err);
            ExitCode(EXIT_INVALID).into()
        }
        EngineError::StepFailed { .. } | EngineError::Org(_) => {
            println!("✗ {}", err);
            ExitCode(EXIT_TRANSPORT).into()
        }
        other => anyhow::Error::new(other),
    }
}

/// Progress bar over steps; hidden with `--verbose` so log lines stay readable
pub(crate) fn progress_bar(len: usize, verbose: bool) -> ProgressBar {
    if verbose {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// One summary line per step, followed by its record failures
pub(crate) fn print_step(step: &StepReport) {
    match &step.status {
        StepStatus::Skipped => println!("  - {} (skipped)", step.sobject),
        StepStatus::Aborted(error) => println!("  ✗ {} - {}", step.sobject, error),
        StepStatus::Completed if step.failed() == 0 => {
            println!(
                "  ✓ {} ({}/{} records)",
                step.sobject, step.succeeded, step.requested
            );
        }
        StepStatus::Completed => {
            println!(
                "  ✗ {} ({}/{} records, {} failed)",
                step.sobject,
                step.succeeded,
                step.requested,
                step.failed()
            );
            for failure in &step.failures {
                let errors = failure.errors.join("; ");
                match &failure.source_id {
                    Some(id) => println!("      record {} ({}): {}", failure.index + 1, id, errors),
                    None => println!("      record {}: {}", failure.index + 1, errors),
                }
            }
        }
    }
    for skipped in &step.skipped_fields {
        println!("      skipped {} ({})", skipped.field, skipped.reason);
    }
}

pub(crate) fn print_totals(report: &RunReport) {
    println!();
    println!(
        "Created {} records: {} failed, {} warnings, {} aborted step(s)",
        report.total_succeeded(),
        report.total_failed(),
        report.total_warnings(),
        report.aborted_steps().count()
    );
}

/// `--report` wins over `report_path` in the config file
pub(crate) fn report_path(
    flag: Option<&str>,
    config: &Config,
    global: &GlobalArgs,
) -> Option<PathBuf> {
    match flag {
        Some(path) => Some(PathBuf::from(path)),
        None => config.report_path_absolute(Path::new(&global.project_dir)),
    }
}

pub(crate) fn write_report(report: &RunReport, path: Option<PathBuf>) -> Result<()> {
    if let Some(path) = path {
        report
            .write(&path)
            .with_context(|| format!("Failed to write run report {}", path.display()))?;
        println!("Run report written to {}", path.display());
    }
    Ok(())
}
