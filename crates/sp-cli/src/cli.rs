//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use sp_core::{CycleStrategy, UnmappedReferencePolicy};

/// Seedplan - seed test data into an org and migrate records between orgs
#[derive(Parser, Debug)]
#[command(name = "sp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding seedplan.yml; relative report paths resolve here
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Seed for synthetic data, overriding the config file
    #[arg(long, global = true, env = "SEEDPLAN_SEED")]
    pub seed: Option<u64>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a starter seeding plan from an org's schema
    Generate(GenerateArgs),

    /// Check a seeding plan against an org's schema
    Validate(ValidateArgs),

    /// Create the records a seeding plan describes
    Seed(SeedArgs),

    /// Copy records between orgs, remapping references
    Migrate(MigrateArgs),
}

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Object types to include (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub sobjects: Vec<String>,

    /// Org snapshot to read describes from
    #[arg(long)]
    pub org: String,

    /// Records per step
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: u32,

    /// Write the plan to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// How to break reference cycles (overrides config)
    #[arg(long, value_enum)]
    pub break_cycles: Option<BreakCycles>,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Seeding plan file
    #[arg(long)]
    pub plan: String,

    /// Org snapshot the plan targets
    #[arg(long)]
    pub org: String,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the seed command
#[derive(Args, Debug)]
pub struct SeedArgs {
    /// Seeding plan file
    #[arg(long)]
    pub plan: String,

    /// Org snapshot to seed
    #[arg(long)]
    pub org: String,

    /// Write the seeded snapshot here instead of updating --org in place
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write a JSON run report to this path (overrides config)
    #[arg(long)]
    pub report: Option<String>,

    /// How to break reference cycles (overrides config)
    #[arg(long, value_enum)]
    pub break_cycles: Option<BreakCycles>,

    /// Seed without checking the plan against the org's schema first
    #[arg(long)]
    pub skip_validation: bool,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Migration plan file
    #[arg(long)]
    pub plan: String,

    /// Org snapshot to read records from
    #[arg(long)]
    pub source: String,

    /// Org snapshot to write records into
    #[arg(long)]
    pub target: String,

    /// Write the migrated target snapshot here instead of updating --target in place
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write a JSON run report to this path (overrides config)
    #[arg(long)]
    pub report: Option<String>,

    /// What to do with references whose target was not migrated (overrides config)
    #[arg(long, value_enum)]
    pub unmapped_references: Option<UnmappedReferences>,
}

/// Cycle breaking strategies
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakCycles {
    /// Ask which field to drop
    Prompt,
    /// Drop the first candidate field
    First,
}

impl From<BreakCycles> for CycleStrategy {
    fn from(value: BreakCycles) -> Self {
        match value {
            BreakCycles::Prompt => CycleStrategy::Prompt,
            BreakCycles::First => CycleStrategy::First,
        }
    }
}

/// Unmapped reference handling
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmappedReferences {
    /// Keep the source id
    PassThrough,
    /// Clear the field
    NullOut,
    /// Fail the record
    Reject,
}

impl From<UnmappedReferences> for UnmappedReferencePolicy {
    fn from(value: UnmappedReferences) -> Self {
        match value {
            UnmappedReferences::PassThrough => UnmappedReferencePolicy::PassThrough,
            UnmappedReferences::NullOut => UnmappedReferencePolicy::NullOut,
            UnmappedReferences::Reject => UnmappedReferencePolicy::Reject,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
