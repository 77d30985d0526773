//! Generate command implementation

use anyhow::{Context, Result};
use sp_core::{SObjectName, SeedPlan};
use sp_engine::generate_plan;
use std::path::Path;

use crate::cli::{GenerateArgs, GlobalArgs};
use crate::commands::common::{self, ExitCode, EXIT_INVALID};

/// Execute the generate command
pub async fn execute(args: &GenerateArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let org = common::open_org(&args.org)?;

    let sobjects: Vec<SObjectName> = args
        .sobjects
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(SObjectName::new)
        .collect();
    if sobjects.is_empty() {
        println!("✗ No object types given");
        return Err(ExitCode(EXIT_INVALID).into());
    }

    let mut decider = common::cycle_decider(args.break_cycles, &config);
    let prepared = generate_plan(&org, &sobjects, args.count, decider.as_mut())
        .await
        .map_err(common::engine_failure)?;

    let plan = SeedPlan {
        steps: prepared.steps,
    };

    match &args.output {
        Some(path) => {
            plan.write(Path::new(path))
                .with_context(|| format!("Failed to write plan {}", path))?;
            for edge in &prepared.removed_edges {
                println!("  - dropped {} to break a reference cycle", edge);
            }
            println!("✓ Wrote {} step(s) to {}", plan.steps.len(), path);
        }
        None => {
            for edge in &prepared.removed_edges {
                log::warn!("Dropped {} to break a reference cycle", edge);
            }
            println!("{}", plan.to_json_pretty()?);
        }
    }

    Ok(())
}
