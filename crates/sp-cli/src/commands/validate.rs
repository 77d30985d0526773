//! Validate command implementation

use anyhow::Result;
use sp_engine::validate_plan;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{self, ExitCode, EXIT_INVALID};

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, _global: &GlobalArgs) -> Result<()> {
    let plan = common::load_seed_plan(&args.plan)?;
    println!("✓ Plan parsed ({} steps)", plan.steps.len());

    let org = common::open_org(&args.org)?;
    let report = validate_plan(&org, &plan)
        .await
        .map_err(common::engine_failure)?;

    println!();
    for issue in &report.issues {
        println!("{}", issue);
    }

    let error_count = report.error_count();
    let warning_count = report.warning_count();

    if !report.issues.is_empty() {
        println!();
    }
    if error_count == 0 && (warning_count == 0 || !args.strict) {
        println!(
            "Validation passed: {} errors, {} warnings",
            error_count, warning_count
        );
        Ok(())
    } else {
        let mode = if args.strict && error_count == 0 {
            " (strict mode)"
        } else {
            ""
        };
        println!(
            "Validation failed{}: {} errors, {} warnings",
            mode, error_count, warning_count
        );
        Err(ExitCode(EXIT_INVALID).into())
    }
}
