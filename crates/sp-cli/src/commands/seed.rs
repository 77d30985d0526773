//! Seed command implementation

use anyhow::Result;
use sp_core::prepare_steps;
use sp_engine::{validate_plan, RunKind, RunReport, Seeder};
use sp_org::Org;

use crate::cli::{GlobalArgs, SeedArgs};
use crate::commands::common::{self, ExitCode, EXIT_INVALID, EXIT_TRANSPORT};

/// Execute the seed command.
///
/// Steps run strictly in sequence. A transport failure stops the run,
/// but the snapshot and report are still written so the records created
/// so far are not lost.
pub async fn execute(args: &SeedArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let plan = common::load_seed_plan(&args.plan)?;
    let org = common::open_org(&args.org)?;

    if !args.skip_validation {
        let validation = validate_plan(&org, &plan)
            .await
            .map_err(common::engine_failure)?;
        for issue in &validation.issues {
            println!("{}", issue);
        }
        if !validation.is_valid() {
            println!(
                "\n✗ Plan does not match {}: {} errors, {} warnings",
                org.org_name(),
                validation.error_count(),
                validation.warning_count()
            );
            return Err(ExitCode(EXIT_INVALID).into());
        }
    }

    let mut decider = common::cycle_decider(args.break_cycles, &config);
    let prepared = prepare_steps(plan.steps, decider.as_mut()).map_err(common::core_failure)?;
    for edge in &prepared.removed_edges {
        println!("  - dropped {} to break a reference cycle", edge);
    }

    println!(
        "Seeding {} step(s) into {}...\n",
        prepared.steps.len(),
        org.org_name()
    );

    let mut seeder = Seeder::seeded(&org, common::rng_seed(global, &config));
    let mut report = RunReport::new(RunKind::Seed);

    let pb = common::progress_bar(prepared.steps.len(), global.verbose);
    let outcome = seeder
        .run_into(&prepared.steps, &mut report, |step| {
            pb.set_message(step.sobject.clone());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();
    report.finish();

    for step in &report.steps {
        common::print_step(step);
    }
    common::print_totals(&report);

    common::write_report(
        &report,
        common::report_path(args.report.as_deref(), &config, global),
    )?;
    let output = args.output.as_deref().unwrap_or(&args.org);
    common::save_org(&org, output)?;

    if let Err(e) = outcome {
        println!("\n✗ Seeding stopped: {}", e);
        return Err(ExitCode(EXIT_TRANSPORT).into());
    }
    Ok(())
}
