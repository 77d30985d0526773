//! Migrate command implementation

use anyhow::Result;
use sp_core::MigrationPlan;
use sp_engine::Migrator;
use sp_org::Org;
use std::path::Path;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{self, ExitCode, EXIT_TRANSPORT};

/// Execute the migrate command.
///
/// Objects run in plan order. An object the source or target rejects as
/// a whole is reported as aborted and the run moves on, so later objects
/// still get their chance; the exit status reports the abort.
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let config = common::load_config(global)?;
    let plan = MigrationPlan::load(Path::new(&args.plan)).map_err(common::core_failure)?;
    let source = common::open_org(&args.source)?;
    let target = common::open_org(&args.target)?;

    let policy = args
        .unmapped_references
        .map(Into::into)
        .unwrap_or(config.unmapped_references);

    println!(
        "Migrating {} object type(s) from {} to {} (unmapped references: {})...\n",
        plan.objects.len(),
        source.org_name(),
        target.org_name(),
        policy
    );

    let mut migrator = Migrator::new(&source, &target).with_policy(policy);

    let pb = common::progress_bar(plan.objects.len(), global.verbose);
    let report = migrator
        .run_with(&plan, |step| {
            pb.set_message(step.sobject.clone());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    for step in &report.steps {
        if let Some(query) = &step.query {
            log::info!("{}: {}", step.sobject, query);
        }
        common::print_step(step);
    }
    common::print_totals(&report);
    println!("Mapped {} record id(s)", migrator.ids().len());

    common::write_report(
        &report,
        common::report_path(args.report.as_deref(), &config, global),
    )?;
    let output = args.output.as_deref().unwrap_or(&args.target);
    common::save_org(&target, output)?;

    if report.aborted_steps().next().is_some() {
        return Err(ExitCode(EXIT_TRANSPORT).into());
    }
    Ok(())
}
