//! Seeding execution driver
//!
//! Walks sequenced steps in order, builds each step's records through the
//! token expander, bulk-creates them, and keeps the successes of referenced
//! object types for later steps.

use crate::error::{EngineError, EngineResult};
use crate::report::{RecordFailure, RunKind, RunReport, StepReport};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sp_core::{CreatedRecord, ReferenceTable, SeedingStep, TokenExpander};
use sp_org::{Org, Record, SaveResult};

/// Executes a seeding plan against one org
pub struct Seeder<'a> {
    org: &'a dyn Org,
    expander: TokenExpander,
    table: ReferenceTable,
    rng: Box<dyn RngCore + Send>,
}

impl<'a> Seeder<'a> {
    pub fn new(org: &'a dyn Org, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            org,
            expander: TokenExpander::default(),
            table: ReferenceTable::new(),
            rng,
        }
    }

    /// Seeder with a ChaCha random source; a fixed seed makes runs repeatable
    pub fn seeded(org: &'a dyn Org, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };
        Self::new(org, Box::new(rng))
    }

    pub fn with_expander(mut self, expander: TokenExpander) -> Self {
        self.expander = expander;
        self
    }

    /// Records retained so far
    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Build the records for one step. Warnings are logged and returned.
    pub fn build_records(&mut self, step: &SeedingStep) -> (Vec<Record>, Vec<String>) {
        let mut records = Vec::with_capacity(step.count as usize);
        let mut warnings = Vec::new();

        for index in 0..step.count as usize {
            let mut record = Record::new();
            for (field, value) in &step.fields {
                let expansion = self
                    .expander
                    .expand(value, index, &self.table, self.rng.as_mut());
                if let Some(warning) = expansion.warning {
                    let message = format!(
                        "{}.{} (record {}): {}",
                        step.sobject,
                        field,
                        index + 1,
                        warning
                    );
                    log::warn!("{}", message);
                    warnings.push(message);
                }
                record.insert(field.clone(), expansion.value);
            }
            records.push(record);
        }

        (records, warnings)
    }

    /// Execute one step.
    ///
    /// Per-record failures are reported, not returned as errors. An org
    /// error for the request as a whole is returned as `StepFailed`.
    pub async fn execute_step(&mut self, step: &SeedingStep) -> EngineResult<StepReport> {
        if step.count == 0 {
            log::info!("Skipping {}: record count is 0", step.sobject);
            return Ok(StepReport::skipped(step.sobject.as_str()));
        }

        let (records, warnings) = self.build_records(step);
        log::info!("Creating {} {} record(s)", records.len(), step.sobject);

        let results = self
            .org
            .insert(step.sobject.as_str(), records.clone())
            .await
            .map_err(|source| EngineError::step(step.sobject.as_str(), source))?;

        let mut report = StepReport::new(step.sobject.as_str());
        report.requested = records.len();
        report.warnings = warnings;

        let mut created = Vec::new();
        let mut results = results.into_iter();
        for (index, record) in records.into_iter().enumerate() {
            let result = results
                .next()
                .unwrap_or_else(|| SaveResult::failed(vec!["no result returned".to_string()]));
            match result.created_id().map(str::to_string) {
                Some(id) => {
                    report.succeeded += 1;
                    if step.save_refs {
                        created.push(CreatedRecord::new(id, record));
                    }
                }
                None => {
                    log::warn!(
                        "{} record {} failed: {}",
                        step.sobject,
                        index + 1,
                        result.errors.join("; ")
                    );
                    report.failures.push(RecordFailure {
                        index,
                        source_id: None,
                        errors: result.errors,
                    });
                }
            }
        }

        if step.save_refs {
            log::debug!("Retaining {} {} record(s)", created.len(), step.sobject);
            self.table.retain(&step.sobject, created);
        }

        Ok(report)
    }

    /// Execute sequenced steps in order, stopping at the first transport error
    pub async fn run(&mut self, steps: &[SeedingStep]) -> EngineResult<RunReport> {
        let mut report = RunReport::new(RunKind::Seed);
        self.run_into(steps, &mut report, |_| {}).await?;
        report.finish();
        Ok(report)
    }

    /// Execute steps into a caller-owned report, calling `on_step` after each.
    ///
    /// On a transport error the failing step is pushed as aborted before the
    /// error is returned, so `report` still describes everything created.
    pub async fn run_into<F>(
        &mut self,
        steps: &[SeedingStep],
        report: &mut RunReport,
        mut on_step: F,
    ) -> EngineResult<()>
    where
        F: FnMut(&StepReport),
    {
        for step in steps {
            match self.execute_step(step).await {
                Ok(step_report) => {
                    on_step(&step_report);
                    report.push(step_report);
                }
                Err(e) => {
                    let aborted = StepReport::aborted(step.sobject.as_str(), e.to_string());
                    on_step(&aborted);
                    report.push(aborted);
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "seeder_test.rs"]
mod tests;
