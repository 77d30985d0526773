//! Cross-org migration
//!
//! Copies records of each listed object type from a source org into a target
//! org, in plan order. Record ids are not portable between orgs, so every
//! created record's old -> new id pair is remembered and reference fields of
//! later objects are rewritten through those tables. Polymorphic reference
//! values are attributed to an object type by their 3-character key prefix.

use crate::describe_cache::DescribeCache;
use crate::error::{EngineError, EngineResult};
use crate::id_map::IdMap;
use crate::report::{RecordFailure, RunKind, RunReport, SkippedField, StepReport};
use serde_json::Value;
use sp_core::{
    CoreError, MigrationObject, MigrationPlan, Operation, SelectQuery, UnmappedReferencePolicy,
};
use sp_org::{Org, OrgError, OrgResult, Record, SObjectDescribe, SaveResult, ATTRIBUTES_KEY};
use std::fmt;

/// Why a queried field is left out of a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Formula,
    NonEditableCustom,
    NonEditableStandard,
    MissingOnTarget,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Formula => "Formula field",
            SkipReason::NonEditableCustom => "Non-editable custom field",
            SkipReason::NonEditableStandard => "Non-editable standard field",
            SkipReason::MissingOnTarget => "Missing on target",
        };
        f.write_str(s)
    }
}

/// A query reduced to the fields the target org will accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedQuery {
    pub query: SelectQuery,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Drop every field the target cannot take.
///
/// `Id` is always removed without being reported; the source returns it
/// with every record regardless.
pub fn sanitize_query(query: &SelectQuery, target: &SObjectDescribe) -> SanitizedQuery {
    let mut kept = Vec::new();
    let mut skipped = Vec::new();

    for name in &query.fields {
        if name.eq_ignore_ascii_case("id") {
            continue;
        }
        let reason = match target.field(name) {
            None => Some(SkipReason::MissingOnTarget),
            Some(field) if field.calculated => Some(SkipReason::Formula),
            Some(field) if !field.updateable && field.custom => Some(SkipReason::NonEditableCustom),
            Some(field) if !field.updateable => Some(SkipReason::NonEditableStandard),
            Some(_) => None,
        };
        match reason {
            Some(reason) => skipped.push((name.clone(), reason)),
            None => kept.push(name.clone()),
        }
    }

    SanitizedQuery {
        query: query.with_fields(kept),
        skipped,
    }
}

/// Reference-typed field and the object types it may point at
struct ReferenceField {
    name: String,
    targets: Vec<String>,
}

/// Migrates records between two orgs
pub struct Migrator<'a> {
    source: &'a dyn Org,
    target: &'a dyn Org,
    policy: UnmappedReferencePolicy,
    source_describes: DescribeCache,
    target_describes: DescribeCache,
    ids: IdMap,
}

impl<'a> Migrator<'a> {
    pub fn new(source: &'a dyn Org, target: &'a dyn Org) -> Self {
        Self {
            source,
            target,
            policy: UnmappedReferencePolicy::default(),
            source_describes: DescribeCache::new(),
            target_describes: DescribeCache::new(),
            ids: IdMap::new(),
        }
    }

    pub fn with_policy(mut self, policy: UnmappedReferencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Old -> new id tables built so far
    pub fn ids(&self) -> &IdMap {
        &self.ids
    }

    /// Migrate every object in plan order.
    ///
    /// An object whose request fails as a whole is reported as aborted and
    /// the run moves on to the next object.
    pub async fn run(&mut self, plan: &MigrationPlan) -> RunReport {
        self.run_with(plan, |_| {}).await
    }

    /// [`Migrator::run`], calling `on_step` after each object
    pub async fn run_with<F>(&mut self, plan: &MigrationPlan, mut on_step: F) -> RunReport
    where
        F: FnMut(&StepReport),
    {
        let mut report = RunReport::new(RunKind::Migrate);
        for object in &plan.objects {
            let step = match self.migrate_object(object).await {
                Ok(step) => step,
                Err(e) => {
                    log::error!("Aborting {}: {}", object.sobject, e);
                    StepReport::aborted(object.sobject.as_str(), e.to_string())
                }
            };
            on_step(&step);
            report.push(step);
        }
        report.finish();
        report
    }

    /// Build the source query for one object, before sanitization
    async fn base_query(&mut self, object: &MigrationObject) -> EngineResult<SelectQuery> {
        let sobject = object.sobject.as_str();
        let describe = self
            .source_describes
            .get(self.source, sobject)
            .await
            .map_err(|e| EngineError::step(sobject, e))?;
        let all_fields = || describe.field_names().map(str::to_string).collect::<Vec<_>>();

        let query = match &object.query {
            Some(text) => SelectQuery::parse(text)?,
            None => SelectQuery::all_fields(sobject, all_fields()),
        };
        if query.sobject != sobject {
            return Err(CoreError::QueryParseError {
                query: query.to_string(),
                reason: format!("query reads {} but the object is {}", query.sobject, sobject),
            }
            .into());
        }
        Ok(if query.selects_all() {
            query.with_fields(all_fields())
        } else {
            query
        })
    }

    /// Migrate one object type
    pub async fn migrate_object(&mut self, object: &MigrationObject) -> EngineResult<StepReport> {
        let sobject = object.sobject.as_str();
        let step_err = |source: OrgError| EngineError::step(sobject, source);

        let query = self.base_query(object).await?;
        let source_describe = self
            .source_describes
            .get(self.source, sobject)
            .await
            .map_err(step_err)?;
        let target_describe = self
            .target_describes
            .get(self.target, sobject)
            .await
            .map_err(step_err)?;

        let sanitized = sanitize_query(&query, &target_describe);
        let mut report = StepReport::new(sobject);
        for (field, reason) in &sanitized.skipped {
            log::warn!("Skipping {}.{}: {}", sobject, field, reason);
            report.skipped_fields.push(SkippedField {
                field: field.clone(),
                reason: reason.to_string(),
            });
        }

        let references: Vec<ReferenceField> = sanitized
            .query
            .fields
            .iter()
            .filter_map(|name| source_describe.field(name))
            .filter(|field| field.is_reference())
            .map(|field| ReferenceField {
                name: field.name.clone(),
                targets: field.reference_to.clone(),
            })
            .collect();

        let soql = if sanitized.query.fields.is_empty() {
            sanitized.query.with_fields(vec!["Id".to_string()])
        } else {
            sanitized.query
        }
        .to_string();
        log::info!("Reading {} from {}: {}", sobject, self.source.org_name(), soql);
        report.query = Some(soql.clone());

        let result = self.source.query(&soql).await.map_err(step_err)?;
        report.requested = result.records.len();

        let mut batch = Vec::with_capacity(result.records.len());
        let mut submitted = Vec::with_capacity(result.records.len());
        for (index, mut record) in result.records.into_iter().enumerate() {
            record.remove(ATTRIBUTES_KEY);
            let old_id = take_id(&mut record);

            let rejected = self
                .remap_record(sobject, &mut record, &references, &mut report.warnings)
                .await
                .map_err(step_err)?;
            if rejected.is_empty() {
                batch.push(record);
                submitted.push((index, old_id));
            } else {
                report.failures.push(RecordFailure {
                    index,
                    source_id: old_id,
                    errors: rejected,
                });
            }
        }

        if batch.is_empty() {
            log::info!("No {} records to write", sobject);
            return Ok(report);
        }

        log::info!(
            "Writing {} {} record(s) to {}",
            batch.len(),
            sobject,
            self.target.org_name()
        );
        let results = self.submit(object, batch).await.map_err(step_err)?;

        let mut results = results.into_iter();
        for (index, old_id) in submitted {
            let result = results
                .next()
                .unwrap_or_else(|| SaveResult::failed(vec!["no result returned".to_string()]));
            match (result.created_id(), &old_id) {
                (Some(new_id), Some(old)) => {
                    self.ids.insert(sobject, old.clone(), new_id);
                    report.succeeded += 1;
                }
                (Some(_), None) => report.succeeded += 1,
                (None, _) => {
                    log::warn!(
                        "{} {} failed: {}",
                        sobject,
                        old_id.as_deref().unwrap_or("record"),
                        result.errors.join("; ")
                    );
                    report.failures.push(RecordFailure {
                        index,
                        source_id: old_id.clone(),
                        errors: result.errors.clone(),
                    });
                }
            }
        }
        report.failures.sort_by_key(|f| f.index);

        Ok(report)
    }

    async fn submit(
        &self,
        object: &MigrationObject,
        batch: Vec<Record>,
    ) -> OrgResult<Vec<SaveResult>> {
        let sobject = object.sobject.as_str();
        match object.operation {
            Operation::Insert => self.target.insert(sobject, batch).await,
            Operation::Upsert => {
                let external_id = object.external_id.as_deref().ok_or_else(|| {
                    OrgError::ExecutionError(format!("upsert of {} needs an externalId", sobject))
                })?;
                self.target.upsert(sobject, external_id, batch).await
            }
        }
    }

    /// Rewrite the reference fields of one record to target-org ids.
    ///
    /// Returns the reasons the record must not be submitted; empty when it
    /// can go ahead.
    async fn remap_record(
        &mut self,
        sobject: &str,
        record: &mut Record,
        references: &[ReferenceField],
        warnings: &mut Vec<String>,
    ) -> OrgResult<Vec<String>> {
        let mut rejected = Vec::new();

        for reference in references {
            let Some(old) = record
                .get(&reference.name)
                .and_then(Value::as_str)
                .map(str::to_string)
            else {
                continue;
            };

            let target_type = match reference.targets.as_slice() {
                [single] => Some(single.clone()),
                candidates => {
                    self.source_describes
                        .resolve_prefix(self.source, candidates, &old)
                        .await?
                }
            };
            let mapped = target_type
                .as_deref()
                .and_then(|t| self.ids.get(t, &old))
                .map(str::to_string);

            if let Some(new_id) = mapped {
                record.insert(reference.name.clone(), Value::String(new_id));
                continue;
            }

            let message = format!(
                "{}.{}: no migrated {} for {}",
                sobject,
                reference.name,
                target_type.as_deref().unwrap_or("record"),
                old
            );
            match self.policy {
                UnmappedReferencePolicy::PassThrough => {
                    log::warn!("{} (kept as is)", message);
                    warnings.push(message);
                }
                UnmappedReferencePolicy::NullOut => {
                    log::warn!("{} (set to null)", message);
                    record.insert(reference.name.clone(), Value::Null);
                    warnings.push(message);
                }
                UnmappedReferencePolicy::Reject => {
                    log::warn!("{} (record rejected)", message);
                    rejected.push(format!("unmapped reference {}", message));
                }
            }
        }

        Ok(rejected)
    }
}

/// Remove and return a record's `Id`
fn take_id(record: &mut Record) -> Option<String> {
    let key = record
        .keys()
        .find(|k| k.eq_ignore_ascii_case("id"))
        .cloned()?;
    match record.remove(&key) {
        Some(Value::String(id)) => Some(id),
        _ => None,
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
