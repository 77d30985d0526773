//! Seeding plan checks against an org's schema
//!
//! Every step is checked even after an error is found, so one pass reports
//! everything that would go wrong.

use crate::describe_cache::DescribeCache;
use crate::error::{EngineError, EngineResult};
use serde_json::Value;
use sp_core::token::{parse_reference, synthetic_path};
use sp_core::{ReferenceGraph, SeedPlan, SyntheticRegistry};
use sp_org::{FieldDescribe, Org, OrgError, SObjectDescribe};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single validation issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    /// `SObject` or `SObject.Field` the issue is about
    pub location: Option<String>,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(
                f,
                "[{}] {}: {} ({})",
                self.severity, self.code, self.message, location
            ),
            None => write!(f, "[{}] {}: {}", self.severity, self.code, self.message),
        }
    }
}

/// Issues found in one plan
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn error(
        &mut self,
        code: &'static str,
        message: impl Into<String>,
        location: Option<String>,
    ) {
        self.issues.push(ValidationIssue {
            severity: Severity::Error,
            code,
            message: message.into(),
            location,
        });
    }

    fn warning(
        &mut self,
        code: &'static str,
        message: impl Into<String>,
        location: Option<String>,
    ) {
        self.issues.push(ValidationIssue {
            severity: Severity::Warning,
            code,
            message: message.into(),
            location,
        });
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// No errors; warnings are allowed
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

/// Check a seeding plan against the org it will be seeded into
pub async fn validate_plan(org: &dyn Org, plan: &SeedPlan) -> EngineResult<ValidationReport> {
    let mut report = ValidationReport::default();
    let mut describes = DescribeCache::new();
    let registry = SyntheticRegistry::default();
    let planned: BTreeSet<&str> = plan.steps.iter().map(|s| s.sobject.as_str()).collect();

    check_graph(plan, &mut report);

    for step in &plan.steps {
        let sobject = step.sobject.as_str();
        let Some(describe) = describe_or_report(&mut describes, org, sobject, &mut report).await?
        else {
            continue;
        };

        for (name, value) in &step.fields {
            let location = Some(format!("{}.{}", sobject, name));
            let Some(field) = describe.field(name) else {
                report.error(
                    "V002",
                    format!("field '{}' does not exist on {}", name, sobject),
                    location,
                );
                continue;
            };
            if !field.createable {
                report.error(
                    "V003",
                    format!("field '{}' cannot be set on create", field.name),
                    location.clone(),
                );
            }

            let Value::String(text) = value else {
                continue;
            };
            if let Some(path) = synthetic_path(text) {
                if !registry.contains(path) {
                    report.warning(
                        "V006",
                        format!("unknown synthetic data path '{}'", path),
                        location,
                    );
                }
                continue;
            }
            if let Some(token) = parse_reference(text) {
                if !field.is_reference() {
                    report.error(
                        "V004",
                        format!("'{}' is not a reference field", field.name),
                        location,
                    );
                } else if !field.reference_to.iter().any(|t| t == token.sobject) {
                    report.error(
                        "V004",
                        format!(
                            "'{}' references {}, not {}",
                            field.name,
                            field.reference_to.join(" or "),
                            token.sobject
                        ),
                        location,
                    );
                } else if !planned.contains(token.sobject) {
                    report.warning(
                        "V008",
                        format!(
                            "no step creates {} records; the field will be null",
                            token.sobject
                        ),
                        location,
                    );
                }
                continue;
            }
            if field.is_reference() && looks_like_id(text) {
                check_static_id(&mut describes, org, field, text, location, &mut report).await?;
            }
        }

        let missing: Vec<&str> = describe
            .required_fields()
            .filter(|f| !step.fields.keys().any(|k| k.eq_ignore_ascii_case(&f.name)))
            .map(|f| f.name.as_str())
            .collect();
        if !missing.is_empty() {
            report.warning(
                "V007",
                format!("required field(s) not set: {}", missing.join(", ")),
                Some(sobject.to_string()),
            );
        }
    }

    Ok(report)
}

/// Pairwise cycles are broken at seed time; longer ones are fatal
fn check_graph(plan: &SeedPlan, report: &mut ValidationReport) {
    let graph = ReferenceGraph::build(&plan.steps);
    let mut pairwise_free = graph.clone();
    for group in graph.find_cycle_groups() {
        report.warning(
            "V009",
            format!(
                "reference cycle {}; one of its fields will be dropped",
                group.label()
            ),
            None,
        );
        for edge in &group.edges {
            pairwise_free.remove_edge(edge);
        }
    }
    if let Err(e) = pairwise_free.check_acyclic() {
        report.error("V010", e.to_string(), None);
    }
}

async fn describe_or_report(
    describes: &mut DescribeCache,
    org: &dyn Org,
    sobject: &str,
    report: &mut ValidationReport,
) -> EngineResult<Option<Arc<SObjectDescribe>>> {
    match describes.get(org, sobject).await {
        Ok(describe) => Ok(Some(describe)),
        Err(OrgError::SObjectNotFound(_)) => {
            report.error(
                "V001",
                format!("object type {} does not exist in {}", sobject, org.org_name()),
                Some(sobject.to_string()),
            );
            Ok(None)
        }
        Err(e) => Err(EngineError::step(sobject, e)),
    }
}

/// 15- or 18-character alphanumeric record id
fn looks_like_id(value: &str) -> bool {
    matches!(value.len(), 15 | 18) && value.chars().all(|c| c.is_ascii_alphanumeric())
}

async fn check_static_id(
    describes: &mut DescribeCache,
    org: &dyn Org,
    field: &FieldDescribe,
    id: &str,
    location: Option<String>,
    report: &mut ValidationReport,
) -> EngineResult<()> {
    let owner = describes
        .resolve_prefix(org, &field.reference_to, id)
        .await
        .map_err(|e| EngineError::step(field.name.as_str(), e))?;
    if owner.is_none() {
        report.error(
            "V005",
            format!(
                "id '{}' does not belong to {}",
                id,
                field.reference_to.join(" or ")
            ),
            location,
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
