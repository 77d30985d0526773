//! Seeding and migration plan representation
//!
//! A seeding plan is a JSON array of steps, each describing how many records
//! of one object type to create and which (possibly symbolic) value every
//! field receives. A migration plan is a JSON object listing the object
//! types to copy from a source org into a target org, in order.

use crate::error::{CoreError, CoreResult};
use crate::sobject_name::SObjectName;
use crate::token::{parse_reference, ReferenceToken};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// One execution unit of a seeding plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedingStep {
    /// Object type to create records for
    pub sobject: SObjectName,

    /// Number of records to build
    pub count: u32,

    /// Retain created records for later steps
    #[serde(default)]
    pub save_refs: bool,

    /// Field name -> literal or symbolic value
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl SeedingStep {
    pub fn new(sobject: impl Into<SObjectName>, count: u32) -> Self {
        Self {
            sobject: sobject.into(),
            count,
            save_refs: false,
            fields: Map::new(),
        }
    }

    /// Builder-style field assignment, mostly for tests and plan generation
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Fields whose value is a reference token, with the parsed token
    pub fn reference_fields(&self) -> impl Iterator<Item = (&str, ReferenceToken<'_>)> {
        self.fields.iter().filter_map(|(name, value)| {
            value
                .as_str()
                .and_then(parse_reference)
                .map(|token| (name.as_str(), token))
        })
    }

    /// Validate one raw JSON entry, collecting every structural problem.
    fn from_value(index: usize, entry: Value) -> Result<Self, Vec<StepIssue>> {
        let Value::Object(mut obj) = entry else {
            return Err(vec![StepIssue::new(index, None, "step must be a JSON object")]);
        };

        let sobject = obj
            .get("sobject")
            .and_then(Value::as_str)
            .and_then(SObjectName::try_new);
        let label = sobject.as_ref().map(|s| s.to_string());
        let mut issues = Vec::new();

        if sobject.is_none() {
            issues.push(StepIssue::new(
                index,
                None,
                "missing required field 'sobject'",
            ));
        }

        let count = match obj.get("count") {
            None => {
                issues.push(StepIssue::new(
                    index,
                    label.clone(),
                    "missing required field 'count'",
                ));
                None
            }
            Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) => Some(n),
                None => {
                    issues.push(StepIssue::new(
                        index,
                        label.clone(),
                        format!("'count' must be a non-negative integer, found {v}"),
                    ));
                    None
                }
            },
        };

        let save_refs = match obj.get("saveRefs") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                issues.push(StepIssue::new(
                    index,
                    label.clone(),
                    format!("'saveRefs' must be a boolean, found {other}"),
                ));
                false
            }
        };

        let fields = match obj.remove("fields") {
            Some(Value::Object(fields)) => {
                for (name, value) in &fields {
                    if value.is_array() || value.is_object() {
                        issues.push(StepIssue::new(
                            index,
                            label.clone(),
                            format!("field '{name}' must be a string, number, boolean or null"),
                        ));
                    }
                }
                fields
            }
            Some(_) => {
                issues.push(StepIssue::new(
                    index,
                    label.clone(),
                    "'fields' must be a JSON object",
                ));
                Map::new()
            }
            None => {
                issues.push(StepIssue::new(
                    index,
                    label.clone(),
                    "missing required field 'fields'",
                ));
                Map::new()
            }
        };

        match (sobject, count) {
            (Some(sobject), Some(count)) if issues.is_empty() => Ok(Self {
                sobject,
                count,
                save_refs,
                fields,
            }),
            _ => Err(issues),
        }
    }
}

/// A structural problem found in one plan entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepIssue {
    /// Zero-based position of the entry in the plan
    pub index: usize,
    /// Object type, when the entry declared one
    pub sobject: Option<String>,
    pub message: String,
}

impl StepIssue {
    fn new(index: usize, sobject: Option<String>, message: impl Into<String>) -> Self {
        Self {
            index,
            sobject,
            message: message.into(),
        }
    }
}

impl fmt::Display for StepIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sobject {
            Some(sobject) => write!(f, "step #{} ({}): {}", self.index + 1, sobject, self.message),
            None => write!(f, "step #{}: {}", self.index + 1, self.message),
        }
    }
}

/// A parsed seeding plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedPlan {
    pub steps: Vec<SeedingStep>,
}

impl SeedPlan {
    /// Parse a seeding plan, checking every step before failing.
    ///
    /// All structural problems are reported together in
    /// [`CoreError::InvalidPlan`] so the author can fix them in one pass.
    pub fn parse(content: &str) -> CoreResult<Self> {
        let raw: Value = serde_json::from_str(content).map_err(|e| CoreError::PlanParseError {
            message: e.to_string(),
        })?;
        let Value::Array(entries) = raw else {
            return Err(CoreError::PlanParseError {
                message: "a seeding plan must be a JSON array of steps".to_string(),
            });
        };

        let mut steps = Vec::with_capacity(entries.len());
        let mut issues = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            match SeedingStep::from_value(index, entry) {
                Ok(step) => steps.push(step),
                Err(mut step_issues) => issues.append(&mut step_issues),
            }
        }

        if issues.is_empty() {
            Ok(Self { steps })
        } else {
            Err(CoreError::InvalidPlan { issues })
        }
    }

    /// Load a seeding plan from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Render the plan in its on-disk JSON form
    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.steps)?)
    }

    pub fn write(&self, path: &Path) -> CoreResult<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

/// How migrated records are written to the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    #[default]
    Insert,
    Upsert,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => write!(f, "Insert"),
            Operation::Upsert => write!(f, "Upsert"),
        }
    }
}

/// One object type entry of a migration plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationObject {
    pub sobject: SObjectName,

    /// Source query; defaults to every field of the object type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(default)]
    pub operation: Operation,

    /// External id field used to match records on upsert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// A parsed migration plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub objects: Vec<MigrationObject>,
}

impl MigrationPlan {
    pub fn parse(content: &str) -> CoreResult<Self> {
        let plan: MigrationPlan =
            serde_json::from_str(content).map_err(|e| CoreError::PlanParseError {
                message: e.to_string(),
            })?;

        let mut issues = Vec::new();
        for (index, obj) in plan.objects.iter().enumerate() {
            if obj.sobject.trim().is_empty() {
                issues.push(StepIssue::new(index, None, "missing required field 'sobject'"));
                continue;
            }
            let missing_external_id = obj
                .external_id
                .as_deref()
                .map_or(true, |f| f.trim().is_empty());
            if obj.operation == Operation::Upsert && missing_external_id {
                issues.push(StepIssue::new(
                    index,
                    Some(obj.sobject.to_string()),
                    "operation 'Upsert' requires 'externalId'",
                ));
            }
        }

        if issues.is_empty() {
            Ok(plan)
        } else {
            Err(CoreError::InvalidPlan { issues })
        }
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content)
    }
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
