//! Snapshot-backed org
//!
//! A `SnapshotOrg` keeps describes and records in memory. It is loaded from
//! a JSON or YAML snapshot file and can be written back out, which lets
//! seeding and migration run end to end without a live platform.

use crate::describe::{FieldType, SObjectDescribe};
use crate::error::{OrgError, OrgResult};
use crate::record::{QueryResult, Record, SaveResult, ATTRIBUTES_KEY};
use crate::traits::{Org, OrgBulk, OrgQuery, OrgSchema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sp_core::SelectQuery;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// On-disk form of an org
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub sobjects: Vec<SObjectDescribe>,

    /// Object type -> records, each carrying its `Id`
    #[serde(default)]
    pub records: BTreeMap<String, Vec<Record>>,
}

impl Snapshot {
    /// Load a snapshot; `.yml`/`.yaml` files are read as YAML, anything else as JSON
    pub fn load(path: &Path) -> OrgResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| OrgError::SnapshotError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let parsed: Result<Self, String> = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| OrgError::SnapshotError {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn save(&self, path: &Path) -> OrgResult<()> {
        let content = if is_yaml(path) {
            serde_yaml::to_string(self).map_err(|e| OrgError::ExecutionError(e.to_string()))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| OrgError::ExecutionError(e.to_string()))?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "yml" || e == "yaml")
}

struct OrgState {
    describes: BTreeMap<String, SObjectDescribe>,
    records: BTreeMap<String, Vec<Record>>,
    next_id: u64,
}

impl OrgState {
    fn describe(&self, sobject: &str) -> OrgResult<&SObjectDescribe> {
        self.describes
            .get(sobject)
            .ok_or_else(|| OrgError::SObjectNotFound(sobject.to_string()))
    }

    fn new_id(&mut self, prefix: &str) -> String {
        let id = format!("{}{:012}", prefix, self.next_id);
        self.next_id += 1;
        id
    }

    fn record_exists(&self, sobject: &str, id: &str) -> bool {
        self.records
            .get(sobject)
            .is_some_and(|records| records.iter().any(|r| record_id(r) == Some(id)))
    }

    /// Platform-style validation of one record's fields
    fn check_record(&self, describe: &SObjectDescribe, record: &Record, creating: bool) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, value) in record {
            if name == ATTRIBUTES_KEY {
                continue;
            }
            let Some(field) = describe.field(name) else {
                errors.push(format!(
                    "INVALID_FIELD: No such column '{}' on entity '{}'",
                    name, describe.name
                ));
                continue;
            };

            let writable = if creating {
                field.createable
            } else {
                field.updateable
            };
            if !writable {
                errors.push(format!(
                    "INVALID_FIELD_FOR_INSERT_UPDATE: Unable to create/update fields: {}",
                    field.name
                ));
                continue;
            }

            if value.is_null() {
                continue;
            }
            match field.field_type {
                FieldType::Boolean if !value.is_boolean() => errors.push(format!(
                    "INVALID_TYPE_ON_FIELD_IN_RECORD: {}: value not of required type: {}",
                    field.name, value
                )),
                FieldType::Reference => {
                    let valid = value.as_str().is_some_and(|id| {
                        field.reference_to.iter().any(|target| {
                            self.describes
                                .get(target)
                                .is_some_and(|d| d.owns_id(id))
                                && self.record_exists(target, id)
                        })
                    });
                    if !valid {
                        errors.push(format!(
                            "INVALID_CROSS_REFERENCE_KEY: invalid cross reference id: {}",
                            value
                        ));
                    }
                }
                _ => {}
            }
        }

        if creating {
            let missing: Vec<&str> = describe
                .required_fields()
                .filter(|f| {
                    record
                        .iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(&f.name))
                        .map_or(true, |(_, v)| v.is_null())
                })
                .map(|f| f.name.as_str())
                .collect();
            if !missing.is_empty() {
                errors.push(format!(
                    "REQUIRED_FIELD_MISSING: Required fields are missing: [{}]",
                    missing.join(", ")
                ));
            }
        }

        errors
    }

    /// Store a new record, returning its id
    fn create(&mut self, describe: &SObjectDescribe, record: Record) -> OrgResult<String> {
        let prefix = describe.key_prefix.as_deref().ok_or_else(|| {
            OrgError::ExecutionError(format!("{} has no key prefix", describe.name))
        })?;
        let id = self.new_id(prefix);

        let mut stored = canonical(describe, record);
        stored.insert("Id".to_string(), Value::String(id.clone()));
        self.records
            .entry(describe.name.clone())
            .or_default()
            .push(stored);
        Ok(id)
    }
}

fn record_id(record: &Record) -> Option<&str> {
    record.get("Id").and_then(Value::as_str)
}

/// Re-key a record's fields with the describe's field names
fn canonical(describe: &SObjectDescribe, record: Record) -> Record {
    record
        .into_iter()
        .filter(|(name, _)| name != ATTRIBUTES_KEY)
        .map(|(name, value)| match describe.field(&name) {
            Some(field) => (field.name.clone(), value),
            None => (name, value),
        })
        .collect()
}

/// Highest numeric id suffix in use, so new ids never collide
fn max_id_sequence(records: &BTreeMap<String, Vec<Record>>) -> u64 {
    records
        .values()
        .flatten()
        .filter_map(record_id)
        .filter_map(|id| id.get(3..15).and_then(|n| n.parse::<u64>().ok()))
        .max()
        .unwrap_or(0)
}

/// In-memory org backed by a [`Snapshot`]
pub struct SnapshotOrg {
    name: String,
    state: Mutex<OrgState>,
}

impl SnapshotOrg {
    pub fn new(name: impl Into<String>, snapshot: Snapshot) -> Self {
        let next_id = max_id_sequence(&snapshot.records) + 1;
        let describes = snapshot
            .sobjects
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();
        Self {
            name: name.into(),
            state: Mutex::new(OrgState {
                describes,
                records: snapshot.records,
                next_id,
            }),
        }
    }

    /// An org with a schema and no records
    pub fn with_describes(name: impl Into<String>, describes: Vec<SObjectDescribe>) -> Self {
        Self::new(
            name,
            Snapshot {
                sobjects: describes,
                records: BTreeMap::new(),
            },
        )
    }

    /// Load an org from a snapshot file, named after the file stem
    pub fn from_path(path: &Path) -> OrgResult<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("snapshot")
            .to_string();
        Ok(Self::new(name, Snapshot::load(path)?))
    }

    fn lock(&self) -> OrgResult<MutexGuard<'_, OrgState>> {
        self.state
            .lock()
            .map_err(|e| OrgError::MutexPoisoned(e.to_string()))
    }

    /// Current records of one object type
    pub fn records(&self, sobject: &str) -> OrgResult<Vec<Record>> {
        Ok(self.lock()?.records.get(sobject).cloned().unwrap_or_default())
    }

    /// Copy the org's current schema and records
    pub fn to_snapshot(&self) -> OrgResult<Snapshot> {
        let state = self.lock()?;
        Ok(Snapshot {
            sobjects: state.describes.values().cloned().collect(),
            records: state.records.clone(),
        })
    }

    pub fn save(&self, path: &Path) -> OrgResult<()> {
        self.to_snapshot()?.save(path)
    }
}

impl std::fmt::Debug for SnapshotOrg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotOrg")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl OrgSchema for SnapshotOrg {
    async fn describe(&self, sobject: &str) -> OrgResult<SObjectDescribe> {
        log::debug!("[{}] describe {}", self.name, sobject);
        Ok(self.lock()?.describe(sobject)?.clone())
    }
}

#[async_trait]
impl OrgQuery for SnapshotOrg {
    async fn query(&self, soql: &str) -> OrgResult<QueryResult> {
        log::debug!("[{}] query {}", self.name, soql);
        let query = SelectQuery::parse(soql).map_err(|e| OrgError::QueryError(e.to_string()))?;
        let state = self.lock()?;
        let describe = state.describe(&query.sobject)?;

        let tail_ok = query.tail.trim().is_empty() || query.limit().is_some();
        if !tail_ok {
            return Err(OrgError::QueryError(format!(
                "unsupported clause '{}'",
                query.tail.trim()
            )));
        }

        let fields: Vec<String> = if query.selects_all() {
            describe.field_names().map(str::to_string).collect()
        } else {
            query
                .fields
                .iter()
                .map(|name| {
                    describe
                        .field(name)
                        .map(|f| f.name.clone())
                        .ok_or_else(|| {
                            OrgError::QueryError(format!(
                                "No such column '{}' on entity '{}'",
                                name, describe.name
                            ))
                        })
                })
                .collect::<OrgResult<_>>()?
        };

        let stored = state
            .records
            .get(&describe.name)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let limit = query.limit().unwrap_or(usize::MAX);
        let records: Vec<Record> = stored
            .iter()
            .take(limit)
            .map(|source| {
                let mut record = Record::new();
                record.insert(ATTRIBUTES_KEY.to_string(), json!({ "type": describe.name }));
                record.insert(
                    "Id".to_string(),
                    source.get("Id").cloned().unwrap_or(Value::Null),
                );
                for field in &fields {
                    record.insert(
                        field.clone(),
                        source.get(field).cloned().unwrap_or(Value::Null),
                    );
                }
                record
            })
            .collect();

        Ok(QueryResult {
            total_size: records.len(),
            records,
        })
    }
}

#[async_trait]
impl OrgBulk for SnapshotOrg {
    async fn insert(&self, sobject: &str, records: Vec<Record>) -> OrgResult<Vec<SaveResult>> {
        log::debug!("[{}] insert {} {} record(s)", self.name, records.len(), sobject);
        let mut state = self.lock()?;
        let describe = state.describe(sobject)?.clone();

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let errors = state.check_record(&describe, &record, true);
            if errors.is_empty() {
                let id = state.create(&describe, record)?;
                results.push(SaveResult::ok(id));
            } else {
                results.push(SaveResult::failed(errors));
            }
        }
        Ok(results)
    }

    async fn upsert(
        &self,
        sobject: &str,
        external_id_field: &str,
        records: Vec<Record>,
    ) -> OrgResult<Vec<SaveResult>> {
        log::debug!(
            "[{}] upsert {} {} record(s) on {}",
            self.name,
            records.len(),
            sobject,
            external_id_field
        );
        let mut state = self.lock()?;
        let describe = state.describe(sobject)?.clone();
        let key_field = describe
            .field(external_id_field)
            .filter(|f| f.external_id)
            .map(|f| f.name.clone())
            .ok_or_else(|| {
                OrgError::ExecutionError(format!(
                    "{}.{} is not an external id field",
                    sobject, external_id_field
                ))
            })?;

        let mut results = Vec::with_capacity(records.len());
        for record in records {
            let record = canonical(&describe, record);
            let key = match record.get(&key_field) {
                Some(v) if !v.is_null() => v.clone(),
                _ => {
                    results.push(SaveResult::failed(vec![format!(
                        "MISSING_ARGUMENT: {} not specified",
                        key_field
                    )]));
                    continue;
                }
            };

            let existing = state.records.get(&describe.name).and_then(|stored| {
                stored
                    .iter()
                    .position(|r| r.get(&key_field) == Some(&key))
            });

            match existing {
                Some(position) => {
                    let errors = state.check_record(&describe, &record, false);
                    if !errors.is_empty() {
                        results.push(SaveResult::failed(errors));
                        continue;
                    }
                    let Some(target) = state
                        .records
                        .get_mut(&describe.name)
                        .and_then(|stored| stored.get_mut(position))
                    else {
                        continue;
                    };
                    let id = record_id(target).unwrap_or_default().to_string();
                    target.extend(record);
                    results.push(SaveResult::ok(id));
                }
                None => {
                    let errors = state.check_record(&describe, &record, true);
                    if errors.is_empty() {
                        let id = state.create(&describe, record)?;
                        results.push(SaveResult::ok(id));
                    } else {
                        results.push(SaveResult::failed(errors));
                    }
                }
            }
        }
        Ok(results)
    }
}

impl Org for SnapshotOrg {
    fn org_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
