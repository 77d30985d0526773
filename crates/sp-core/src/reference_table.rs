//! Records retained during a seeding run for later reference tokens

use crate::sobject_name::SObjectName;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A successfully created record kept for later steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedRecord {
    /// Identifier assigned by the org
    pub id: String,

    /// Field values that were submitted for the record
    pub fields: Map<String, Value>,
}

impl CreatedRecord {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Look up a field of the created record. `Id` maps to the assigned id.
    pub fn field(&self, name: &str) -> Option<Value> {
        if name.eq_ignore_ascii_case("id") {
            Some(Value::String(self.id.clone()))
        } else {
            self.fields.get(name).cloned()
        }
    }
}

/// Retained successes grouped by object type.
///
/// Filled only as steps complete, so a reference to an object type that has
/// not run yet simply finds nothing.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    records: HashMap<SObjectName, Vec<CreatedRecord>>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append created records under an object type
    pub fn retain(&mut self, sobject: &SObjectName, records: Vec<CreatedRecord>) {
        self.records
            .entry(sobject.clone())
            .or_default()
            .extend(records);
    }

    /// Retained records for an object type (empty when none)
    pub fn get(&self, sobject: &str) -> &[CreatedRecord] {
        self.records.get(sobject).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, sobject: &str) -> bool {
        !self.get(sobject).is_empty()
    }

    /// Total retained records across all object types
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_appends_per_sobject() {
        let mut table = ReferenceTable::new();
        let account = SObjectName::new("Account");
        table.retain(&account, vec![CreatedRecord::new("001A", Map::new())]);
        table.retain(&account, vec![CreatedRecord::new("001B", Map::new())]);

        assert_eq!(table.get("Account").len(), 2);
        assert!(table.get("Contact").is_empty());
        assert!(!table.contains("Contact"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_created_record_field_lookup() {
        let mut fields = Map::new();
        fields.insert("Name".into(), Value::from("Acme"));
        let record = CreatedRecord::new("001A", fields);

        assert_eq!(record.field("Id"), Some(Value::from("001A")));
        assert_eq!(record.field("Name"), Some(Value::from("Acme")));
        assert_eq!(record.field("Phone"), None);
    }
}
