//! Object type and field metadata returned by the schema service

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field type tag as reported by describe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Boolean,
    #[serde(rename = "int", alias = "integer")]
    Integer,
    Double,
    Currency,
    Date,
    Datetime,
    Reference,
    String,
    /// Any other describe type (id, picklist, textarea, email, ...)
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::Boolean => "boolean",
            FieldType::Integer => "int",
            FieldType::Double => "double",
            FieldType::Currency => "currency",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::Reference => "reference",
            FieldType::String => "string",
            FieldType::Other => "other",
        };
        f.write_str(s)
    }
}

fn default_true() -> bool {
    true
}

/// Metadata for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescribe {
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default = "default_true")]
    pub nillable: bool,

    #[serde(default = "default_true")]
    pub createable: bool,

    #[serde(default = "default_true")]
    pub updateable: bool,

    /// Formula or roll-up field
    #[serde(default)]
    pub calculated: bool,

    #[serde(default)]
    pub custom: bool,

    /// The org supplies a value when none is given on create
    #[serde(default)]
    pub defaulted_on_create: bool,

    #[serde(default)]
    pub external_id: bool,

    /// Object types a reference field may point at
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_to: Vec<String>,
}

impl FieldDescribe {
    /// An optional, writable field of the given type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nillable: true,
            createable: true,
            updateable: true,
            calculated: false,
            custom: false,
            defaulted_on_create: false,
            external_id: false,
            reference_to: Vec::new(),
        }
    }

    /// The system `Id` field
    pub fn id() -> Self {
        Self {
            nillable: false,
            createable: false,
            updateable: false,
            defaulted_on_create: true,
            ..Self::new("Id", FieldType::Other)
        }
    }

    /// A reference field pointing at one or more object types
    pub fn reference(name: impl Into<String>, targets: &[&str]) -> Self {
        Self {
            reference_to: targets.iter().map(|t| t.to_string()).collect(),
            ..Self::new(name, FieldType::Reference)
        }
    }

    pub fn required(mut self) -> Self {
        self.nillable = false;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.createable = false;
        self.updateable = false;
        self
    }

    /// Createable but not updateable after insert
    pub fn create_only(mut self) -> Self {
        self.updateable = false;
        self
    }

    pub fn formula(mut self) -> Self {
        self.calculated = true;
        self.createable = false;
        self.updateable = false;
        self
    }

    pub fn custom(mut self) -> Self {
        self.custom = true;
        self
    }

    pub fn external_id(mut self) -> Self {
        self.external_id = true;
        self
    }

    pub fn is_reference(&self) -> bool {
        self.field_type == FieldType::Reference && !self.reference_to.is_empty()
    }

    /// Must be given a value on create
    pub fn is_required_on_create(&self) -> bool {
        self.createable
            && !self.nillable
            && !self.defaulted_on_create
            && self.field_type != FieldType::Boolean
    }
}

/// Metadata for one object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SObjectDescribe {
    pub name: String,

    /// 3-character prefix of every record id of this type
    #[serde(default)]
    pub key_prefix: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldDescribe>,
}

impl SObjectDescribe {
    /// A describe with only the `Id` field
    pub fn new(name: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_prefix: Some(key_prefix.into()),
            fields: vec![FieldDescribe::id()],
        }
    }

    pub fn with_field(mut self, field: FieldDescribe) -> Self {
        self.fields.push(field);
        self
    }

    /// Field lookup, case-insensitive like the platform
    pub fn field(&self, name: &str) -> Option<&FieldDescribe> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDescribe> {
        self.fields.iter().filter(|f| f.is_reference())
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescribe> {
        self.fields.iter().filter(|f| f.is_required_on_create())
    }

    /// Whether a record id carries this object type's key prefix
    pub fn owns_id(&self, id: &str) -> bool {
        match (&self.key_prefix, id.get(..3)) {
            (Some(prefix), Some(id_prefix)) => prefix == id_prefix,
            _ => false,
        }
    }
}
