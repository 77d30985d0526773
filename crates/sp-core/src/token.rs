//! Token syntax and the per-field token expander
//!
//! Three bracketed markers are recognised inside plan field values:
//!
//! * `{{path.to.generator}}` - synthetic data expression (whole value)
//! * `#{counter}` - replaced by the 1-based record index, anywhere in the value
//! * `@{SObject.Field}` - a record created earlier in the run (whole value)

use crate::reference_table::ReferenceTable;
use crate::synthetic::SyntheticRegistry;
use rand::seq::IndexedRandom;
use rand::RngCore;
use serde_json::Value;
use std::fmt;

/// Counter marker, substituted textually
pub const COUNTER_TOKEN: &str = "#{counter}";

const SYNTHETIC_OPEN: &str = "{{";
const SYNTHETIC_CLOSE: &str = "}}";
const REFERENCE_OPEN: &str = "@{";
const REFERENCE_CLOSE: char = '}';

/// Field read from a referenced record when the token names none
pub const DEFAULT_REFERENCE_FIELD: &str = "Id";

/// A parsed `@{SObject.Field}` token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceToken<'a> {
    pub sobject: &'a str,
    pub field: &'a str,
}

/// Extract the dotted path of a synthetic expression, if the whole value is one
pub fn synthetic_path(value: &str) -> Option<&str> {
    let inner = value
        .trim()
        .strip_prefix(SYNTHETIC_OPEN)?
        .strip_suffix(SYNTHETIC_CLOSE)?
        .trim();
    (!inner.is_empty()).then_some(inner)
}

/// Parse a value that is entirely a reference token
pub fn parse_reference(value: &str) -> Option<ReferenceToken<'_>> {
    let inner = value
        .trim()
        .strip_prefix(REFERENCE_OPEN)?
        .strip_suffix(REFERENCE_CLOSE)?
        .trim();
    if inner.is_empty() || inner.contains(['{', '}']) {
        return None;
    }

    let (sobject, field) = match inner.split_once('.') {
        Some((sobject, field)) => (sobject.trim(), field.trim()),
        None => (inner, DEFAULT_REFERENCE_FIELD),
    };
    if sobject.is_empty() || field.is_empty() {
        return None;
    }
    Some(ReferenceToken { sobject, field })
}

/// Render a reference token for plan generation
pub fn reference_token(sobject: &str, field: &str) -> String {
    format!("{REFERENCE_OPEN}{sobject}.{field}{REFERENCE_CLOSE}")
}

/// Render a synthetic expression for plan generation
pub fn synthetic_expression(path: &str) -> String {
    format!("{SYNTHETIC_OPEN}{path}{SYNTHETIC_CLOSE}")
}

/// Replace every counter marker with `index + 1`
pub fn substitute_counter(value: &str, index: usize) -> String {
    if value.contains(COUNTER_TOKEN) {
        value.replace(COUNTER_TOKEN, &(index + 1).to_string())
    } else {
        value.to_string()
    }
}

/// Non-fatal problem met while expanding a field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// Synthetic expression walked into an undefined path segment
    UnknownSynthetic { path: String },
    /// Reference token names an object type with no retained records
    NoRetainedRecords { sobject: String },
    /// Referenced record does not carry the requested field
    MissingReferenceField { sobject: String, field: String },
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionWarning::UnknownSynthetic { path } => {
                write!(f, "unknown synthetic data path '{path}'")
            }
            ResolutionWarning::NoRetainedRecords { sobject } => {
                write!(f, "no retained {sobject} records to reference")
            }
            ResolutionWarning::MissingReferenceField { sobject, field } => {
                write!(f, "retained {sobject} records have no field '{field}'")
            }
        }
    }
}

/// Result of expanding one field value
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub value: Value,
    pub warning: Option<ResolutionWarning>,
}

impl Expansion {
    fn resolved(value: Value) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    fn unresolved(warning: ResolutionWarning) -> Self {
        Self {
            value: Value::Null,
            warning: Some(warning),
        }
    }
}

/// Turns symbolic field values into concrete values for one record
#[derive(Debug, Clone, Default)]
pub struct TokenExpander {
    registry: SyntheticRegistry,
}

impl TokenExpander {
    pub fn new(registry: SyntheticRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SyntheticRegistry {
        &self.registry
    }

    /// Expand one field value for the record at `index` (zero-based).
    ///
    /// Order is fixed: synthetic expression, counter substitution, reference
    /// token, literal. Non-string values are returned unchanged.
    pub fn expand(
        &self,
        value: &Value,
        index: usize,
        table: &ReferenceTable,
        rng: &mut dyn RngCore,
    ) -> Expansion {
        let Value::String(literal) = value else {
            return Expansion::resolved(value.clone());
        };

        let mut warning = None;
        if let Some(path) = synthetic_path(literal) {
            match self.registry.resolve(path, rng) {
                Some(resolved) => return Expansion::resolved(resolved),
                None => {
                    warning = Some(ResolutionWarning::UnknownSynthetic {
                        path: path.to_string(),
                    })
                }
            }
        }

        let substituted = substitute_counter(literal, index);
        if let Some(token) = parse_reference(&substituted) {
            return resolve_reference(token, table, rng);
        }

        Expansion {
            value: Value::String(substituted),
            warning,
        }
    }
}

/// Pick one retained record of the referenced type uniformly at random
fn resolve_reference(
    token: ReferenceToken<'_>,
    table: &ReferenceTable,
    rng: &mut dyn RngCore,
) -> Expansion {
    let Some(record) = table.get(token.sobject).choose(rng) else {
        return Expansion::unresolved(ResolutionWarning::NoRetainedRecords {
            sobject: token.sobject.to_string(),
        });
    };

    match record.field(token.field) {
        Some(value) => Expansion::resolved(value),
        None => Expansion::unresolved(ResolutionWarning::MissingReferenceField {
            sobject: token.sobject.to_string(),
            field: token.field.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
