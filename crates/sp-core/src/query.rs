//! Minimal `SELECT <fields> FROM <sobject> ...` query handling
//!
//! Only the field list and the object type are interpreted; anything after
//! the object type (`WHERE`, `ORDER BY`, `LIMIT`, ...) is carried through
//! verbatim when the query is rebuilt.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static SELECT_RE: OnceLock<Regex> = OnceLock::new();

fn select_re() -> &'static Regex {
    SELECT_RE.get_or_init(|| {
        Regex::new(r"(?is)^\s*select\s+(.+?)\s+from\s+([A-Za-z_][A-Za-z0-9_]*)(.*)$")
            .expect("valid regex")
    })
}

/// A parsed select query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub fields: Vec<String>,
    pub sobject: String,
    /// Everything after the object type, including its leading whitespace
    pub tail: String,
}

impl SelectQuery {
    pub fn parse(query: &str) -> CoreResult<Self> {
        let caps = select_re()
            .captures(query)
            .ok_or_else(|| CoreError::QueryParseError {
                query: query.to_string(),
                reason: "expected SELECT <fields> FROM <object>".to_string(),
            })?;

        let fields: Vec<String> = caps[1]
            .split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            return Err(CoreError::QueryParseError {
                query: query.to_string(),
                reason: "empty field list".to_string(),
            });
        }

        Ok(Self {
            fields,
            sobject: caps[2].to_string(),
            tail: caps[3].trim_end().to_string(),
        })
    }

    /// Query selecting the given fields with no further clauses
    pub fn all_fields(sobject: &str, fields: impl IntoIterator<Item = String>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            sobject: sobject.to_string(),
            tail: String::new(),
        }
    }

    /// Same query with a different field list
    pub fn with_fields(&self, fields: Vec<String>) -> Self {
        Self {
            fields,
            sobject: self.sobject.clone(),
            tail: self.tail.clone(),
        }
    }

    /// Whether the field list uses the `FIELDS(ALL)` shorthand
    pub fn selects_all(&self) -> bool {
        self.fields
            .iter()
            .any(|f| f.replace(' ', "").eq_ignore_ascii_case("fields(all)"))
    }

    /// Value of a trailing `LIMIT n` clause, if any
    pub fn limit(&self) -> Option<usize> {
        let mut words = self.tail.split_whitespace().rev();
        let value = words.next()?;
        let keyword = words.next()?;
        if keyword.eq_ignore_ascii_case("limit") {
            value.parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SELECT {} FROM {}{}",
            self.fields.join(", "),
            self.sobject,
            self.tail
        )
    }
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
