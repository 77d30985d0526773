//! Object type ("sobject") names such as `Account` or `Invoice__c`

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Name of an object type as written in a plan or a describe.
///
/// Case is preserved and comparisons are exact. Serializes as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SObjectName(String);

impl SObjectName {
    /// For names known to be non-empty. Plan input goes through [`Self::try_new`].
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        debug_assert!(!s.is_empty(), "SObjectName must not be empty");
        Self(s)
    }

    /// `None` for an empty or all-whitespace name
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for SObjectName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SObjectName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SObjectName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SObjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for SObjectName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SObjectName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
