//! Per-run cache of object describes and key prefixes for one org

use sp_org::{Org, OrgError, OrgResult, SObjectDescribe};
use std::collections::HashMap;
use std::sync::Arc;

/// Describes fetched from one org, plus the key-prefix table built from them.
///
/// Each object type is described at most once per run.
#[derive(Debug, Default)]
pub struct DescribeCache {
    describes: HashMap<String, Arc<SObjectDescribe>>,
    prefixes: HashMap<String, String>,
}

impl DescribeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe an object type, asking the org only on first use
    pub async fn get(&mut self, org: &dyn Org, sobject: &str) -> OrgResult<Arc<SObjectDescribe>> {
        if let Some(describe) = self.describes.get(sobject) {
            return Ok(Arc::clone(describe));
        }

        let describe = Arc::new(org.describe(sobject).await?);
        if let Some(prefix) = &describe.key_prefix {
            self.prefixes.insert(prefix.clone(), describe.name.clone());
        }
        self.describes.insert(sobject.to_string(), Arc::clone(&describe));
        Ok(describe)
    }

    /// Object type among `candidates` whose key prefix matches `id`.
    ///
    /// Candidates are described lazily and skipped when the org does not know
    /// them; `None` when no candidate owns the id.
    pub async fn resolve_prefix(
        &mut self,
        org: &dyn Org,
        candidates: &[String],
        id: &str,
    ) -> OrgResult<Option<String>> {
        let Some(prefix) = id.get(..3) else {
            return Ok(None);
        };

        for candidate in candidates {
            match self.get(org, candidate).await {
                Ok(_) => {}
                Err(OrgError::SObjectNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
            if self.prefixes.get(prefix) == Some(candidate) {
                return Ok(Some(candidate.clone()));
            }
        }
        Ok(None)
    }

    /// Object type owning a key prefix, among those described so far
    pub fn sobject_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.describes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.describes.is_empty()
    }
}
