//! Org trait definitions

use crate::describe::SObjectDescribe;
use crate::error::OrgResult;
use crate::record::{QueryResult, Record, SaveResult};
use async_trait::async_trait;

/// Schema description service
#[async_trait]
pub trait OrgSchema: Send + Sync {
    /// Describe one object type: fields, their metadata, and the key prefix
    async fn describe(&self, sobject: &str) -> OrgResult<SObjectDescribe>;
}

/// Query service
#[async_trait]
pub trait OrgQuery: Send + Sync {
    /// Run a select query; every returned record carries its `Id`
    async fn query(&self, soql: &str) -> OrgResult<QueryResult>;
}

/// Bulk data service
#[async_trait]
pub trait OrgBulk: Send + Sync {
    /// Insert records, returning one result per input record in order
    async fn insert(&self, sobject: &str, records: Vec<Record>) -> OrgResult<Vec<SaveResult>>;

    /// Insert or update records matched on `external_id_field`
    async fn upsert(
        &self,
        sobject: &str,
        external_id_field: &str,
        records: Vec<Record>,
    ) -> OrgResult<Vec<SaveResult>>;
}

/// A complete org: schema, query and bulk services.
///
/// Implementations must be Send + Sync for async operation.
pub trait Org: OrgSchema + OrgQuery + OrgBulk {
    /// Org name for logging
    fn org_name(&self) -> &str;
}
