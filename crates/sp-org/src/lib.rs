//! sp-org - Org abstraction layer for Seedplan
//!
//! This crate provides the schema, query and bulk traits the engine talks
//! to, the describe metadata types, and `SnapshotOrg`, an in-memory org
//! loaded from and saved to a snapshot file.

pub mod describe;
pub mod error;
pub mod record;
pub mod snapshot;
pub mod traits;

pub use describe::{FieldDescribe, FieldType, SObjectDescribe};
pub use error::{OrgError, OrgResult};
pub use record::{QueryResult, Record, SaveResult, ATTRIBUTES_KEY};
pub use snapshot::{Snapshot, SnapshotOrg};
pub use traits::{Org, OrgBulk, OrgQuery, OrgSchema};
