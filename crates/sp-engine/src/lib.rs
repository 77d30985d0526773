//! sp-engine - Execution engine for Seedplan
//!
//! This crate drives seeding plans against an org, migrates records between
//! two orgs with id remapping, generates starter plans from describes, and
//! validates plans against an org's schema.

pub mod describe_cache;
pub mod error;
pub mod generator;
pub mod id_map;
pub mod migrator;
pub mod report;
pub mod seeder;
pub mod validator;

pub use describe_cache::DescribeCache;
pub use error::{EngineError, EngineResult};
pub use generator::{generate_plan, starter_step};
pub use id_map::IdMap;
pub use migrator::{sanitize_query, Migrator, SanitizedQuery, SkipReason};
pub use report::{RecordFailure, RunKind, RunReport, SkippedField, StepReport, StepStatus};
pub use seeder::Seeder;
pub use validator::{validate_plan, Severity, ValidationIssue, ValidationReport};
