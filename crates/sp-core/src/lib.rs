//! sp-core - Core library for Seedplan
//!
//! This crate provides the plan model, the token expander, the reference
//! graph with its cycle resolver, and the topological sequencer shared by
//! every Seedplan component.

pub mod config;
pub mod cycles;
pub mod error;
pub mod graph;
pub mod plan;
pub mod query;
pub mod reference_table;
pub mod sequencer;
pub mod sobject_name;
pub mod synthetic;
pub mod token;

pub use config::{Config, CycleStrategy, UnmappedReferencePolicy};
pub use cycles::{resolve_cycles, CycleDecider, CycleGroup, FirstEdge};
pub use error::{CoreError, CoreResult};
pub use graph::{ReferenceEdge, ReferenceGraph};
pub use plan::{MigrationObject, MigrationPlan, Operation, SeedPlan, SeedingStep, StepIssue};
pub use query::SelectQuery;
pub use reference_table::{CreatedRecord, ReferenceTable};
pub use sequencer::{prepare_steps, sequence, PreparedPlan};
pub use sobject_name::SObjectName;
pub use synthetic::SyntheticRegistry;
pub use token::{Expansion, ResolutionWarning, TokenExpander};
