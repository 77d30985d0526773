//! Pairwise cycle detection and resolution
//!
//! Detection is pure. Choosing which edge to drop is delegated to a
//! [`CycleDecider`], which the CLI backs with an interactive prompt.

use crate::error::{CoreError, CoreResult};
use crate::graph::{ReferenceEdge, ReferenceGraph};
use crate::plan::SeedingStep;
use crate::sobject_name::SObjectName;
use crate::token::parse_reference;
use std::collections::BTreeMap;

/// Edges forming a two-way cycle between one unordered pair of object types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleGroup {
    /// The pair, smaller name first. Both names are equal for a self-reference.
    pub pair: (SObjectName, SObjectName),

    /// Candidate edges, ordered by source then field
    pub edges: Vec<ReferenceEdge>,
}

impl CycleGroup {
    pub fn label(&self) -> String {
        format!("{} <-> {}", self.pair.0, self.pair.1)
    }

    /// Human-readable choices, one per candidate edge
    pub fn choices(&self) -> Vec<String> {
        self.edges
            .iter()
            .map(|e| format!("Remove {}.{} (references {})", e.source, e.field, e.target))
            .collect()
    }
}

/// Decides which edge of a cycle group to remove
pub trait CycleDecider {
    /// Return the index into `group.edges` of the edge to drop
    fn choose(&mut self, group: &CycleGroup) -> CoreResult<usize>;
}

/// Always drops the first candidate edge. Used for non-interactive runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstEdge;

impl CycleDecider for FirstEdge {
    fn choose(&mut self, _group: &CycleGroup) -> CoreResult<usize> {
        Ok(0)
    }
}

impl<F> CycleDecider for F
where
    F: FnMut(&CycleGroup) -> CoreResult<usize>,
{
    fn choose(&mut self, group: &CycleGroup) -> CoreResult<usize> {
        self(group)
    }
}

impl ReferenceGraph {
    /// Group every edge `A -> B` for which `B -> A` also exists.
    ///
    /// Each unordered pair is reported once with both directions together.
    /// Cycles through three or more object types are not found here; see
    /// [`ReferenceGraph::check_acyclic`].
    pub fn find_cycle_groups(&self) -> Vec<CycleGroup> {
        let mut groups: BTreeMap<(SObjectName, SObjectName), Vec<ReferenceEdge>> = BTreeMap::new();

        for edge in self.edges() {
            let points_back = self
                .dependencies(&edge.target)
                .is_some_and(|fields| fields.values().any(|t| t.contains(&edge.source)));
            if !points_back {
                continue;
            }

            let key = if edge.source <= edge.target {
                (edge.source.clone(), edge.target.clone())
            } else {
                (edge.target.clone(), edge.source.clone())
            };
            groups.entry(key).or_default().push(edge);
        }

        groups
            .into_iter()
            .map(|(pair, mut edges)| {
                edges.sort();
                CycleGroup { pair, edges }
            })
            .collect()
    }
}

/// Break every pairwise cycle by deleting one reference field per group.
///
/// The chosen field is removed from every step of the source object type
/// whose value references the target, and the edge is removed from the
/// graph. Returns the removed edges in resolution order.
pub fn resolve_cycles(
    steps: &mut [SeedingStep],
    graph: &mut ReferenceGraph,
    decider: &mut dyn CycleDecider,
) -> CoreResult<Vec<ReferenceEdge>> {
    let mut removed = Vec::new();

    for group in graph.find_cycle_groups() {
        let choice = decider.choose(&group)?;
        let edge = group
            .edges
            .get(choice)
            .cloned()
            .ok_or_else(|| CoreError::InvalidCycleChoice {
                pair: group.label(),
                choice,
                available: group.edges.len(),
            })?;

        for step in steps.iter_mut().filter(|s| s.sobject == edge.source) {
            let references_target = step
                .fields
                .get(&edge.field)
                .and_then(|v| v.as_str())
                .and_then(parse_reference)
                .is_some_and(|token| edge.target == token.sobject);
            if references_target {
                step.fields.remove(&edge.field);
            }
        }

        graph.remove_edge(&edge);
        log::info!(
            "Removed {} to break the {} cycle; populate it after seeding",
            edge,
            group.label()
        );
        removed.push(edge);
    }

    Ok(removed)
}

#[cfg(test)]
#[path = "cycles_test.rs"]
mod tests;
