//! Topological ordering of seeding steps

use crate::cycles::{resolve_cycles, CycleDecider};
use crate::error::{CoreError, CoreResult};
use crate::graph::{ReferenceEdge, ReferenceGraph};
use crate::plan::SeedingStep;
use crate::sobject_name::SObjectName;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Temporary,
    Permanent,
}

/// Depth-first visitor over the dependency map
struct Visitor<'g> {
    graph: &'g ReferenceGraph,
    marks: HashMap<&'g SObjectName, Mark>,
    path: Vec<&'g SObjectName>,
    order: Vec<&'g SObjectName>,
}

impl<'g> Visitor<'g> {
    fn new(graph: &'g ReferenceGraph) -> Self {
        Self {
            graph,
            marks: HashMap::new(),
            path: Vec::new(),
            order: Vec::new(),
        }
    }

    fn visit(&mut self, node: &'g SObjectName) -> CoreResult<()> {
        match self.marks.get(node) {
            Some(Mark::Permanent) => return Ok(()),
            Some(Mark::Temporary) => {
                let start = self.path.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle: Vec<&str> = self.path[start..].iter().map(|n| n.as_str()).collect();
                cycle.push(node.as_str());
                return Err(CoreError::CircularDependency {
                    cycle: cycle.join(" -> "),
                });
            }
            None => {}
        }

        self.marks.insert(node, Mark::Temporary);
        self.path.push(node);
        if let Some(fields) = self.graph.dependencies(node) {
            for target in fields.values().flatten() {
                self.visit(target)?;
            }
        }
        self.path.pop();
        self.marks.insert(node, Mark::Permanent);
        self.order.push(node);
        Ok(())
    }
}

/// Reorder steps so every referenced object type runs before its dependents.
///
/// Object types without any edge are not reached by the traversal and keep
/// their original plan order after the ordered ones. Each returned step
/// carries `save_refs = true` exactly when another object type still
/// references it.
pub fn sequence(steps: Vec<SeedingStep>, graph: &ReferenceGraph) -> CoreResult<Vec<SeedingStep>> {
    let mut visitor = Visitor::new(graph);
    for source in graph.sources() {
        visitor.visit(source)?;
    }
    log::debug!(
        "Dependency order: {}",
        visitor
            .order
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut slots: Vec<Option<SeedingStep>> = steps.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());
    for name in &visitor.order {
        for slot in slots.iter_mut() {
            if matches!(slot, Some(step) if step.sobject == **name) {
                ordered.extend(slot.take());
            }
        }
    }
    ordered.extend(slots.into_iter().flatten());

    for step in &mut ordered {
        step.save_refs = graph.is_referenced(&step.sobject);
    }
    Ok(ordered)
}

/// Steps ready for execution plus the edges dropped to get there
#[derive(Debug, Clone)]
pub struct PreparedPlan {
    pub steps: Vec<SeedingStep>,
    pub removed_edges: Vec<ReferenceEdge>,
}

/// Build the reference graph, break pairwise cycles, reject any remaining
/// cycle, and sequence the steps.
pub fn prepare_steps(
    mut steps: Vec<SeedingStep>,
    decider: &mut dyn CycleDecider,
) -> CoreResult<PreparedPlan> {
    let mut graph = ReferenceGraph::build(&steps);
    let removed_edges = resolve_cycles(&mut steps, &mut graph, decider)?;
    graph.check_acyclic()?;
    let steps = sequence(steps, &graph)?;
    Ok(PreparedPlan {
        steps,
        removed_edges,
    })
}

#[cfg(test)]
#[path = "sequencer_test.rs"]
mod tests;
