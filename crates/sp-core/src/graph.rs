//! Reference graph between object types
//!
//! Edges are derived from reference tokens in step fields: a `Contact` step
//! with `AccountId: "@{Account.Id}"` yields the edge
//! `Contact.AccountId -> Account`.

use crate::error::{CoreError, CoreResult};
use crate::plan::SeedingStep;
use crate::sobject_name::SObjectName;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// One `source.field -> target` dependency
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReferenceEdge {
    pub source: SObjectName,
    pub field: String,
    pub target: SObjectName,
}

impl ReferenceEdge {
    pub fn new(
        source: impl Into<SObjectName>,
        field: impl Into<String>,
        target: impl Into<SObjectName>,
    ) -> Self {
        Self {
            source: source.into(),
            field: field.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for ReferenceEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} -> {}", self.source, self.field, self.target)
    }
}

/// Dependency and dependent lookups built from a set of seeding steps
#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    /// object type -> field -> referenced object types.
    /// Several steps of one type may use the same field for different targets.
    dependencies: BTreeMap<SObjectName, BTreeMap<String, BTreeSet<SObjectName>>>,

    /// referenced object type -> object types referencing it
    dependents: BTreeMap<SObjectName, BTreeSet<SObjectName>>,

    /// Object types with outgoing edges, in plan order
    sources: Vec<SObjectName>,
}

impl ReferenceGraph {
    /// Scan every step's fields for reference tokens. Steps are not mutated.
    pub fn build(steps: &[SeedingStep]) -> Self {
        let mut graph = Self::default();
        for step in steps {
            for (field, token) in step.reference_fields() {
                graph.add_edge(ReferenceEdge::new(
                    step.sobject.clone(),
                    field,
                    token.sobject,
                ));
            }
        }
        graph
    }

    fn add_edge(&mut self, edge: ReferenceEdge) {
        if !self.dependencies.contains_key(&edge.source) {
            self.sources.push(edge.source.clone());
        }
        self.dependents
            .entry(edge.target.clone())
            .or_default()
            .insert(edge.source.clone());
        self.dependencies
            .entry(edge.source)
            .or_default()
            .entry(edge.field)
            .or_default()
            .insert(edge.target);
    }

    /// Remove one edge from both lookups. Returns false if it was not present.
    pub fn remove_edge(&mut self, edge: &ReferenceEdge) -> bool {
        let Some(fields) = self.dependencies.get_mut(&edge.source) else {
            return false;
        };
        let Some(targets) = fields.get_mut(&edge.field) else {
            return false;
        };
        if !targets.remove(&edge.target) {
            return false;
        }
        if targets.is_empty() {
            fields.remove(&edge.field);
        }

        let still_referenced = fields.values().any(|t| t.contains(&edge.target));
        if fields.is_empty() {
            self.dependencies.remove(&edge.source);
            self.sources.retain(|s| *s != edge.source);
        }

        if !still_referenced {
            if let Some(dependents) = self.dependents.get_mut(&edge.target) {
                dependents.remove(&edge.source);
                if dependents.is_empty() {
                    self.dependents.remove(&edge.target);
                }
            }
        }
        true
    }

    /// Field -> targets map for an object type
    pub fn dependencies(
        &self,
        sobject: &str,
    ) -> Option<&BTreeMap<String, BTreeSet<SObjectName>>> {
        self.dependencies.get(sobject)
    }

    /// Object types that reference `sobject`
    pub fn dependents(&self, sobject: &str) -> Option<&BTreeSet<SObjectName>> {
        self.dependents.get(sobject)
    }

    /// Whether any surviving edge targets `sobject`
    pub fn is_referenced(&self, sobject: &str) -> bool {
        self.dependents.contains_key(sobject)
    }

    /// Object types with at least one outgoing edge, in plan order
    pub fn sources(&self) -> &[SObjectName] {
        &self.sources
    }

    pub fn edges(&self) -> Vec<ReferenceEdge> {
        self.dependencies
            .iter()
            .flat_map(|(source, fields)| {
                fields.iter().flat_map(move |(field, targets)| {
                    targets.iter().map(move |target| {
                        ReferenceEdge::new(source.clone(), field, target.clone())
                    })
                })
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.dependencies
            .values()
            .flat_map(BTreeMap::values)
            .map(BTreeSet::len)
            .sum()
    }

    /// Edges between two object types, in either direction
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<ReferenceEdge> {
        self.edges()
            .into_iter()
            .filter(|e| (e.source == a && e.target == b) || (e.source == b && e.target == a))
            .collect()
    }

    /// Reject any cycle that survived pairwise resolution.
    ///
    /// Uses strongly connected components, so cycles through three or more
    /// object types are reported with their members instead of surfacing
    /// later as a sequencing fault.
    pub fn check_acyclic(&self) -> CoreResult<()> {
        let mut graph: DiGraph<&SObjectName, ()> = DiGraph::new();
        let mut nodes: HashMap<&SObjectName, NodeIndex> = HashMap::new();

        for (source, fields) in &self.dependencies {
            let from = node_index(&mut graph, &mut nodes, source);
            for target in fields.values().flatten() {
                let to = node_index(&mut graph, &mut nodes, target);
                graph.update_edge(from, to, ());
            }
        }

        for component in tarjan_scc(&graph) {
            let cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&idx| graph.contains_edge(idx, idx));
            if cyclic {
                let mut members: Vec<&str> =
                    component.iter().map(|&idx| graph[idx].as_str()).collect();
                members.sort_unstable();
                if let Some(first) = members.first().copied() {
                    members.push(first);
                }
                return Err(CoreError::CircularDependency {
                    cycle: members.join(" -> "),
                });
            }
        }
        Ok(())
    }
}

fn node_index<'a>(
    graph: &mut DiGraph<&'a SObjectName, ()>,
    nodes: &mut HashMap<&'a SObjectName, NodeIndex>,
    name: &'a SObjectName,
) -> NodeIndex {
    *nodes.entry(name).or_insert_with(|| graph.add_node(name))
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
