//! Project dependency graph inferred from import records
//!
//! Every record is resolved through a shared [`TargetProjectLocator`]; the
//! resolved edges are deduplicated and stored in a petgraph graph so callers
//! can walk dependencies and look for cycles.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use locus_core::types::{EdgeKind, ImportRecord, InferredEdge};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use tracing::debug;

use crate::locator::TargetProjectLocator;

/// Deduplicated dependency edges between graph nodes
#[derive(Debug, Default)]
pub struct InferredGraph {
    graph: DiGraph<String, EdgeKind>,
    node_map: HashMap<String, NodeIndex>,
}

impl InferredGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from edges; duplicates are dropped
    pub fn from_edges(edges: impl IntoIterator<Item = InferredEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges.into_iter().collect::<BTreeSet<_>>() {
            graph.add_edge(edge);
        }
        graph
    }

    /// Add a node if it is not present yet
    pub fn add_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.node_map.insert(name.to_string(), index);
        index
    }

    /// Add an edge unless the same (source, target, kind) is already present
    pub fn add_edge(&mut self, edge: InferredEdge) {
        let from = self.add_node(&edge.source);
        let to = self.add_node(&edge.target);
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|existing| *existing.weight() == edge.kind);
        if !exists {
            self.graph.add_edge(from, to, edge.kind);
        }
    }

    /// All edges, sorted
    pub fn edges(&self) -> Vec<InferredEdge> {
        let mut edges: Vec<InferredEdge> = self
            .graph
            .edge_references()
            .map(|edge| InferredEdge {
                source: self.graph[edge.source()].clone(),
                target: self.graph[edge.target()].clone(),
                kind: *edge.weight(),
            })
            .collect();
        edges.sort();
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether `name` is a node of the graph
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Direct dependencies of `name`, sorted, regardless of edge kind
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        let Some(&index) = self.node_map.get(name) else {
            return Vec::new();
        };
        self.successors(index)
            .into_iter()
            .map(|next| self.graph[next].as_str())
            .collect()
    }

    /// One dependency cycle, if any, as `[a, b, ..., a]`
    ///
    /// The cycle starts at the smallest node name taking part in any cycle
    /// and is the shortest one through that node.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let start = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .flatten()
            .min_by(|a, b| self.graph[*a].cmp(&self.graph[*b]))?;

        let mut previous: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for next in self.successors(node) {
                if next == start {
                    let mut path = vec![node];
                    let mut current = node;
                    while let Some(&parent) = previous.get(&current) {
                        path.push(parent);
                        current = parent;
                    }
                    path.reverse();
                    path.push(start);
                    return Some(path.into_iter().map(|index| self.graph[index].clone()).collect());
                }
                if let std::collections::hash_map::Entry::Vacant(entry) = previous.entry(next) {
                    entry.insert(node);
                    queue.push_back(next);
                }
            }
        }

        None
    }

    /// Distinct successors sorted by name
    fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut seen = HashSet::new();
        let mut next: Vec<NodeIndex> = self
            .graph
            .neighbors(index)
            .filter(|candidate| seen.insert(*candidate))
            .collect();
        next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        next
    }
}

/// Format a cycle path for display (`a -> b -> a`)
pub fn format_cycle(cycle: &[String]) -> String {
    cycle.join(" -> ")
}

/// Resolve every record sequentially and collect the edges
pub fn infer_edges(locator: &TargetProjectLocator, imports: &[ImportRecord]) -> InferredGraph {
    let edges: Vec<InferredEdge> = imports
        .iter()
        .filter_map(|record| infer_edge(locator, record))
        .collect();
    build_graph(locator, edges, imports.len())
}

/// Resolve records on the rayon pool; same result as [`infer_edges`]
pub fn infer_edges_parallel(locator: &TargetProjectLocator, imports: &[ImportRecord]) -> InferredGraph {
    let edges: Vec<InferredEdge> = imports
        .par_iter()
        .filter_map(|record| infer_edge(locator, record))
        .collect();
    build_graph(locator, edges, imports.len())
}

fn infer_edge(locator: &TargetProjectLocator, record: &ImportRecord) -> Option<InferredEdge> {
    let Some(root) = locator.project_root(&record.source) else {
        debug!("Skipping import from unknown project '{}'", record.source);
        return None;
    };

    let target = locator.resolve(&record.specifier, root, &record.file)?;
    if target == record.source {
        return None;
    }

    Some(InferredEdge {
        source: record.source.clone(),
        target,
        kind: record.kind,
    })
}

fn build_graph(locator: &TargetProjectLocator, edges: Vec<InferredEdge>, records: usize) -> InferredGraph {
    let mut graph = InferredGraph::new();
    for project in locator.projects() {
        graph.add_node(&project.name);
    }
    for edge in edges.into_iter().collect::<BTreeSet<_>>() {
        graph.add_edge(edge);
    }

    debug!(
        "Inferred {} edges from {} import records",
        graph.edge_count(),
        records
    );
    graph
}
