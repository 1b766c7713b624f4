//! Dependency graph over named schemas and the cycle-tolerant emission order.

use std::collections::{HashMap, HashSet};

use crate::ast::Registry;
use crate::refs::collect_references;

#[derive(Debug, Clone, Default, PartialEq)]
/// `name -> names it references`, in registry declaration order.
///
/// Edge lists keep first-seen reference order so traversal is deterministic.
/// Names that only appear as edge targets (dangling references) are not keys.
pub struct DependencyGraph {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the dependency list for `name`.
    pub fn insert(&mut self, name: impl Into<String>, dependencies: Vec<String>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&idx) => self.entries[idx].1 = dependencies,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, dependencies));
            }
        }
    }

    pub fn dependencies(&self, name: &str) -> &[String] {
        self.index
            .get(name)
            .map(|&idx| self.entries[idx].1.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<String>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (N, Vec<String>)>>(iter: I) -> Self {
        let mut graph = DependencyGraph::new();
        for (name, dependencies) in iter {
            graph.insert(name, dependencies);
        }
        graph
    }
}

/// Builds one graph entry per named schema, including schemas with no dependencies.
pub fn build_graph(registry: &Registry) -> DependencyGraph {
    registry
        .iter()
        .map(|named| (named.name.clone(), collect_references(&named.schema)))
        .collect()
}

/// Depth-first post-order emission of `start` and everything it depends on.
///
/// A name already in `visited` returns immediately; this is what breaks
/// cycles. For `A -> B -> A` entered at `A`, `B` is emitted before `A`
/// without its own dependency on `A` having been satisfied.
pub fn order(
    start: &str,
    graph: &DependencyGraph,
    visited: &mut HashSet<String>,
    out: &mut Vec<String>,
) {
    if !visited.insert(start.to_string()) {
        return;
    }

    for dependency in graph.dependencies(start) {
        order(dependency, graph, visited, out);
    }

    out.push(start.to_string());
}

/// Emission order for a whole registry.
///
/// Only registry names are emitted; dangling references are skipped.
pub fn resolve_order(registry: &Registry) -> Vec<String> {
    let graph = build_graph(registry);
    let order = resolve_graph_order(&graph);
    tracing::debug!(schemas = order.len(), "resolved schema emission order");
    order
}

/// Runs [`order`] from every graph key in declaration order with shared state.
pub fn resolve_graph_order(graph: &DependencyGraph) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut out = Vec::with_capacity(graph.len());

    for name in graph.names() {
        order(name, graph, &mut visited, &mut out);
    }

    out.retain(|name| graph.contains(name));
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{order, resolve_graph_order, DependencyGraph};

    fn graph(edges: &[(&str, &[&str])]) -> DependencyGraph {
        edges
            .iter()
            .map(|(name, deps)| {
                (
                    name.to_string(),
                    deps.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn dependencies_come_first() {
        let g = graph(&[("A", &["B", "C"]), ("B", &["C"]), ("C", &[])]);
        assert_eq!(resolve_graph_order(&g), vec!["C", "B", "A"]);
    }

    #[test]
    fn two_cycle_terminates_with_each_name_once() {
        let g = graph(&[("A", &["B"]), ("B", &["A"])]);
        assert_eq!(resolve_graph_order(&g), vec!["B", "A"]);
    }

    #[test]
    fn self_reference_is_emitted_once() {
        let g = graph(&[("Node", &["Node"])]);
        assert_eq!(resolve_graph_order(&g), vec!["Node"]);
    }

    #[test]
    fn visited_names_are_not_revisited() {
        let g = graph(&[("A", &["B"]), ("B", &[])]);
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        order("A", &g, &mut visited, &mut out);
        order("B", &g, &mut visited, &mut out);
        assert_eq!(out, vec!["B", "A"]);
    }

    #[test]
    fn dangling_references_are_not_emitted() {
        let g = graph(&[("A", &["Missing"])]);
        assert_eq!(resolve_graph_order(&g), vec!["A"]);
    }

    #[test]
    fn reinserting_replaces_edges_in_place() {
        let mut g = graph(&[("A", &["B"]), ("B", &[])]);
        g.insert("A", Vec::new());
        assert_eq!(g.dependencies("A"), &[] as &[String]);
        assert_eq!(g.names().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
