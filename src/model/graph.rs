//! A small directed acyclic graph used twice: for resources inside one template and for units
//! inside one deployment.
//!
//! Edges point from a dependent to its dependency. Ordering is deterministic: among nodes that
//! are ready at the same time, the one added first wins.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Dependency cycle among: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct DependencyGraph<K> {
    nodes: Vec<K>,
    index: HashMap<K, usize>,
    /// `dependencies[i]` are the nodes `nodes[i]` waits for.
    dependencies: Vec<Vec<usize>>,
}

impl<K> Default for DependencyGraph<K> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            dependencies: Vec::new(),
        }
    }
}

impl<K: Clone + Eq + Hash + Display> DependencyGraph<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; adding an existing node is a no-op.
    pub fn add_node(&mut self, node: K) {
        if self.index.contains_key(&node) {
            return;
        }
        self.index.insert(node.clone(), self.nodes.len());
        self.nodes.push(node);
        self.dependencies.push(Vec::new());
    }

    /// Declares that `dependent` must come after `dependency`. Both must already be nodes.
    pub fn add_edge(&mut self, dependent: &K, dependency: &K) -> Result<(), GraphError> {
        let from = self.position(dependent)?;
        let to = self.position(dependency)?;
        if !self.dependencies[from].contains(&to) {
            self.dependencies[from].push(to);
        }
        Ok(())
    }

    pub fn contains(&self, node: &K) -> bool {
        self.index.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Direct dependencies of `node`, in the order they were declared.
    pub fn dependencies_of(&self, node: &K) -> Result<Vec<&K>, GraphError> {
        let at = self.position(node)?;
        Ok(self.dependencies[at].iter().map(|&i| &self.nodes[i]).collect())
    }

    /// Every node, dependencies before dependents.
    pub fn order(&self) -> Result<Vec<K>, GraphError> {
        Ok(self.waves()?.into_iter().flatten().collect())
    }

    /// Groups of nodes that can be processed together: every node's dependencies sit in an
    /// earlier wave.
    pub fn waves(&self) -> Result<Vec<Vec<K>>, GraphError> {
        let mut remaining: Vec<usize> = self.dependencies.iter().map(Vec::len).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (node, deps) in self.dependencies.iter().enumerate() {
            for &dep in deps {
                dependents[dep].push(node);
            }
        }

        let mut ready: Vec<usize> = (0..self.nodes.len())
            .filter(|&i| remaining[i] == 0)
            .collect();
        let mut waves = Vec::new();
        let mut visited = 0;

        while !ready.is_empty() {
            visited += ready.len();
            let mut next = Vec::new();
            for &node in &ready {
                for &dependent in &dependents[node] {
                    remaining[dependent] -= 1;
                    if remaining[dependent] == 0 {
                        next.push(dependent);
                    }
                }
            }
            next.sort_unstable();
            waves.push(ready.iter().map(|&i| self.nodes[i].clone()).collect());
            ready = next;
        }

        if visited < self.nodes.len() {
            return Err(GraphError::Cycle(self.cycle_members(&remaining)));
        }
        Ok(waves)
    }

    fn position(&self, node: &K) -> Result<usize, GraphError> {
        self.index
            .get(node)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(node.to_string()))
    }

    fn cycle_members(&self, remaining: &[usize]) -> Vec<String> {
        self.nodes
            .iter()
            .zip(remaining)
            .filter(|(_, &left)| left > 0)
            .map(|(node, _)| node.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&'static str], edges: &[(&'static str, &'static str)]) -> DependencyGraph<&'static str> {
        let mut graph = DependencyGraph::new();
        for node in nodes {
            graph.add_node(*node);
        }
        for (dependent, dependency) in edges {
            graph.add_edge(dependent, dependency).unwrap();
        }
        graph
    }

    #[test]
    fn test_independent_units_share_a_wave() {
        let g = graph(
            &["registry", "foundation", "topology"],
            &[("topology", "registry"), ("topology", "foundation")],
        );
        assert_eq!(
            g.waves().unwrap(),
            vec![vec!["registry", "foundation"], vec!["topology"]]
        );
        assert_eq!(g.order().unwrap(), vec!["registry", "foundation", "topology"]);
    }

    #[test]
    fn test_declaration_order_breaks_ties() {
        let g = graph(&["c", "b", "a"], &[]);
        assert_eq!(g.order().unwrap(), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_dependency_declared_later_still_comes_first() {
        let g = graph(&["service", "url", "alb"], &[("service", "url"), ("url", "alb")]);
        assert_eq!(g.order().unwrap(), vec!["alb", "url", "service"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "a")]);
        match g.order() {
            Err(GraphError::Cycle(members)) => assert_eq!(members, vec!["a", "b"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_node_is_rejected() {
        let mut g = graph(&["a"], &[]);
        assert_eq!(
            g.add_edge(&"a", &"missing"),
            Err(GraphError::UnknownNode("missing".to_string()))
        );
    }
}
