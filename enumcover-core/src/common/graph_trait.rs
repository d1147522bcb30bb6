//! Shared graph traversal abstraction.
//!
//! The module graph exposes its dependency edges through [`GraphTraversal`];
//! the enumeration index drives its incremental BFS through it.

use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Trait for graph traversal operations.
///
/// # Example
/// ```ignore
/// impl GraphTraversal for ModuleGraph {
///     type Node = String;
///
///     fn neighbors(&self, node: &String) -> Vec<String> { ... }
///     fn contains_node(&self, node: &String) -> bool { ... }
/// }
///
/// let mut visited = HashSet::new();
/// let fresh = graph.claim_unvisited("crate".to_string(), &mut visited);
/// ```
pub trait GraphTraversal {
    /// The type used to identify nodes in the graph.
    type Node: Clone + Eq + Hash;

    /// Returns all neighbors (outgoing edges) of a node.
    fn neighbors(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Checks if the graph contains a node.
    fn contains_node(&self, node: &Self::Node) -> bool;

    /// BFS from `root` that skips every node already in `visited`.
    ///
    /// Newly reached nodes are inserted into `visited` and returned in BFS
    /// order. Nodes found in `visited` are not expanded: their closure is
    /// assumed to have been claimed by the traversal that inserted them.
    fn claim_unvisited(
        &self,
        root: Self::Node,
        visited: &mut HashSet<Self::Node>,
    ) -> Vec<Self::Node> {
        let mut claimed = Vec::new();
        if !self.contains_node(&root) || !visited.insert(root.clone()) {
            return claimed;
        }

        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            for neighbor in self.neighbors(&node) {
                if visited.insert(neighbor.clone()) {
                    queue.push_back(neighbor);
                }
            }
            claimed.push(node);
        }
        claimed
    }

    /// All nodes reachable from any of the given roots.
    fn reachable_from<I>(&self, roots: I) -> HashSet<Self::Node>
    where
        I: IntoIterator<Item = Self::Node>,
        Self: Sized,
    {
        let mut visited = HashSet::new();
        for root in roots {
            self.claim_unvisited(root, &mut visited);
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct TestGraph {
        nodes: HashSet<String>,
        edges: HashMap<String, Vec<String>>,
    }

    impl TestGraph {
        fn new() -> Self {
            Self {
                nodes: HashSet::new(),
                edges: HashMap::new(),
            }
        }

        fn add_node(&mut self, node: &str) {
            self.nodes.insert(node.to_string());
        }

        fn add_edge(&mut self, from: &str, to: &str) {
            self.add_node(from);
            self.add_node(to);
            self.edges
                .entry(from.to_string())
                .or_default()
                .push(to.to_string());
        }
    }

    impl GraphTraversal for TestGraph {
        type Node = String;

        fn neighbors(&self, node: &String) -> Vec<String> {
            self.edges.get(node).cloned().unwrap_or_default()
        }

        fn contains_node(&self, node: &String) -> bool {
            self.nodes.contains(node)
        }
    }

    #[test]
    fn test_claim_in_bfs_order() {
        let mut graph = TestGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("a", "c");
        graph.add_edge("b", "d");

        let mut visited = HashSet::new();
        let claimed = graph.claim_unvisited("a".to_string(), &mut visited);
        assert_eq!(claimed, vec!["a", "b", "c", "d"]);
        assert_eq!(visited.len(), 4);
    }

    #[test]
    fn test_claim_skips_visited() {
        let mut graph = TestGraph::new();
        graph.add_edge("a", "shared");
        graph.add_edge("b", "shared");
        graph.add_edge("shared", "leaf");

        let mut visited = HashSet::new();
        graph.claim_unvisited("a".to_string(), &mut visited);
        let second = graph.claim_unvisited("b".to_string(), &mut visited);
        assert_eq!(second, vec!["b"]);

        let again = graph.claim_unvisited("a".to_string(), &mut visited);
        assert!(again.is_empty());
    }

    #[test]
    fn test_cycle_terminates() {
        let mut graph = TestGraph::new();
        graph.add_edge("a", "b");
        graph.add_edge("b", "c");
        graph.add_edge("c", "a");

        let reachable = graph.reachable_from(["a".to_string()]);
        assert_eq!(reachable.len(), 3);
    }

    #[test]
    fn test_missing_root_ignored() {
        let mut graph = TestGraph::new();
        graph.add_node("a");

        let reachable = graph.reachable_from(["a".to_string(), "missing".to_string()]);
        assert_eq!(reachable.len(), 1);
        assert!(reachable.contains("a"));
    }
}
