// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Cycle detection on a [`GraphModel`].

use super::GraphModel;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet, VecDeque};

/// A breadth-first spanning forest.
struct SpanningForest {
    parent: HashMap<NodeIndex, NodeIndex>,
    depth: HashMap<NodeIndex, usize>,
}

impl SpanningForest {
    fn is_tree_edge(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.parent.get(&a) == Some(&b) || self.parent.get(&b) == Some(&a)
    }

    /// The tree path from `a` to `b`, both included.
    fn path(&self, mut a: NodeIndex, mut b: NodeIndex) -> Vec<NodeIndex> {
        let mut from_a = vec![a];
        let mut from_b = vec![b];
        let depth = |n: &NodeIndex| self.depth.get(n).copied().unwrap_or(0);
        while a != b {
            if depth(&a) >= depth(&b) {
                match self.parent.get(&a) {
                    Some(&p) => a = p,
                    None => break,
                }
                from_a.push(a);
            } else {
                match self.parent.get(&b) {
                    Some(&p) => b = p,
                    None => break,
                }
                from_b.push(b);
            }
        }
        // Both walks end in the common ancestor.
        from_b.pop();
        from_a.extend(from_b.into_iter().rev());
        from_a
    }
}

impl GraphModel {
    /// One cycle for every branch that closes a loop.
    ///
    /// A spanning forest is built over the distinct node pairs, and every
    /// pair outside of it yields the cycle it closes in the forest. Node
    /// pairs with parallel branches yield one extra two-node cycle, however
    /// many parallel branches there are. Cycles are closed: their first and
    /// last node are the same.
    pub fn find_fundamental_cycles(&self) -> Vec<Vec<i64>> {
        let mut pairs: Vec<(NodeIndex, NodeIndex)> = vec![];
        let mut counts: HashMap<(NodeIndex, NodeIndex), usize> = HashMap::new();
        for edge in self.graph.raw_edges() {
            let (a, b) = (edge.source(), edge.target());
            let pair = (a.min(b), a.max(b));
            let count = counts.entry(pair).or_default();
            if *count == 0 {
                pairs.push(pair);
            }
            *count += 1;
        }

        let forest = self.spanning_forest(&pairs);
        let mut cycles = vec![];
        for &(a, b) in &pairs {
            if !forest.is_tree_edge(a, b) {
                let mut cycle = forest.path(a, b);
                cycle.push(a);
                cycles.push(self.ids_of_path(&cycle));
            }
            if counts.get(&(a, b)).is_some_and(|&n| n > 1) {
                cycles.push(self.ids_of_path(&[a, b, a]));
            }
        }
        cycles
    }

    fn spanning_forest(&self, pairs: &[(NodeIndex, NodeIndex)]) -> SpanningForest {
        let mut adjacency: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
        for &(a, b) in pairs {
            adjacency.entry(a).or_default().push(b);
            adjacency.entry(b).or_default().push(a);
        }

        let mut forest = SpanningForest {
            parent: HashMap::new(),
            depth: HashMap::new(),
        };
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        for root in self.graph.node_indices() {
            if !visited.insert(root) {
                continue;
            }
            forest.depth.insert(root, 0);
            let mut queue = VecDeque::from([root]);
            while let Some(node) = queue.pop_front() {
                let depth = forest.depth.get(&node).copied().unwrap_or(0);
                for &next in adjacency.get(&node).into_iter().flatten() {
                    if visited.insert(next) {
                        forest.parent.insert(next, node);
                        forest.depth.insert(next, depth + 1);
                        queue.push_back(next);
                    }
                }
            }
        }
        forest
    }

    fn ids_of_path(&self, path: &[NodeIndex]) -> Vec<i64> {
        path.iter().map(|&idx| self.graph[idx]).collect()
    }
}
