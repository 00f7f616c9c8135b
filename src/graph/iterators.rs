// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over the branches of a `GraphModel`.

use petgraph::graph::UnGraph;

/// An iterator over all branches of a `GraphModel`, as `(from, to)` id
/// pairs in the direction they were added.
///
/// Parallel branches are yielded once each.
pub struct Branches<'a> {
    pub(crate) graph: &'a UnGraph<i64, ()>,
    pub(crate) iter: std::slice::Iter<'a, petgraph::graph::Edge<()>>,
}

impl<'a> Iterator for Branches<'a> {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter
            .next()
            .map(|e| (self.graph[e.source()], self.graph[e.target()]))
    }
}

/// An iterator over the branches of a single node, as `(neighbor, node)`
/// id pairs.
pub struct InBranches<'a> {
    pub(crate) graph: &'a UnGraph<i64, ()>,
    pub(crate) node_id: i64,
    pub(crate) iter: petgraph::graph::Neighbors<'a, ()>,
}

impl<'a> Iterator for InBranches<'a> {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|i| (self.graph[i], self.node_id))
    }
}
