// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for looking up nodes and branches of a [`GraphModel`].

use super::iterators::{Branches, InBranches};
use super::GraphModel;
use crate::Error;
use petgraph::graph::NodeIndex;

impl GraphModel {
    pub(crate) fn index_of(&self, id: i64) -> Result<NodeIndex, Error> {
        self.node_indices
            .get(&id)
            .copied()
            .ok_or_else(|| Error::missing_node(format!("Node {id} does not exist in the graph.")))
    }

    pub fn nr_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// The number of branches, counting parallel branches separately.
    pub fn nr_branches(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_node(&self, id: i64) -> bool {
        self.node_indices.contains_key(&id)
    }

    /// Whether at least one branch connects the two nodes, in either
    /// direction.
    pub fn has_branch(&self, from_id: i64, to_id: i64) -> bool {
        match (self.node_indices.get(&from_id), self.node_indices.get(&to_id)) {
            (Some(&from), Some(&to)) => self.graph.find_edge(from, to).is_some(),
            _ => false,
        }
    }

    /// The ids of all nodes, in the order of their internal positions.
    pub fn external_ids(&self) -> Vec<i64> {
        self.graph.raw_nodes().iter().map(|n| n.weight).collect()
    }

    /// The current internal position of a node.
    ///
    /// Positions are only stable until the next node deletion.
    pub fn external_to_internal(&self, id: i64) -> Result<usize, Error> {
        self.index_of(id).map(|idx| idx.index())
    }

    pub fn internal_to_external(&self, internal: usize) -> Result<i64, Error> {
        self.graph
            .node_weight(NodeIndex::new(internal))
            .copied()
            .ok_or_else(|| {
                Error::missing_node(format!("No node at internal position {internal}."))
            })
    }

    /// Returns an iterator over all branches.
    pub fn all_branches(&self) -> Branches<'_> {
        Branches {
            graph: &self.graph,
            iter: self.graph.raw_edges().iter(),
        }
    }

    /// Returns an iterator over the branches of the node with the given id.
    ///
    /// Returns an error if the node does not exist.
    pub fn in_branches(&self, id: i64) -> Result<InBranches<'_>, Error> {
        self.index_of(id).map(|idx| InBranches {
            graph: &self.graph,
            node_id: id,
            iter: self.graph.neighbors(idx),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn parallel_graph() -> Result<GraphModel, Error> {
        let mut graph = GraphModel::new();
        graph.add_node(1)?;
        graph.add_node(2)?;
        graph.add_branch(1, 2)?;
        graph.add_branch(1, 2)?;
        graph.add_branch(2, 1)?;
        Ok(graph)
    }

    #[test]
    fn test_has_node() -> Result<(), Error> {
        let mut graph = GraphModel::new();
        graph.add_node(1)?;
        assert!(graph.has_node(1));
        assert!(!graph.has_node(2));
        assert!(!graph.has_branch(1, 3));
        Ok(())
    }

    #[test]
    fn test_all_branches() -> Result<(), Error> {
        let graph = parallel_graph()?;
        assert_eq!(
            graph.all_branches().collect::<Vec<_>>(),
            vec![(1, 2), (1, 2), (2, 1)]
        );
        Ok(())
    }

    #[test]
    fn test_in_branches() -> Result<(), Error> {
        let graph = parallel_graph()?;
        assert_eq!(graph.in_branches(1)?.collect::<Vec<_>>(), vec![(2, 1); 3]);
        assert_eq!(graph.in_branches(2)?.collect::<Vec<_>>(), vec![(1, 2); 3]);
        assert!(graph
            .in_branches(3)
            .is_err_and(|e| e.kind() == ErrorKind::MissingNode));
        Ok(())
    }

    #[test]
    fn test_internal_positions() -> Result<(), Error> {
        let graph = parallel_graph()?;
        assert_eq!(graph.external_ids(), vec![1, 2]);
        assert_eq!(graph.external_to_internal(2)?, 1);
        assert_eq!(graph.internal_to_external(0)?, 1);
        assert!(graph
            .internal_to_external(5)
            .is_err_and(|e| e.kind() == ErrorKind::MissingNode));
        Ok(())
    }
}
