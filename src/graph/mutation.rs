// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Adding and deleting nodes and branches of a [`GraphModel`].

use super::GraphModel;
use crate::Error;
use petgraph::graph::NodeIndex;

impl GraphModel {
    /// Adds a node. Fails if a node with the same id exists.
    pub fn add_node(&mut self, id: i64) -> Result<(), Error> {
        if self.node_indices.contains_key(&id) {
            return Err(Error::invalid_graph(format!(
                "Node {id} already exists in the graph."
            )));
        }
        let idx = self.graph.add_node(id);
        self.node_indices.insert(id, idx);
        Ok(())
    }

    /// Adds a branch between two existing nodes.
    ///
    /// Branches between the same nodes can be added more than once.
    pub fn add_branch(&mut self, from_id: i64, to_id: i64) -> Result<(), Error> {
        let from = self.index_of(from_id)?;
        let to = self.index_of(to_id)?;
        self.graph.add_edge(from, to, ());
        Ok(())
    }

    /// Deletes a node and all of its branches.
    ///
    /// A missing node is an error, unless `raise_on_fail` is false.
    pub fn delete_node(&mut self, id: i64, raise_on_fail: bool) -> Result<(), Error> {
        let idx = match self.index_of(id) {
            Ok(idx) => idx,
            Err(err) if raise_on_fail => return Err(err),
            Err(err) => {
                tracing::warn!("Ignoring node deletion: {err}");
                return Ok(());
            }
        };
        self.remove_index(idx);
        Ok(())
    }

    /// Deletes one branch between two nodes, in either direction.
    ///
    /// A missing branch is an error, unless `raise_on_fail` is false.
    pub fn delete_branch(&mut self, from_id: i64, to_id: i64, raise_on_fail: bool) -> Result<(), Error> {
        let edge = self
            .index_of(from_id)
            .ok()
            .zip(self.index_of(to_id).ok())
            .and_then(|(from, to)| self.graph.find_edge(from, to));
        match edge {
            Some(edge) => {
                self.graph.remove_edge(edge);
                Ok(())
            }
            None => {
                let err = Error::missing_branch(format!(
                    "No branch between nodes {from_id} and {to_id}."
                ));
                if raise_on_fail {
                    return Err(err);
                }
                tracing::warn!("Ignoring branch deletion: {err}");
                Ok(())
            }
        }
    }

    /// Removes the node at `idx`, keeping the id map in sync.
    ///
    /// The graph moves its last node into the freed index, so that node's
    /// entry has to follow.
    fn remove_index(&mut self, idx: NodeIndex) {
        if let Some(id) = self.graph.remove_node(idx) {
            self.node_indices.remove(&id);
        }
        if let Some(&moved) = self.graph.node_weight(idx) {
            self.node_indices.insert(moved, idx);
        }
    }
}
