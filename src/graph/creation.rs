// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for creating [`GraphModel`] instances.

use super::GraphModel;
use crate::arrays::{Branch3Columns, BranchColumns};
use crate::{Error, Grid};

/// `GraphModel` instantiation.
impl GraphModel {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of a grid from its arrays.
    ///
    /// Every node row becomes a node, in array order. Every two-terminal
    /// branch, and each of the three branches a three-winding transformer is
    /// split into, becomes a branch; with `active_only`, only those in
    /// service at both ends.
    ///
    /// Fails with `RecordDoesNotExist` if a branch refers to a node that is
    /// not in the node array.
    pub fn from_arrays(grid: &Grid, active_only: bool) -> Result<Self, Error> {
        let nodes = grid.node()?;
        let mut graph = Self::new();
        graph.graph.reserve_nodes(nodes.len());
        for &id in nodes.ids()? {
            graph.add_node(id)?;
        }

        let branches = grid.branches()?;
        let branch3 = grid.three_winding_transformer()?.as_branches()?;
        for array in [&branches, &branch3] {
            let active = array.is_active()?;
            let from_nodes = array.ints("from_node")?;
            let to_nodes = array.ints("to_node")?;
            for (row, (&from, &to)) in from_nodes.iter().zip(to_nodes).enumerate() {
                if active_only && !active[row] {
                    continue;
                }
                for id in [from, to] {
                    if !graph.has_node(id) {
                        return Err(Error::record_does_not_exist(format!(
                            "Branch {} refers to node {id}, which is not in the node array.",
                            array.ids()?[row]
                        )));
                    }
                }
                graph.add_branch(from, to)?;
            }
        }

        tracing::debug!(
            "Built {} graph with {} nodes and {} branches.",
            if active_only { "active" } else { "complete" },
            graph.nr_nodes(),
            graph.nr_branches()
        );
        Ok(graph)
    }
}
