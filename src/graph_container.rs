// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The two graphs of a grid: one with every branch, one with only the
//! branches in service.

use crate::array::RecordArray;
use crate::arrays::{Branch3Columns, BranchColumns};
use crate::{Error, GraphModel, Grid};

/// The active and complete graph of a grid.
///
/// The complete graph holds every branch. The active graph only holds the
/// branches that are in service at both ends; for three-winding
/// transformers, each of the three split branches on its own.
#[derive(Clone, Debug, Default)]
pub struct GraphContainer {
    active_graph: GraphModel,
    complete_graph: GraphModel,
}

impl GraphContainer {
    /// Creates a container with two empty graphs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds both graphs from the arrays of `grid`.
    pub fn from_arrays(grid: &Grid) -> Result<Self, Error> {
        Ok(Self {
            active_graph: GraphModel::from_arrays(grid, true)?,
            complete_graph: GraphModel::from_arrays(grid, false)?,
        })
    }

    pub fn active_graph(&self) -> &GraphModel {
        &self.active_graph
    }

    pub fn complete_graph(&self) -> &GraphModel {
        &self.complete_graph
    }

    /// Mutable access to the active graph.
    ///
    /// Changes made here are not reflected in the grid arrays.
    pub fn active_graph_mut(&mut self) -> &mut GraphModel {
        &mut self.active_graph
    }

    /// Mutable access to the complete graph.
    ///
    /// Changes made here are not reflected in the grid arrays.
    pub fn complete_graph_mut(&mut self) -> &mut GraphModel {
        &mut self.complete_graph
    }

    /// Adds the nodes of a node array to both graphs.
    pub fn add_node(&mut self, nodes: &RecordArray) -> Result<(), Error> {
        for &id in nodes.ids()? {
            self.active_graph.add_node(id)?;
            self.complete_graph.add_node(id)?;
        }
        Ok(())
    }

    /// Deletes the nodes of a node array, with their branches, from both
    /// graphs.
    pub fn delete_node(&mut self, nodes: &RecordArray) -> Result<(), Error> {
        for &id in nodes.ids()? {
            self.active_graph.delete_node(id, true)?;
            self.complete_graph.delete_node(id, true)?;
        }
        Ok(())
    }

    /// Adds the branches of a branch array; to the active graph only when
    /// they are in service.
    pub fn add_branch(&mut self, branches: &RecordArray) -> Result<(), Error> {
        let active = branches.is_active()?;
        let pairs = branches
            .ints("from_node")?
            .iter()
            .zip(branches.ints("to_node")?);
        for ((&from, &to), active) in pairs.zip(active) {
            self.complete_graph.add_branch(from, to)?;
            if active {
                self.active_graph.add_branch(from, to)?;
            }
        }
        Ok(())
    }

    /// Deletes the branches of a branch array; from the active graph only
    /// when they are in service.
    pub fn delete_branch(&mut self, branches: &RecordArray) -> Result<(), Error> {
        let active = branches.is_active()?;
        let pairs = branches
            .ints("from_node")?
            .iter()
            .zip(branches.ints("to_node")?);
        for ((&from, &to), active) in pairs.zip(active) {
            self.complete_graph.delete_branch(from, to, true)?;
            if active {
                self.active_graph.delete_branch(from, to, true)?;
            }
        }
        Ok(())
    }

    /// Adds the 1-2, 1-3 and 2-3 branches of three-winding transformers.
    pub fn add_branch3(&mut self, branches: &RecordArray) -> Result<(), Error> {
        self.add_branch(&branches.as_branches()?)
    }

    /// Deletes the 1-2, 1-3 and 2-3 branches of three-winding transformers.
    pub fn delete_branch3(&mut self, branches: &RecordArray) -> Result<(), Error> {
        self.delete_branch(&branches.as_branches()?)
    }
}
