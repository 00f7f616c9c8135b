// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Temporary removal of nodes from a [`GraphModel`].

use super::GraphModel;
use crate::Error;
use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

/// A graph with some of its nodes removed, returned by
/// [`GraphModel::tmp_remove_nodes`].
///
/// The removed nodes and all of their branches, parallel ones included, are
/// put back when the guard is dropped, however the scope is left.
pub struct TmpRemovedNodes<'a> {
    graph: &'a mut GraphModel,
    nodes: Vec<i64>,
    branches: Vec<(i64, i64)>,
}

impl GraphModel {
    /// Removes the given nodes until the returned guard is dropped.
    ///
    /// Fails with `MissingNode` before removing anything if one of the nodes
    /// does not exist.
    ///
    /// Restoration is exact only if the scope leaves the remaining graph
    /// as it found it. A removed node that was added again stays as it is,
    /// and branches to neighbors deleted within the scope cannot be put
    /// back; both are logged as errors and the graph stays changed.
    ///
    /// <details>
    /// <summary>Example:</summary>
    ///
    /// ```ignore
    /// {
    ///     let without_substations = graph.tmp_remove_nodes(&[101])?;
    ///     let feeders = without_substations.get_connected(102, true, &[])?;
    /// }
    /// // node 101 and its branches are back here.
    /// ```
    /// </details>
    pub fn tmp_remove_nodes(&mut self, ids: &[i64]) -> Result<TmpRemovedNodes<'_>, Error> {
        let mut nodes: Vec<i64> = Vec::with_capacity(ids.len());
        for &id in ids {
            self.index_of(id)?;
            if !nodes.contains(&id) {
                nodes.push(id);
            }
        }

        let removed: HashSet<i64> = nodes.iter().copied().collect();
        let branches = self
            .all_branches()
            .filter(|(from, to)| removed.contains(from) || removed.contains(to))
            .collect();
        for &id in &nodes {
            self.delete_node(id, true)?;
        }

        Ok(TmpRemovedNodes {
            graph: self,
            nodes,
            branches,
        })
    }
}

impl Deref for TmpRemovedNodes<'_> {
    type Target = GraphModel;

    fn deref(&self) -> &GraphModel {
        &*self.graph
    }
}

impl DerefMut for TmpRemovedNodes<'_> {
    fn deref_mut(&mut self) -> &mut GraphModel {
        &mut *self.graph
    }
}

impl Drop for TmpRemovedNodes<'_> {
    fn drop(&mut self) {
        for &id in &self.nodes {
            if let Err(err) = self.graph.add_node(id) {
                tracing::error!("Could not restore node {id}: {err}");
            }
        }
        for &(from, to) in &self.branches {
            if let Err(err) = self.graph.add_branch(from, to) {
                tracing::error!("Could not restore branch {from}-{to}: {err}");
            }
        }
    }
}
