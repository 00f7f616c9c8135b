// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Topology queries on a [`Grid`].

use super::Grid;
use crate::array::{ArrayType, Query, RecordArray};
use crate::arrays::{BranchArray, BranchColumns};
use crate::{ArrayKind, Error, ErrorKind};

impl Grid {
    /// The substation node nearest to `node_id` in the active graph.
    ///
    /// A substation node is its own nearest substation. Fails with
    /// `RecordDoesNotExist` if no substation can be reached.
    pub fn get_nearest_substation_node(&self, node_id: i64) -> Result<RecordArray, Error> {
        let substations = self.substation_ids()?;
        let nearest = if substations.contains(&node_id) {
            node_id
        } else {
            self.graphs
                .active_graph()
                .find_first_connected(node_id, &substations)
                .map_err(|err| match err.kind() {
                    ErrorKind::MissingNode if self.graphs.active_graph().has_node(node_id) => {
                        Error::record_does_not_exist(format!(
                            "No substation node can be reached from node {node_id}."
                        ))
                    }
                    _ => err,
                })?
        };
        self.node()?.get(&Query::id(nearest))
    }

    /// The nodes downstream of `node_id`, in breadth-first order.
    ///
    /// Downstream is away from the nearest substation: the neighbor of
    /// `node_id` on the shortest path to that substation, and every
    /// substation, are not crossed.
    ///
    /// Fails with `NotImplemented` for substation nodes, which have no
    /// upstream direction.
    pub fn get_downstream_nodes(&self, node_id: i64) -> Result<Vec<i64>, Error> {
        let mut blocked = self.substation_ids()?;
        if blocked.contains(&node_id) {
            return Err(Error::not_implemented(format!(
                "Cannot determine the downstream nodes of substation node {node_id}."
            )));
        }
        let substation = self.get_nearest_substation_node(node_id)?.record()?.id()?;
        let graph = self.graphs.active_graph();
        let (path, _) = graph.get_shortest_path(node_id, substation)?;
        if let Some(&upstream) = path.get(1) {
            blocked.push(upstream);
        }
        graph.get_connected(node_id, false, &blocked)
    }

    /// The active branches along a path of nodes, in path order.
    ///
    /// These are all active transformers, lines and links with both ends on
    /// the path, ordered by the later of their two ends along the path.
    /// Consecutive nodes without an active branch between them, such as an
    /// open ring, are skipped. Paths with fewer than two nodes give an empty
    /// [`BranchArray`].
    pub fn get_branches_in_path(&self, path: &[i64]) -> Result<RecordArray, Error> {
        if path.len() < 2 {
            return BranchArray::new();
        }
        let branches = self.branches()?;
        let active = branches.is_active()?;
        let from_nodes = branches.ints("from_node")?;
        let to_nodes = branches.ints("to_node")?;
        let position = |node: i64| path.iter().position(|&n| n == node);

        let mut rows: Vec<(usize, usize)> = (0..branches.len())
            .filter(|&row| active[row])
            .filter_map(|row| {
                let from = position(from_nodes[row])?;
                let to = position(to_nodes[row])?;
                Some((from.max(to), row))
            })
            .collect();
        rows.sort_by_key(|&(reached, _)| reached);
        branches.take(&rows.into_iter().map(|(_, row)| row).collect::<Vec<_>>())
    }

    /// The rows of the branch member array holding the given ids.
    ///
    /// The member array is the one holding the first id, and must hold all
    /// others too. Fails with `InvalidValue` on an empty list and with
    /// `RecordDoesNotExist` if an id is not in that array.
    pub fn get_typed_branches(&self, ids: &[i64]) -> Result<RecordArray, Error> {
        let first = ids
            .first()
            .ok_or_else(|| Error::invalid_value("No branch ids given."))?;
        let kind = self.kind_of(*first, &ArrayKind::BRANCHES)?;
        let branches = self.array(kind)?.filter(&Query::ids(ids.iter().copied()))?;
        let found = branches.ids()?;
        if let Some(missing) = ids.iter().find(|&&id| !found.contains(&id)) {
            return Err(Error::record_does_not_exist(format!(
                "Branch {missing} is not in the {kind} array, which holds branch {first}."
            )));
        }
        Ok(branches)
    }
}
