// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Feeder labelling of nodes and branches.

use super::Grid;
use crate::arrays::BranchColumns;
use crate::{ArrayKind, Error, EMPTY_ID};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

/// The feeder branch and substation node a node is fed from.
#[derive(Clone, Copy, Debug)]
struct Feeder {
    branch_id: i64,
    node_id: i64,
}

impl Grid {
    /// Sets the feeder columns of the node and branch arrays.
    ///
    /// A feeder branch connects a substation node to a node that is not a
    /// substation; its `is_feeder` flag is set whether it is active or not.
    /// Every node is labelled with the active feeder it is nearest to in the
    /// active graph, ties going to the feeder that comes first in
    /// [`branches`][Grid::branches] order. Active branches get the label of
    /// their non-substation side.
    ///
    /// Substation nodes, unreachable nodes, inactive branches and branches
    /// between two substations get [`EMPTY_ID`].
    pub fn set_feeder_ids(&mut self) -> Result<(), Error> {
        let substations: HashSet<i64> = self.substation_ids()?.into_iter().collect();
        let labels = self.feeder_labels(&substations)?;
        let label_of = |id: i64| labels.get(&id).copied();

        let node = self.array_mut(ArrayKind::Node)?;
        let node_feeders: Vec<Option<Feeder>> = node.ids()?.iter().map(|&id| label_of(id)).collect();
        stamp(node, &node_feeders)?;

        for kind in ArrayKind::BRANCHES {
            let branches = self.array_mut(kind)?;
            let active = branches.is_active()?;
            let mut is_feeder = Vec::with_capacity(branches.len());
            let mut feeders = Vec::with_capacity(branches.len());
            for (row, (&from, &to)) in branches
                .ints("from_node")?
                .iter()
                .zip(branches.ints("to_node")?)
                .enumerate()
            {
                let (from_sub, to_sub) = (substations.contains(&from), substations.contains(&to));
                is_feeder.push(from_sub != to_sub);
                feeders.push(match (active[row], from_sub, to_sub) {
                    (true, false, _) => label_of(from),
                    (true, true, false) => label_of(to),
                    _ => None,
                });
            }
            branches.set_values("is_feeder", is_feeder)?;
            stamp(branches, &feeders)?;
        }
        tracing::debug!(
            "Labelled {} of {} nodes with a feeder.",
            labels.len(),
            self.node()?.len()
        );
        Ok(())
    }

    /// Labels every node reachable from an active feeder with the feeder it
    /// is nearest to, by a breadth-first search starting from all feeders at
    /// once.
    fn feeder_labels(&self, substations: &HashSet<i64>) -> Result<HashMap<i64, Feeder>, Error> {
        let branches = self.branches()?;
        let active = branches.is_active()?;
        let mut labels: HashMap<i64, Feeder> = HashMap::new();
        let mut queue = VecDeque::new();

        for (row, ((&id, &from), &to)) in branches
            .ids()?
            .iter()
            .zip(branches.ints("from_node")?)
            .zip(branches.ints("to_node")?)
            .enumerate()
        {
            if !active[row] {
                continue;
            }
            let (substation, fed) = match (substations.contains(&from), substations.contains(&to)) {
                (true, false) => (from, to),
                (false, true) => (to, from),
                _ => continue,
            };
            if let Entry::Vacant(entry) = labels.entry(fed) {
                entry.insert(Feeder {
                    branch_id: id,
                    node_id: substation,
                });
                queue.push_back(fed);
            }
        }

        let graph = self.graphs.active_graph();
        while let Some(node) = queue.pop_front() {
            let Some(&feeder) = labels.get(&node) else {
                continue;
            };
            for (neighbor, _) in graph.in_branches(node)? {
                if substations.contains(&neighbor) {
                    continue;
                }
                if let Entry::Vacant(entry) = labels.entry(neighbor) {
                    entry.insert(feeder);
                    queue.push_back(neighbor);
                }
            }
        }
        Ok(labels)
    }
}

/// Writes the `feeder_branch_id` and `feeder_node_id` columns.
fn stamp(array: &mut crate::RecordArray, feeders: &[Option<Feeder>]) -> Result<(), Error> {
    array.set_values(
        "feeder_branch_id",
        feeders.iter().map(|f| f.map_or(EMPTY_ID, |f| f.branch_id)),
    )?;
    array.set_values(
        "feeder_node_id",
        feeders.iter().map(|f| f.map_or(EMPTY_ID, |f| f.node_id)),
    )
}

#[cfg(test)]
mod tests {
    use crate::array::{ArrayType, Query};
    use crate::arrays::{LineArray, NodeArray, NodeType};
    use crate::test_utils::basic_grid;
    use crate::{ArrayKind, BranchSide, Error, Grid, EMPTY_ID as E};

    fn check_feeders(
        grid: &Grid,
        is_feeder: &[bool],
        branch_feeders: &[i64],
        node_feeders: &[i64],
    ) -> Result<(), Error> {
        let branches = grid.branches()?;
        assert_eq!(branches.bools("is_feeder")?, is_feeder);
        assert_eq!(branches.ints("feeder_branch_id")?, branch_feeders);
        assert_eq!(grid.node()?.ints("feeder_branch_id")?, node_feeders);

        let fed_by = |id: i64| if id == E { E } else { 101 };
        let branch_nodes: Vec<i64> = branch_feeders.iter().map(|&id| fed_by(id)).collect();
        let node_nodes: Vec<i64> = node_feeders.iter().map(|&id| fed_by(id)).collect();
        assert_eq!(branches.ints("feeder_node_id")?, branch_nodes);
        assert_eq!(grid.node()?.ints("feeder_node_id")?, node_nodes);
        Ok(())
    }

    #[test]
    fn test_set_feeder_ids() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        for kind in [ArrayKind::Node, ArrayKind::Line, ArrayKind::Transformer, ArrayKind::Link] {
            let array = grid.array_mut(kind)?;
            array.set("feeder_branch_id", 1)?;
            array.set("feeder_node_id", 1)?;
        }

        grid.set_feeder_ids()?;
        check_feeders(
            &grid,
            &[false, true, false, false, true, false],
            &[201, 201, 201, E, 204, 204],
            &[E, 201, 201, 204, 204, 201],
        )
    }

    #[test]
    fn test_unconnected_node() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        grid.append(&NodeArray::empty(1)?, true)?;
        grid.set_feeder_ids()?;
        check_feeders(
            &grid,
            &[false, true, false, false, true, false],
            &[201, 201, 201, E, 204, 204],
            &[E, 201, 201, 204, 204, 201, E],
        )
    }

    #[test]
    fn test_parallel_line() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let line = LineArray::builder()
            .column("from_node", [101])
            .column("to_node", [102])
            .column("from_status", [1])
            .column("to_status", [1])
            .build()?;
        grid.append(&line, true)?;
        grid.set_feeder_ids()?;
        check_feeders(
            &grid,
            &[false, true, false, false, true, true, false],
            &[201, 201, 201, E, 204, 201, 204],
            &[E, 201, 201, 204, 204, 201],
        )
    }

    #[test]
    fn test_inactive_feeder() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let feeder = grid.line()?.get(&Query::id(204))?;
        grid.make_inactive(&feeder, BranchSide::To)?;
        let open = grid.line()?.get(&Query::id(203))?;
        grid.make_active(&open)?;

        grid.set_feeder_ids()?;
        check_feeders(
            &grid,
            &[false, true, false, false, true, false],
            &[201, 201, 201, 201, E, 201],
            &[E, 201, 201, 201, 201, 201],
        )
    }

    #[test]
    fn test_feeder_towards_substation() -> Result<(), Error> {
        let mut grid = Grid::empty()?;
        let substations = NodeArray::builder()
            .column("id", [100, 101])
            .column("u_rated", [21_000.0, 10_500.0])
            .column("node_type", [NodeType::SubstationNode.value(); 2])
            .build()?;
        grid.append(&substations, false)?;
        grid.append(&NodeArray::builder().column("id", [102]).build()?, false)?;
        let lines = LineArray::builder()
            .column("id", [200, 201])
            .column("from_status", [1, 1])
            .column("to_status", [1, 1])
            .column("from_node", [100, 102])
            .column("to_node", [101, 101])
            .build()?;
        grid.append(&lines, false)?;

        grid.set_feeder_ids()?;
        check_feeders(&grid, &[false, true], &[E, 201], &[E, E, 201])
    }
}
