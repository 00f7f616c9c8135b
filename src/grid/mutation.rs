// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Node and branch mutations that keep the arrays and graphs of a [`Grid`]
//! in sync.

use super::Grid;
use crate::array::{FilterMode, Query, RecordArray, Values};
use crate::{ArrayKind, Error, KindPredicates};

/// The side of a branch, to switch with [`Grid::make_inactive`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchSide {
    From,
    #[default]
    To,
}

impl BranchSide {
    fn status_column(&self) -> &'static str {
        match self {
            BranchSide::From => "from_status",
            BranchSide::To => "to_status",
        }
    }
}

/// The arrays holding two-terminal and three-terminal branches.
const ALL_BRANCHES: [ArrayKind; 4] = [
    ArrayKind::Transformer,
    ArrayKind::Line,
    ArrayKind::Link,
    ArrayKind::ThreeWindingTransformer,
];

impl Grid {
    /// Adds nodes, giving rows without an id a fresh one.
    ///
    /// Returns the added rows.
    pub fn add_node(&mut self, node: &RecordArray) -> Result<RecordArray, Error> {
        if !node.is_node() {
            return Err(Error::invalid_type(format!(
                "Expected a node array, got {}.",
                node.schema().name()
            )));
        }
        self.append(node, true)
    }

    /// Deletes nodes, with everything attached to them.
    ///
    /// Branches and three-winding transformers connected to a deleted node
    /// are deleted, as are the sources, loads and generators on it. Sensors
    /// measuring and regulators regulating any of the deleted rows go too.
    pub fn delete_node(&mut self, node: &RecordArray) -> Result<(), Error> {
        for &id in node.ids()? {
            self.delete_node_id(id)?;
        }
        Ok(())
    }

    fn delete_node_id(&mut self, id: i64) -> Result<(), Error> {
        let node = self.node()?.get(&Query::id(id))?;
        let mut removed = vec![id];

        let branch3 = self.arrays.remove_where(
            ArrayKind::ThreeWindingTransformer.name(),
            &Query::new()
                .eq("node_1", id)
                .eq("node_2", id)
                .eq("node_3", id)
                .mode(FilterMode::Or),
        )?;
        self.graphs.delete_branch3(&branch3)?;
        removed.extend_from_slice(branch3.ids()?);

        for kind in ArrayKind::BRANCHES {
            let branches = self.arrays.remove_where(
                kind.name(),
                &Query::new()
                    .eq("from_node", id)
                    .eq("to_node", id)
                    .mode(FilterMode::Or),
            )?;
            removed.extend_from_slice(branches.ids()?);
        }
        for kind in [ArrayKind::Source, ArrayKind::SymLoad, ArrayKind::SymGen] {
            let appliances = self
                .arrays
                .remove_where(kind.name(), &Query::new().eq("node", id))?;
            removed.extend_from_slice(appliances.ids()?);
        }

        self.graphs.delete_node(&node)?;
        self.arrays
            .remove_where(ArrayKind::Node.name(), &Query::id(id))?;
        self.delete_dependents(&removed)?;
        tracing::debug!("Deleted node {id} and {} attached rows.", removed.len() - 1);
        Ok(())
    }

    /// Adds branches or three-winding transformers, giving rows without an
    /// id a fresh one.
    ///
    /// Returns the added rows.
    pub fn add_branch(&mut self, branch: &RecordArray) -> Result<RecordArray, Error> {
        if !branch.is_branch() && !branch.is_branch3() {
            return Err(Error::invalid_type(format!(
                "Expected a branch array, got {}.",
                branch.schema().name()
            )));
        }
        self.append(branch, true)
    }

    /// Deletes branches or three-winding transformers by id, from whichever
    /// member array holds them.
    ///
    /// Regulators and sensors attached to a deleted branch are deleted too.
    pub fn delete_branch(&mut self, branch: &RecordArray) -> Result<(), Error> {
        let ids = branch.ids()?.to_vec();
        for &id in &ids {
            let kind = self.kind_of(id, &ALL_BRANCHES)?;
            let removed = self.arrays.remove_where(kind.name(), &Query::id(id))?;
            if kind.is_branch3() {
                self.graphs.delete_branch3(&removed)?;
            } else {
                self.graphs.delete_branch(&removed)?;
            }
            tracing::debug!("Deleted {kind} {id}.");
        }
        self.delete_dependents(&ids)
    }

    /// Deletes regulators and sensors attached to any of `ids`.
    fn delete_dependents(&mut self, ids: &[i64]) -> Result<(), Error> {
        self.arrays.remove_where(
            ArrayKind::TransformerTapRegulator.name(),
            &Query::new().is_in("regulated_object", ids.iter().copied()),
        )?;
        for kind in [
            ArrayKind::SymPowerSensor,
            ArrayKind::SymVoltageSensor,
            ArrayKind::AsymVoltageSensor,
        ] {
            self.arrays.remove_where(
                kind.name(),
                &Query::new().is_in("measured_object", ids.iter().copied()),
            )?;
        }
        Ok(())
    }

    /// Switches branches on at both sides and adds them to the active graph.
    pub fn make_active(&mut self, branch: &RecordArray) -> Result<(), Error> {
        for &id in branch.ids()? {
            let (kind, from, to, was_active) = self.branch_state(id)?;
            self.array_mut(kind)?.update_by_id(
                &[id],
                &[
                    ("from_status", Values::scalar(1)),
                    ("to_status", Values::scalar(1)),
                ],
                false,
            )?;
            if !was_active {
                self.graphs.active_graph_mut().add_branch(from, to)?;
            }
            tracing::debug!("Activated {kind} {id}.");
        }
        Ok(())
    }

    /// Switches branches off at one side and removes them from the active
    /// graph.
    pub fn make_inactive(&mut self, branch: &RecordArray, side: BranchSide) -> Result<(), Error> {
        for &id in branch.ids()? {
            let (kind, from, to, was_active) = self.branch_state(id)?;
            self.array_mut(kind)?.update_by_id(
                &[id],
                &[(side.status_column(), Values::scalar(0))],
                false,
            )?;
            if was_active {
                self.graphs
                    .active_graph_mut()
                    .delete_branch(from, to, true)?;
            }
            tracing::debug!("Deactivated {kind} {id} at the {side:?} side.");
        }
        Ok(())
    }

    /// The member array, nodes and active state of a two-terminal branch.
    fn branch_state(&self, id: i64) -> Result<(ArrayKind, i64, i64, bool), Error> {
        let kind = self.kind_of(id, &ArrayKind::BRANCHES)?;
        let current = self.array(kind)?.get(&Query::id(id))?;
        let row = current.record()?;
        let active = row.int("from_status")? == 1 && row.int("to_status")? == 1;
        Ok((kind, row.int("from_node")?, row.int("to_node")?, active))
    }

    /// Swaps the from and to sides of two-terminal branches.
    ///
    /// The graphs are undirected and need no update.
    pub fn reverse_branches(&mut self, branches: &RecordArray) -> Result<(), Error> {
        if branches.is_empty() {
            return Ok(());
        }
        let ids = branches.ids()?.to_vec();
        for &id in &ids {
            self.kind_of(id, &ArrayKind::BRANCHES)?;
        }
        for kind in ArrayKind::BRANCHES {
            let array = self.array_mut(kind)?;
            if array.is_empty() {
                continue;
            }
            let mask = array.filter_mask(&Query::ids(ids.iter().copied()))?;
            for (from, to) in [("from_node", "to_node"), ("from_status", "to_status")] {
                let from_values = array.ints(from)?.to_vec();
                let to_values = array.ints(to)?.to_vec();
                array.set_values(
                    from,
                    mask.iter()
                        .enumerate()
                        .map(|(row, &swap)| if swap { to_values[row] } else { from_values[row] }),
                )?;
                array.set_values(
                    to,
                    mask.iter()
                        .enumerate()
                        .map(|(row, &swap)| if swap { from_values[row] } else { to_values[row] }),
                )?;
            }
        }
        tracing::debug!("Reversed {} branches.", ids.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayType;
    use crate::arrays::{
        LineArray, LinkArray, NodeArray, SymVoltageSensorArray, ThreeWindingTransformerArray,
        TransformerArray, TransformerTapRegulatorArray,
    };
    use crate::test_utils::{basic_grid, three_winding_grid};
    use crate::ErrorKind;

    #[test]
    fn test_add_node() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let added = grid.add_node(&NodeArray::zeros(1)?)?;
        let id = added.ids()?[0];
        assert_eq!(id, 602);
        assert_eq!(grid.node()?.len(), 7);
        assert!(grid.graphs().active_graph().has_node(id));
        assert!(grid.graphs().complete_graph().has_node(id));

        assert!(grid
            .add_node(&LineArray::zeros(1)?)
            .is_err_and(|e| e.kind() == ErrorKind::InvalidType));
        Ok(())
    }

    #[test]
    fn test_delete_node() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let substation = grid.node()?.get(&Query::id(101))?;
        grid.delete_node(&substation)?;

        assert_eq!(grid.node()?.len(), 5);
        assert!(!grid.graphs().complete_graph().has_node(101));
        assert!(!grid.graphs().active_graph().has_node(101));
        assert_eq!(grid.line()?.ids()?, &[202, 203]);
        assert!(grid.source()?.is_empty());
        assert_eq!(grid.graphs().complete_graph().nr_branches(), 4);
        assert_eq!(grid.graphs().active_graph().nr_branches(), 3);
        Ok(())
    }

    #[test]
    fn test_delete_node_cascades() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let sensor = SymVoltageSensorArray::builder()
            .column("measured_object", [106])
            .build()?;
        grid.append(&sensor, true)?;

        let node = grid.node()?.get(&Query::id(106))?;
        grid.delete_node(&node)?;
        assert!(grid.transformer()?.is_empty());
        assert!(grid.sym_voltage_sensor()?.is_empty());
        assert!(!grid.graphs().complete_graph().has_branch(102, 106));

        let node = grid.node()?.get(&Query::id(102))?;
        grid.delete_node(&node)?;
        assert_eq!(grid.sym_load()?.ids()?, &[402, 403, 404]);
        Ok(())
    }

    #[test]
    fn test_delete_node_with_three_winding_transformer() -> Result<(), Error> {
        let mut grid = three_winding_grid()?;
        assert!(grid.graphs().complete_graph().has_branch(102, 103));

        let node = grid.node()?.get(&Query::id(101))?;
        grid.delete_node(&node)?;
        assert!(grid.three_winding_transformer()?.is_empty());
        assert!(!grid.graphs().complete_graph().has_branch(102, 103));
        assert!(!grid.graphs().active_graph().has_branch(102, 103));
        Ok(())
    }

    #[test]
    fn test_add_branch() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let line = LineArray::builder()
            .column("from_node", [102])
            .column("to_node", [105])
            .column("from_status", [1])
            .column("to_status", [1])
            .build()?;
        grid.add_branch(&line)?;
        assert_eq!(grid.line()?.len(), 5);
        assert!(grid.graphs().complete_graph().has_branch(102, 105));
        assert!(grid.graphs().active_graph().has_branch(102, 105));

        for schema in [LinkArray::schema(), TransformerArray::schema()] {
            let branch = crate::RecordArray::builder(&schema)
                .column("from_node", [105])
                .column("to_node", [103])
                .column("from_status", [1])
                .column("to_status", [0])
                .build()?;
            grid.add_branch(&branch)?;
        }
        assert_eq!(grid.link()?.len(), 2);
        assert_eq!(grid.transformer()?.len(), 2);
        assert!(!grid.graphs().active_graph().has_branch(105, 103));

        assert!(grid
            .add_branch(&NodeArray::zeros(1)?)
            .is_err_and(|e| e.kind() == ErrorKind::InvalidType));
        Ok(())
    }

    #[test]
    fn test_delete_branch() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let active = grid.line()?.get(&Query::id(201))?;
        grid.delete_branch(&active)?;
        assert_eq!(grid.line()?.len(), 3);
        assert!(!grid.graphs().complete_graph().has_branch(101, 102));
        assert!(!grid.graphs().active_graph().has_branch(101, 102));

        let inactive = grid.line()?.get(&Query::id(203))?;
        grid.delete_branch(&inactive)?;
        assert_eq!(grid.line()?.ids()?, &[202, 204]);
        assert!(!grid.graphs().complete_graph().has_branch(103, 104));

        let node = grid.node()?.get(&Query::id(102))?;
        assert!(grid
            .delete_branch(&node)
            .is_err_and(|e| e.kind() == ErrorKind::RecordDoesNotExist));
        Ok(())
    }

    #[test]
    fn test_delete_branch_with_regulator() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let regulator = TransformerTapRegulatorArray::builder()
            .column("regulated_object", [301])
            .column("status", [1])
            .build()?;
        grid.append(&regulator, true)?;

        let transformer = grid.transformer()?.get(&Query::id(301))?;
        grid.delete_branch(&transformer)?;
        assert!(grid.transformer()?.is_empty());
        assert!(grid.transformer_tap_regulator()?.is_empty());
        assert!(!grid.graphs().complete_graph().has_branch(102, 106));
        Ok(())
    }

    #[test]
    fn test_delete_three_winding_transformer() -> Result<(), Error> {
        let mut grid = three_winding_grid()?;
        let transformer = ThreeWindingTransformerArray::builder().column("id", [301]).build()?;
        grid.delete_branch(&transformer)?;
        assert!(grid.three_winding_transformer()?.is_empty());
        for (a, b) in [(101, 102), (101, 103), (102, 103)] {
            assert!(!grid.graphs().complete_graph().has_branch(a, b));
        }
        Ok(())
    }

    #[test]
    fn test_make_active() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let line = grid.line()?.get(&Query::id(203))?;
        assert!(!grid.graphs().active_graph().has_branch(103, 104));

        grid.make_active(&line)?;
        assert!(grid.graphs().active_graph().has_branch(103, 104));
        let after = grid.line()?.get(&Query::id(203))?;
        assert_eq!(after.ints("from_status")?, &[1]);
        assert_eq!(after.ints("to_status")?, &[1]);

        grid.make_active(&line)?;
        assert_eq!(grid.graphs().active_graph().nr_branches(), 6);
        Ok(())
    }

    #[test]
    fn test_make_inactive() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let line = grid.line()?.get(&Query::id(202))?;
        grid.make_inactive(&line, BranchSide::default())?;
        let after = grid.line()?.get(&Query::id(202))?;
        assert_eq!(after.ints("from_status")?, &[1]);
        assert_eq!(after.ints("to_status")?, &[0]);
        assert!(!grid.graphs().active_graph().has_branch(102, 103));
        assert!(grid.graphs().complete_graph().has_branch(102, 103));

        let mut grid = basic_grid()?;
        grid.make_inactive(&line, BranchSide::From)?;
        let after = grid.line()?.get(&Query::id(202))?;
        assert_eq!(after.ints("from_status")?, &[0]);
        assert_eq!(after.ints("to_status")?, &[1]);

        grid.make_inactive(&line, BranchSide::To)?;
        assert_eq!(grid.graphs().active_graph().nr_branches(), 4);
        Ok(())
    }

    #[test]
    fn test_reverse_branches() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let line = grid.line()?.get(&Query::id(202))?;
        grid.make_inactive(&line, BranchSide::From)?;
        let selection = grid.branches()?.filter(&Query::ids([202, 301]))?;
        grid.reverse_branches(&selection)?;

        let line = grid.line()?.get(&Query::id(202))?;
        assert_eq!(line.ints("from_node")?, &[103]);
        assert_eq!(line.ints("to_node")?, &[102]);
        assert_eq!(line.ints("from_status")?, &[1]);
        assert_eq!(line.ints("to_status")?, &[0]);
        assert_eq!(grid.transformer()?.ints("from_node")?, &[106]);
        assert_eq!(grid.line()?.ints("from_node")?, &[101, 103, 103, 101]);

        let before = grid.branches()?;
        grid.reverse_branches(&LineArray::new()?)?;
        assert!(crate::array::array_equal(&before, &grid.branches()?, true));
        Ok(())
    }
}
