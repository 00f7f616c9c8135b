// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for creating [`Grid`] instances and appending to them.

use super::Grid;
use crate::array::RecordArray;
use crate::arrays::{Branch3Columns, BranchColumns};
use crate::{ArrayContainer, ArrayKind, Error, GraphContainer, GridConfig, EMPTY_ID};
use std::collections::HashSet;

/// `Grid` instantiation.
impl Grid {
    /// Creates a grid without rows, with the built-in schemas.
    pub fn empty() -> Result<Self, Error> {
        Self::with_config(GridConfig::default())
    }

    /// Creates a grid without rows, with the schemas chosen by `config`.
    ///
    /// Fails with `InvalidType` if a configured schema does not extend the
    /// built-in schema of its member array.
    pub fn with_config(config: GridConfig) -> Result<Self, Error> {
        let mut arrays = ArrayContainer::new();
        for kind in ArrayKind::ALL {
            let schema = config.schema(kind);
            let built_in = kind.schema();
            if !schema.is_a(built_in.name()) {
                return Err(Error::invalid_type(format!(
                    "Schema {} of the {kind} array does not extend {}.",
                    schema.name(),
                    built_in.name()
                )));
            }
            arrays.insert(kind.name(), RecordArray::new(&schema)?);
        }
        Ok(Self {
            config,
            arrays,
            graphs: GraphContainer::empty(),
        })
    }

    /// Creates a grid from complete member arrays.
    ///
    /// Arrays are converted to the schemas of `config`. The id counter is
    /// set to `id_counter` or the highest id in the arrays, whichever is
    /// larger, and the graphs are built from the arrays.
    pub(crate) fn from_member_arrays(
        config: GridConfig,
        arrays: impl IntoIterator<Item = (ArrayKind, RecordArray)>,
        id_counter: i64,
    ) -> Result<Self, Error> {
        let mut grid = Self::with_config(config)?;
        let mut max_id = id_counter;
        for (kind, array) in arrays {
            let schema = grid.config.schema(kind);
            let array = if schema.same_layout(array.schema()) {
                array
            } else {
                array.convert_to(&schema)?
            };
            if let Some(&id) = array.ids()?.iter().filter(|&&id| id != EMPTY_ID).max() {
                max_id = max_id.max(id);
            }
            *grid.array_mut(kind)? = array;
        }
        grid.arrays.set_id_counter(max_id);
        grid.check_ids()?;
        grid.rebuild_graphs()?;
        Ok(grid)
    }

    /// Rebuilds both graphs from the node and branch arrays.
    pub fn rebuild_graphs(&mut self) -> Result<(), Error> {
        self.graphs = GraphContainer::from_arrays(self)?;
        Ok(())
    }

    /// Appends `array` to the member array of its kind.
    ///
    /// The rows are converted to the schema of the member array, and rows
    /// without an id get fresh ones, see [`ArrayContainer::append`]. Nodes
    /// and branches are added to the graphs as well.
    ///
    /// Fails with `InvalidType` if the array does not belong to a grid,
    /// with `InvalidGraph` if a node already exists and with `MissingNode` if
    /// a branch refers to a node that does not. Nothing is appended then.
    ///
    /// Returns the appended rows.
    pub fn append(&mut self, array: &RecordArray, check_max_id: bool) -> Result<RecordArray, Error> {
        let kind = array.schema().kind().ok_or_else(|| {
            Error::invalid_type(format!(
                "{} is not a member array of a grid.",
                array.schema().name()
            ))
        })?;
        self.check_topology(kind, array)?;

        let rows = self.arrays.append(kind.name(), array, check_max_id)?;
        match kind {
            ArrayKind::Node => self.graphs.add_node(&rows)?,
            kind if kind.is_branch() => self.graphs.add_branch(&rows)?,
            kind if kind.is_branch3() => self.graphs.add_branch3(&rows)?,
            _ => {}
        }
        tracing::debug!("Appended {} rows to the {kind} array.", rows.len());
        Ok(rows)
    }

    /// Checks that appending `array` keeps the graphs consistent.
    fn check_topology(&self, kind: ArrayKind, array: &RecordArray) -> Result<(), Error> {
        let node_ids = match kind {
            ArrayKind::Node => {
                let mut seen = HashSet::new();
                for &id in array.ids()? {
                    if id == EMPTY_ID {
                        continue;
                    }
                    if !seen.insert(id) || self.graphs.complete_graph().has_node(id) {
                        return Err(Error::invalid_graph(format!(
                            "Node {id} already exists in the graph."
                        )));
                    }
                }
                return Ok(());
            }
            kind if kind.is_branch() => array.node_ids()?,
            kind if kind.is_branch3() => array.as_branches()?.node_ids()?,
            _ => return Ok(()),
        };
        match node_ids
            .into_iter()
            .find(|&id| !self.graphs.complete_graph().has_node(id))
        {
            Some(id) => Err(Error::missing_node(format!(
                "Cannot append {}: node {id} is not in the grid.",
                array.schema().name()
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ArrayType, DType, Schema};
    use crate::arrays::{LineArray, NodeArray, SymLoadArray};
    use crate::test_utils::{basic_grid, build_basic_grid, FancyTestArray};
    use crate::ErrorKind;

    #[test]
    fn test_empty() -> Result<(), Error> {
        let grid = Grid::empty()?;
        assert!(grid.all_arrays().all(RecordArray::is_empty));
        assert_eq!(grid.graphs().complete_graph().nr_nodes(), 0);
        assert_eq!(grid.id_counter(), 0);
        Ok(())
    }

    #[test]
    fn test_basic_grid() -> Result<(), Error> {
        let grid = basic_grid()?;
        assert_eq!(grid.node()?.len(), 6);
        assert_eq!(grid.graphs().active_graph().nr_branches(), 5);
        assert_eq!(grid.graphs().complete_graph().nr_branches(), 6);
        assert_eq!(grid.id_counter(), 601);
        Ok(())
    }

    #[test]
    fn test_append_assigns_ids() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let rows = grid.append(&NodeArray::zeros(2)?, true)?;
        assert_eq!(rows.ids()?, &[602, 603]);
        assert_eq!(grid.id_counter(), 603);
        assert!(grid.graphs().active_graph().has_node(603));

        assert!(grid
            .append(&NodeArray::builder().column("id", [10]).build()?, true)
            .is_err_and(|e| e.kind() == ErrorKind::InvalidValue));
        Ok(())
    }

    #[test]
    fn test_append_rejected() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        assert!(grid
            .append(&FancyTestArray::zeros(1)?, false)
            .is_err_and(|e| e.kind() == ErrorKind::InvalidType));

        let duplicate = NodeArray::builder().column("id", [102]).build()?;
        assert!(grid
            .append(&duplicate, false)
            .is_err_and(|e| e.kind() == ErrorKind::InvalidGraph));

        let dangling = LineArray::builder()
            .column("from_node", [101])
            .column("to_node", [999])
            .build()?;
        assert!(grid
            .append(&dangling, false)
            .is_err_and(|e| e.kind() == ErrorKind::MissingNode));

        assert_eq!(grid.node()?.len(), 6);
        assert_eq!(grid.line()?.len(), 4);
        assert_eq!(grid.graphs().complete_graph().nr_branches(), 6);
        Ok(())
    }

    #[test]
    fn test_append_appliance() -> Result<(), Error> {
        let mut grid = basic_grid()?;
        let load = SymLoadArray::builder().column("node", [106]).build()?;
        let rows = grid.append(&load, true)?;
        assert_eq!(rows.ids()?, &[602]);
        assert_eq!(grid.sym_load()?.len(), 5);
        Ok(())
    }

    #[test]
    fn test_custom_config() -> Result<(), Error> {
        let line = Schema::builder("CustomLineArray")
            .extends(&LineArray::schema())
            .column("extra_field", DType::I64)
            .default("extra_field", 7)
            .build()?;
        let mut grid = Grid::with_config(GridConfig::default().with_schema(ArrayKind::Line, line))?;
        let nodes = grid.append(&NodeArray::zeros(2)?, true)?;

        let line = LineArray::builder()
            .column("from_node", [nodes.ids()?[0]])
            .column("to_node", [nodes.ids()?[1]])
            .column("from_status", [1])
            .column("to_status", [1])
            .build()?;
        grid.append(&line, true)?;
        assert_eq!(grid.line()?.len(), 1);
        assert_eq!(grid.line()?.ints("extra_field")?, &[7]);
        assert_eq!(grid.graphs().active_graph().external_ids().len(), 2);
        assert_eq!(grid.graphs().active_graph().nr_branches(), 1);

        let mut custom = Grid::with_config(grid.config().clone())?;
        build_basic_grid(&mut custom)?;
        assert_eq!(custom.line()?.schema().name(), "CustomLineArray");
        Ok(())
    }

    #[test]
    fn test_config_must_extend_built_in() -> Result<(), Error> {
        let config = GridConfig::default().with_schema(ArrayKind::Line, NodeArray::schema());
        assert!(Grid::with_config(config).is_err_and(|e| e.kind() == ErrorKind::InvalidType));
        Ok(())
    }

    #[test]
    fn test_from_member_arrays() -> Result<(), Error> {
        let grid = basic_grid()?;
        let arrays = ArrayKind::ALL
            .into_iter()
            .map(|kind| Ok((kind, grid.array(kind)?.clone())))
            .collect::<Result<Vec<_>, Error>>()?;
        let rebuilt = Grid::from_member_arrays(GridConfig::default(), arrays, 0)?;
        assert_eq!(rebuilt.id_counter(), 601);
        assert_eq!(rebuilt.graphs().active_graph().nr_branches(), 5);
        assert_eq!(rebuilt.graphs().complete_graph().nr_branches(), 6);
        Ok(())
    }
}
