// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The boundary to a power flow solver.
//!
//! The solver is an opaque engine behind the [`PowerFlowSolver`] trait. It
//! takes one input table per member array of a grid, with the columns of
//! [`input_schema`], and returns one table per member array with the columns
//! of [`output_schema`].

use crate::array::{Columnar, RecordArray, Values};
use crate::arrays::{input_schema, output_schema};
use crate::{ArrayKind, Error, Grid, GridConfig};
use std::collections::BTreeMap;

/// Solver tables by member array kind.
pub type SolverData = BTreeMap<ArrayKind, RecordArray>;

/// How the solver may move transformer taps that have a regulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TapChangingStrategy {
    #[default]
    Disabled,
    AnyValidTap,
    MinVoltageTap,
    MaxVoltageTap,
    FastAnyTap,
}

/**
This trait needs to be implemented by the power flow engine.

The engine is created from a full set of input tables and may keep state
between calculations. Updates passed to
[`calculate_power_flow`][PowerFlowSolver::calculate_power_flow] only apply to
that calculation; updates passed to [`update`][PowerFlowSolver::update] are
kept.

<details>
<summary>Example implementation that reports every node at its rated voltage:</summary>

```ignore
struct FlatStart {
    input: SolverData,
}

impl PowerFlowSolver for FlatStart {
    fn new(input: &SolverData) -> Result<Self, Error> {
        Ok(Self { input: input.clone() })
    }

    fn calculate_power_flow(
        &mut self,
        _update: Option<&SolverData>,
        _strategy: TapChangingStrategy,
    ) -> Result<SolverData, Error> {
        let nodes = &self.input[&ArrayKind::Node];
        let mut output = RecordArray::empty(&output_schema(ArrayKind::Node), nodes.len())?;
        output.set_values("id", nodes.ids()?.iter().copied())?;
        output.set_values("u", nodes.floats("u_rated")?.iter().copied())?;
        Ok(SolverData::from([(ArrayKind::Node, output)]))
    }

    fn update(&mut self, _update: &SolverData) -> Result<(), Error> {
        Ok(())
    }
}
```

</details>
*/
pub trait PowerFlowSolver: Sized {
    /// Creates the solver model from input tables.
    fn new(input: &SolverData) -> Result<Self, Error>;

    /// Runs a calculation, with `update` applied on top of the model for
    /// this calculation only, and returns the output tables.
    fn calculate_power_flow(
        &mut self,
        update: Option<&SolverData>,
        strategy: TapChangingStrategy,
    ) -> Result<SolverData, Error>;

    /// Applies `update` to the model permanently.
    fn update(&mut self, update: &SolverData) -> Result<(), Error>;
}

/// Runs power flow calculations for a [`Grid`] and writes results back.
///
/// Results can only be written to grids whose member arrays were extended
/// with the output columns of the solver, see [`GridConfig`].
pub struct PowerGridModelInterface<S> {
    grid: Grid,
    input: SolverData,
    output: Option<SolverData>,
    model: Option<S>,
}

impl<S: PowerFlowSolver> PowerGridModelInterface<S> {
    /// Creates an interface for `grid`. The solver model is created on the
    /// first calculation.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            input: SolverData::new(),
            output: None,
            model: None,
        }
    }

    /// Creates an interface from prepared input tables, without a grid.
    pub fn from_input_data(input: SolverData) -> Result<Self, Error> {
        Ok(Self {
            grid: Grid::empty()?,
            input,
            output: None,
            model: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn input(&self) -> &SolverData {
        &self.input
    }

    /// The output of the last calculation.
    pub fn output(&self) -> Option<&SolverData> {
        self.output.as_ref()
    }

    /// Converts the member arrays of the grid to solver input tables.
    pub fn create_input_from_grid(&mut self) -> Result<&SolverData, Error> {
        let mut input = SolverData::new();
        for kind in ArrayKind::ALL {
            input.insert(kind, self.grid.array(kind)?.convert_to(&input_schema(kind))?);
        }
        self.input = input;
        self.model = None;
        Ok(&self.input)
    }

    fn model(&mut self) -> Result<&mut S, Error> {
        if self.input.is_empty() {
            self.create_input_from_grid()?;
        }
        if self.model.is_none() {
            tracing::debug!("Creating the solver model from {} tables.", self.input.len());
            self.model = Some(S::new(&self.input)?);
        }
        self.model
            .as_mut()
            .ok_or_else(|| Error::internal("The solver model was not created."))
    }

    /// Runs a power flow calculation and keeps its output.
    ///
    /// Input tables are created from the grid if there are none yet.
    pub fn calculate_power_flow(
        &mut self,
        update: Option<&SolverData>,
        strategy: TapChangingStrategy,
    ) -> Result<&SolverData, Error> {
        let output = self.model()?.calculate_power_flow(update, strategy)?;
        Ok(&*self.output.insert(output))
    }

    /// Applies `update` to the solver model permanently.
    pub fn update_model(&mut self, update: &SolverData) -> Result<(), Error> {
        self.model()?.update(update)
    }

    /// Copies the output of the last calculation into the grid arrays,
    /// matching rows by id.
    ///
    /// Fails with `InvalidValue` if there is no output yet, and, naming
    /// them, if output columns are missing from the grid arrays. Nothing is
    /// written then.
    pub fn update_grid(&mut self) -> Result<(), Error> {
        let output = self.output.as_ref().ok_or_else(|| {
            Error::invalid_value("No power flow output to write to the grid.")
        })?;

        let mut missing = vec![];
        for (kind, table) in output {
            let array = self.grid.array(*kind)?;
            for column in table.column_names().filter(|&c| c != "id") {
                if !array.has_column(column) {
                    missing.push(format!("{}.{column}", array.schema().name()));
                }
            }
        }
        if !missing.is_empty() {
            return Err(Error::invalid_value(format!(
                "Grid arrays lack the output columns: {}.",
                missing.join(", ")
            )));
        }

        for (kind, table) in output {
            let updates = table
                .column_names()
                .filter(|&c| c != "id")
                .map(|c| table.column_values(c).map(|v| (c, Values::List(v))))
                .collect::<Result<Vec<_>, Error>>()?;
            self.grid
                .array_mut(*kind)?
                .update_by_id(table.ids()?, &updates, false)?;
        }
        tracing::debug!("Wrote power flow output of {} tables to the grid.", output.len());
        Ok(())
    }

    /// Creates a grid from the input tables, with the schemas of `config`.
    ///
    /// Fails with `InvalidValue`, naming them, if columns without a default
    /// are missing from the input.
    pub fn create_grid_from_input_data(&self, config: GridConfig) -> Result<Grid, Error> {
        let arrays = self
            .input
            .iter()
            .map(|(&kind, array)| (kind, array.clone()));
        Grid::from_member_arrays(config, arrays, 0)
    }
}

/// The output table of `kind` for `ids`, with every output value empty.
pub fn empty_output(kind: ArrayKind, ids: &[i64]) -> Result<RecordArray, Error> {
    let mut output = RecordArray::empty(&output_schema(kind), ids.len())?;
    output.set_values("id", ids.iter().copied())?;
    Ok(output)
}
