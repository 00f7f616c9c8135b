// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A power grid: the member arrays of all grid components, in one id space,
//! and the graphs derived from them.

mod creation;
mod feeders;
mod mutation;
mod search;
mod snapshot;
mod text;

pub use mutation::BranchSide;
pub use snapshot::{ArraySnapshot, GridSnapshot};

use crate::array::{concatenate, ArrayType, Query, Record, RecordArray};
use crate::arrays::{BranchArray, NodeType};
use crate::{ArrayContainer, ArrayKind, Error, GraphContainer, GridConfig};

/// A power grid.
///
/// The grid holds one record array per [`ArrayKind`], all sharing the id
/// space of an [`ArrayContainer`], and a [`GraphContainer`] that mirrors the
/// topology of the node and branch arrays.
///
/// Mutations through the grid keep arrays and graphs in sync. Arrays changed
/// directly through [`array_mut`][Grid::array_mut] need a call to
/// [`rebuild_graphs`][Grid::rebuild_graphs] afterwards.
#[derive(Clone, Debug)]
pub struct Grid {
    config: GridConfig,
    arrays: ArrayContainer,
    graphs: GraphContainer,
}

/// Generates the accessors for the member arrays.
macro_rules! member_arrays {
    ($(($name:ident, $kind:ident)),*) => {
        impl Grid {
            $(
                #[doc = concat!("The `", stringify!($name), "` member array.")]
                pub fn $name(&self) -> Result<&RecordArray, Error> {
                    self.array(ArrayKind::$kind)
                }
            )*
        }
    };
}

member_arrays!(
    (node, Node),
    (transformer, Transformer),
    (three_winding_transformer, ThreeWindingTransformer),
    (line, Line),
    (link, Link),
    (source, Source),
    (sym_load, SymLoad),
    (sym_gen, SymGen),
    (transformer_tap_regulator, TransformerTapRegulator),
    (sym_power_sensor, SymPowerSensor),
    (sym_voltage_sensor, SymVoltageSensor),
    (asym_voltage_sensor, AsymVoltageSensor)
);

impl Grid {
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// The member array of the given kind.
    pub fn array(&self, kind: ArrayKind) -> Result<&RecordArray, Error> {
        self.arrays.array(kind.name())
    }

    /// Mutable access to the member array of the given kind.
    ///
    /// The graphs are not updated; call
    /// [`rebuild_graphs`][Grid::rebuild_graphs] after changing nodes,
    /// branches or statuses here.
    pub fn array_mut(&mut self, kind: ArrayKind) -> Result<&mut RecordArray, Error> {
        self.arrays.array_mut(kind.name())
    }

    /// The member arrays, in [`ArrayKind::ALL`] order.
    pub fn all_arrays(&self) -> impl Iterator<Item = &RecordArray> {
        self.arrays.all_arrays()
    }

    pub fn graphs(&self) -> &GraphContainer {
        &self.graphs
    }

    /// Mutable access to the graphs.
    ///
    /// Changes made here are not reflected in the arrays.
    pub fn graphs_mut(&mut self) -> &mut GraphContainer {
        &mut self.graphs
    }

    /// The highest id handed out or appended so far.
    pub fn id_counter(&self) -> i64 {
        self.arrays.id_counter()
    }

    /// Checks that no id occurs twice across the member arrays.
    pub fn check_ids(&self) -> Result<(), Error> {
        self.arrays.check_ids()
    }

    /// Every row holding `id`, across all member arrays.
    pub fn search_for_id(&self, id: i64) -> Result<Vec<Record<'_>>, Error> {
        self.arrays.search_for_id(id)
    }

    /// All transformers, lines and links, in that order, as one
    /// [`BranchArray`].
    pub fn branches(&self) -> Result<RecordArray, Error> {
        let schema = BranchArray::schema();
        let parts = ArrayKind::BRANCHES
            .iter()
            .map(|&kind| self.array(kind)?.convert_to(&schema))
            .collect::<Result<Vec<_>, _>>()?;
        concatenate(&parts.iter().collect::<Vec<_>>())
    }

    /// The ids of the substation nodes, in node array order.
    pub fn substation_ids(&self) -> Result<Vec<i64>, Error> {
        let substations = self.node()?.filter(
            &Query::new().eq("node_type", NodeType::SubstationNode.value()),
        )?;
        Ok(substations.ids()?.to_vec())
    }

    /// The kind of the first of `kinds` whose member array holds `id`.
    fn kind_of(&self, id: i64, kinds: &[ArrayKind]) -> Result<ArrayKind, Error> {
        for &kind in kinds {
            if self.array(kind)?.ids()?.contains(&id) {
                return Ok(kind);
            }
        }
        Err(Error::record_does_not_exist(format!(
            "No branch with id {id} in the grid."
        )))
    }
}
