// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Test arrays and grids shared by the test modules of the crate.

use crate::array::{ArrayType, DType, Schema};
use crate::arrays::{
    array_type, built_in, LineArray, LinkArray, NodeArray, NodeType, SourceArray, SymLoadArray,
    ThreeWindingTransformerArray, TransformerArray,
};
use crate::{Error, Grid};
use once_cell::sync::Lazy;
use std::sync::Arc;

static FANCY_TEST: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("FancyTestArray")
            .column("id", DType::I32)
            .column("test_int", DType::I64)
            .column("test_float", DType::F64)
            .column("test_str", DType::Str)
            .column("test_bool", DType::Bool),
    )
});

array_type!(
    /// An array with a column of every basic type and no defaults.
    FancyTestArray => FANCY_TEST
);

pub(crate) fn fancy_test_array() -> Result<crate::RecordArray, Error> {
    FancyTestArray::builder()
        .column("id", [1, 2, 3])
        .column("test_int", [3, 0, 4])
        .column("test_float", [4.0, 4.0, 1.0])
        .column("test_str", ["a", "c", "d"])
        .column("test_bool", [true, false, true])
        .build()
}

/// A grid with one substation feeding a ring that is open between 103 and
/// 104.
///
/// ```text
/// (S) 101 --- 102 --- 103 -|- 104 --- 105 --- 101 (S)
///      201    {-}  202     203     601     204
///             301
///             106
/// ```
pub(crate) fn basic_grid() -> Result<Grid, Error> {
    let mut grid = Grid::empty()?;
    build_basic_grid(&mut grid)?;
    Ok(grid)
}

/// Adds the arrays of [`basic_grid`] to `grid`.
pub(crate) fn build_basic_grid(grid: &mut Grid) -> Result<(), Error> {
    let substation = NodeArray::builder()
        .column("id", [101])
        .column("u_rated", [10_500.0])
        .column("node_type", [NodeType::SubstationNode.value()])
        .build()?;
    grid.append(&substation, false)?;

    let nodes = NodeArray::builder()
        .column("id", [102, 103, 104, 105, 106])
        .column("u_rated", [10_500.0, 10_500.0, 10_500.0, 10_500.0, 400.0])
        .build()?;
    grid.append(&nodes, false)?;

    let lines = LineArray::builder()
        .column("id", [201, 202, 203, 204])
        .column("from_status", [1, 1, 0, 1])
        .column("to_status", [1, 1, 0, 1])
        .column("from_node", [101, 102, 103, 101])
        .column("to_node", [102, 103, 104, 105])
        .column("i_n", [200.0; 4])
        .column("r1", [0.1; 4])
        .column("x1", [0.03; 4])
        .column("c1", [0.0; 4])
        .column("tan1", [0.0; 4])
        .build()?;
    grid.append(&lines, false)?;

    let transformer = TransformerArray::builder()
        .column("id", [301])
        .column("from_status", [1])
        .column("to_status", [1])
        .column("from_node", [102])
        .column("to_node", [106])
        .build()?;
    grid.append(&transformer, false)?;

    let link = LinkArray::builder()
        .column("id", [601])
        .column("from_status", [1])
        .column("to_status", [1])
        .column("from_node", [104])
        .column("to_node", [105])
        .build()?;
    grid.append(&link, false)?;

    let loads = SymLoadArray::builder()
        .column("id", [401, 402, 403, 404])
        .column("node", [102, 103, 104, 105])
        .column("type", [1; 4])
        .column("p_specified", [1e6; 4])
        .column("q_specified", [1e6; 4])
        .column("status", [1; 4])
        .build()?;
    grid.append(&loads, false)?;

    let source = SourceArray::builder()
        .column("id", [501])
        .column("node", [101])
        .column("status", [1])
        .column("u_ref", [0.0])
        .build()?;
    grid.append(&source, false)?;

    grid.check_ids()
}

/// A grid fed from a 150 kV substation through a three-winding transformer.
///
/// ```text
/// (S) 101          /102 --- 104 -|- 105 --- 106 --- 102 (S)
///        \{  301  }
///                  \103 --- 107 -|- 108 --- 109 --- 103 (S)
/// ```
pub(crate) fn three_winding_grid() -> Result<Grid, Error> {
    let mut grid = Grid::empty()?;

    let nodes = NodeArray::builder()
        .column("id", [104, 105, 106, 107, 108, 109])
        .column("u_rated", [10_500.0; 6])
        .build()?;
    grid.append(&nodes, false)?;

    let substations = NodeArray::builder()
        .column("id", [101, 102, 103])
        .column("u_rated", [150_000.0, 20_000.0, 10_000.0])
        .column("node_type", [NodeType::SubstationNode.value(); 3])
        .build()?;
    grid.append(&substations, false)?;

    let lines = LineArray::builder()
        .column("id", [201, 202, 203, 204, 205, 206, 207, 208])
        .column("from_status", [1; 8])
        .column("to_status", [1, 0, 1, 1, 1, 0, 1, 1])
        .column("from_node", [102, 104, 106, 102, 103, 107, 109, 103])
        .column("to_node", [104, 105, 105, 106, 107, 108, 108, 109])
        .column("i_n", [200.0; 8])
        .column("r1", [0.1; 8])
        .column("x1", [0.03; 8])
        .column("c1", [0.0; 8])
        .column("tan1", [0.0; 8])
        .build()?;
    grid.append(&lines, false)?;

    let transformer = ThreeWindingTransformerArray::builder()
        .column("id", [301])
        .column("node_1", [101])
        .column("node_2", [102])
        .column("node_3", [103])
        .column("status_1", [1])
        .column("status_2", [1])
        .column("status_3", [1])
        .column("u1", [150_000.0])
        .column("u2", [20_000.0])
        .column("u3", [10_000.0])
        .column("sn_1", [1e5])
        .column("sn_2", [1e5])
        .column("sn_3", [1e5])
        .column("uk_12", [0.09])
        .column("uk_13", [0.06])
        .column("uk_23", [0.06])
        .column("winding_1", [2])
        .column("winding_2", [1])
        .column("winding_3", [1])
        .column("clock_12", [5])
        .column("clock_13", [5])
        .column("tap_min", [-10])
        .column("tap_max", [10])
        .column("tap_size", [1380.0])
        .build()?;
    grid.append(&transformer, false)?;

    let loads = SymLoadArray::builder()
        .column("id", [401, 402, 403, 404, 405, 406])
        .column("node", [104, 105, 106, 107, 108, 109])
        .column("type", [1; 6])
        .column("p_specified", [1e6; 6])
        .column("q_specified", [1e6; 6])
        .column("status", [1; 6])
        .build()?;
    grid.append(&loads, false)?;

    let source = SourceArray::builder()
        .column("id", [501])
        .column("node", [101])
        .column("status", [1])
        .column("u_ref", [0.0])
        .build()?;
    grid.append(&source, false)?;

    grid.check_ids()?;
    Ok(grid)
}
