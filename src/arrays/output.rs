// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Schemas of the tables exchanged with the power flow solver.

use super::{built_in, IdArray};
use crate::array::{ArrayType, DType, Schema};
use crate::ArrayKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Columns that only exist in the grid and are never sent to the solver.
const GRID_ONLY_COLUMNS: [&str; 4] = ["node_type", "feeder_branch_id", "feeder_node_id", "is_feeder"];

static INPUT: Lazy<HashMap<ArrayKind, Arc<Schema>>> = Lazy::new(|| {
    ArrayKind::ALL
        .into_iter()
        .map(|kind| {
            let grid = kind.schema();
            let mut builder = Schema::builder(format!("{}Input", grid.name())).kind(kind);
            for column in grid.columns() {
                if !GRID_ONLY_COLUMNS.contains(&column.name()) {
                    builder = builder.column(column.name(), column.dtype());
                }
            }
            (kind, built_in(builder.optional_columns()))
        })
        .collect()
});

fn output_columns(kind: ArrayKind) -> Vec<(String, DType)> {
    let floats = |names: &[&str]| {
        names
            .iter()
            .map(|name| (name.to_string(), DType::F64))
            .collect::<Vec<_>>()
    };
    let energized = ("energized".to_string(), DType::I8);
    match kind {
        ArrayKind::Node => {
            let mut columns = vec![energized];
            columns.extend(floats(&["u_pu", "u", "u_angle", "p", "q"]));
            columns
        }
        ArrayKind::Transformer | ArrayKind::Line | ArrayKind::Link => {
            let mut columns = vec![energized];
            columns.extend(floats(&[
                "loading", "p_from", "q_from", "i_from", "s_from", "p_to", "q_to", "i_to", "s_to",
            ]));
            columns
        }
        ArrayKind::ThreeWindingTransformer => {
            let mut columns = vec![energized];
            columns.extend(floats(&["loading"]));
            for side in 1..=3 {
                for quantity in ["p", "q", "i", "s"] {
                    columns.push((format!("{quantity}_{side}"), DType::F64));
                }
            }
            columns
        }
        ArrayKind::Source | ArrayKind::SymLoad | ArrayKind::SymGen => {
            let mut columns = vec![energized];
            columns.extend(floats(&["p", "q", "i", "s", "pf"]));
            columns
        }
        ArrayKind::TransformerTapRegulator => vec![("tap_pos".to_string(), DType::I8)],
        ArrayKind::SymPowerSensor => floats(&["p_residual", "q_residual"]),
        ArrayKind::SymVoltageSensor => floats(&["u_residual", "u_angle_residual"]),
        ArrayKind::AsymVoltageSensor => vec![
            ("u_residual".to_string(), DType::F64x3),
            ("u_angle_residual".to_string(), DType::F64x3),
        ],
    }
}

static OUTPUT: Lazy<HashMap<ArrayKind, Arc<Schema>>> = Lazy::new(|| {
    ArrayKind::ALL
        .into_iter()
        .map(|kind| {
            let grid = kind.schema();
            let mut builder = Schema::builder(format!("{}Output", grid.name()))
                .extends(&IdArray::schema())
                .kind(kind);
            for (name, dtype) in output_columns(kind) {
                builder = builder.column(name, dtype);
            }
            (kind, built_in(builder.optional_columns()))
        })
        .collect()
});

/// The solver input table of `kind`: the grid schema without the columns
/// that only matter inside the grid.
pub fn input_schema(kind: ArrayKind) -> Arc<Schema> {
    match INPUT.get(&kind) {
        Some(schema) => schema.clone(),
        None => kind.schema(),
    }
}

/// The solver result table of `kind`.
pub fn output_schema(kind: ArrayKind) -> Arc<Schema> {
    match OUTPUT.get(&kind) {
        Some(schema) => schema.clone(),
        None => IdArray::schema(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_schemas() {
        let node = input_schema(ArrayKind::Node);
        assert_eq!(node.column_names().collect::<Vec<_>>(), vec!["id", "u_rated"]);
        assert_eq!(node.kind(), Some(ArrayKind::Node));

        let line = input_schema(ArrayKind::Line);
        assert_eq!(
            line.column_names().collect::<Vec<_>>(),
            vec!["id", "from_node", "to_node", "from_status", "to_status", "r1", "x1", "c1", "tan1", "i_n"]
        );
        assert_eq!(input_schema(ArrayKind::SymLoad).nr_columns(), 6);
    }

    #[test]
    fn test_output_schemas() {
        for kind in ArrayKind::ALL {
            let schema = output_schema(kind);
            assert_eq!(schema.column_names().next(), Some("id"));
            assert_eq!(schema.kind(), Some(kind));
        }
        assert!(output_schema(ArrayKind::Line).has_column("i_from"));
        assert!(output_schema(ArrayKind::ThreeWindingTransformer).has_column("s_3"));
        assert_eq!(
            output_schema(ArrayKind::AsymVoltageSensor).column("u_residual").map(|c| c.dtype()).ok(),
            Some(DType::F64x3)
        );
    }
}
