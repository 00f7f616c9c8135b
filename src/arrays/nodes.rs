// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

use super::{array_type, built_in, IdArray, EMPTY_ID};
use crate::array::{ArrayType, DType, Schema};
use crate::{ArrayKind, Error};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// The role of a node in the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum NodeType {
    #[default]
    Unspecified = 0,
    /// A node fed by the higher voltage grid. Feeders start here.
    SubstationNode = 1,
}

impl NodeType {
    /// The value stored in the `node_type` column.
    pub fn value(&self) -> i64 {
        *self as i64
    }

    pub fn from_value(value: i64) -> Result<NodeType, Error> {
        match value {
            0 => Ok(NodeType::Unspecified),
            1 => Ok(NodeType::SubstationNode),
            _ => Err(Error::invalid_value(format!("Unknown node type: {value}."))),
        }
    }
}

static NODE: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("NodeArray")
            .extends(&IdArray::schema())
            .kind(ArrayKind::Node)
            .column("u_rated", DType::F64)
            .column("node_type", DType::I8)
            .column("feeder_branch_id", DType::I32)
            .column("feeder_node_id", DType::I32)
            .default("node_type", NodeType::Unspecified.value())
            .default("feeder_branch_id", EMPTY_ID)
            .default("feeder_node_id", EMPTY_ID)
            .optional_columns(),
    )
});

array_type!(
    /// Grid nodes: busbars and connection points.
    NodeArray => NODE
);
