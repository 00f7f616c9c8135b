// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module defines the `ArrayKind` enum, which names the member arrays of
//! a grid.

use crate::array::Columnar;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The grid member array a schema belongs to.
///
/// Every built-in power grid schema carries its kind, and schemas derived
/// from it inherit the kind, so an arbitrary [`RecordArray`][crate::RecordArray]
/// can be dispatched to the right grid slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArrayKind {
    Node,
    Transformer,
    ThreeWindingTransformer,
    Line,
    Link,
    Source,
    SymLoad,
    SymGen,
    TransformerTapRegulator,
    SymPowerSensor,
    SymVoltageSensor,
    AsymVoltageSensor,
}

impl ArrayKind {
    /// All kinds, in the order the grid stores its member arrays.
    pub const ALL: [ArrayKind; 12] = [
        ArrayKind::Node,
        ArrayKind::Transformer,
        ArrayKind::ThreeWindingTransformer,
        ArrayKind::Line,
        ArrayKind::Link,
        ArrayKind::Source,
        ArrayKind::SymLoad,
        ArrayKind::SymGen,
        ArrayKind::TransformerTapRegulator,
        ArrayKind::SymPowerSensor,
        ArrayKind::SymVoltageSensor,
        ArrayKind::AsymVoltageSensor,
    ];

    /// The two-terminal branch kinds, in the order they are combined by
    /// [`Grid::branches`][crate::Grid::branches].
    pub const BRANCHES: [ArrayKind; 3] =
        [ArrayKind::Transformer, ArrayKind::Line, ArrayKind::Link];

    /// The name of the member array, also used as the table name towards the
    /// power flow solver.
    pub fn name(&self) -> &'static str {
        match self {
            ArrayKind::Node => "node",
            ArrayKind::Transformer => "transformer",
            ArrayKind::ThreeWindingTransformer => "three_winding_transformer",
            ArrayKind::Line => "line",
            ArrayKind::Link => "link",
            ArrayKind::Source => "source",
            ArrayKind::SymLoad => "sym_load",
            ArrayKind::SymGen => "sym_gen",
            ArrayKind::TransformerTapRegulator => "transformer_tap_regulator",
            ArrayKind::SymPowerSensor => "sym_power_sensor",
            ArrayKind::SymVoltageSensor => "sym_voltage_sensor",
            ArrayKind::AsymVoltageSensor => "asym_voltage_sensor",
        }
    }

    pub fn from_name(name: &str) -> Option<ArrayKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn is_branch(&self) -> bool {
        Self::BRANCHES.contains(self)
    }

    pub fn is_branch3(&self) -> bool {
        *self == ArrayKind::ThreeWindingTransformer
    }

    pub fn is_appliance(&self) -> bool {
        matches!(
            self,
            ArrayKind::Source | ArrayKind::SymLoad | ArrayKind::SymGen
        )
    }

    pub fn is_sensor(&self) -> bool {
        matches!(
            self,
            ArrayKind::SymPowerSensor | ArrayKind::SymVoltageSensor | ArrayKind::AsymVoltageSensor
        )
    }
}

impl Display for ArrayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArrayKind::Node => write!(f, "Node"),
            ArrayKind::Transformer => write!(f, "Transformer"),
            ArrayKind::ThreeWindingTransformer => write!(f, "ThreeWindingTransformer"),
            ArrayKind::Line => write!(f, "Line"),
            ArrayKind::Link => write!(f, "Link"),
            ArrayKind::Source => write!(f, "Source"),
            ArrayKind::SymLoad => write!(f, "SymLoad"),
            ArrayKind::SymGen => write!(f, "SymGen"),
            ArrayKind::TransformerTapRegulator => write!(f, "TransformerTapRegulator"),
            ArrayKind::SymPowerSensor => write!(f, "SymPowerSensor"),
            ArrayKind::SymVoltageSensor => write!(f, "SymVoltageSensor"),
            ArrayKind::AsymVoltageSensor => write!(f, "AsymVoltageSensor"),
        }
    }
}

/// Predicates for checking the kind of a record array, a view or a row.
pub(crate) trait KindPredicates: Columnar {
    fn kind(&self) -> Option<ArrayKind> {
        self.schema().kind()
    }

    fn is_node(&self) -> bool {
        self.kind() == Some(ArrayKind::Node)
    }

    fn is_branch(&self) -> bool {
        self.kind().is_some_and(|k| k.is_branch())
    }

    fn is_branch3(&self) -> bool {
        self.kind().is_some_and(|k| k.is_branch3())
    }
}

/// Implement the `KindPredicates` trait for everything that implements the
/// `Columnar` trait.
impl<T: Columnar> KindPredicates for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ArrayKind::ALL {
            assert_eq!(ArrayKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ArrayKind::from_name("meter"), None);
        assert_eq!(ArrayKind::ThreeWindingTransformer.to_string(), "ThreeWindingTransformer");
    }

    #[test]
    fn test_predicates() {
        assert!(ArrayKind::Line.is_branch());
        assert!(!ArrayKind::ThreeWindingTransformer.is_branch());
        assert!(ArrayKind::ThreeWindingTransformer.is_branch3());
        assert!(ArrayKind::SymGen.is_appliance());
        assert!(ArrayKind::AsymVoltageSensor.is_sensor());
        assert!(!ArrayKind::Node.is_sensor());
    }
}
