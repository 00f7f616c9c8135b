// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The built-in power grid array types.
//!
//! Their columns follow the input format of the power flow solver, plus a few
//! bookkeeping columns (node type, feeder ids) that only live in the grid.
//! All columns are optional: columns that are not given when building an
//! array hold their default or empty value.

mod appliances;
mod branches;
mod nodes;
mod output;
mod regulators;
mod sensors;

pub use appliances::{ApplianceArray, SourceArray, SymGenArray, SymLoadArray};
pub use branches::{
    Branch3Array, Branch3Columns, BranchArray, BranchColumns, LineArray, LinkArray, ParallelMode,
    ThreeWindingTransformerArray, TransformerArray,
};
pub use nodes::{NodeArray, NodeType};
pub use output::{input_schema, output_schema};
pub use regulators::{RegulatorArray, TransformerTapRegulatorArray};
pub use sensors::{AsymVoltageSensorArray, SensorArray, SymPowerSensorArray, SymVoltageSensorArray};

use crate::array::{ArrayType, DType, Schema, SchemaBuilder};
use crate::ArrayKind;
use once_cell::sync::Lazy;
use std::sync::Arc;

/// The id of rows that have not been given an id yet, and the value of
/// references that point nowhere.
pub const EMPTY_ID: i64 = i32::MIN as i64;

/// Builds a schema defined in this crate.
///
/// Built-in definitions are static and covered by tests, so a failure here
/// is a bug in the definition itself. This is the only panic outside tests;
/// every schema built from user input goes through [`SchemaBuilder::build`].
pub(crate) fn built_in(builder: SchemaBuilder) -> Arc<Schema> {
    match builder.build() {
        Ok(schema) => schema,
        Err(err) => panic!("invalid built-in schema: {err}"),
    }
}

/// Declares a unit type implementing [`ArrayType`] for a lazily built schema.
macro_rules! array_type {
    ($(#[$doc:meta])* $name:ident => $schema:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $name;

        impl $crate::array::ArrayType for $name {
            fn schema() -> std::sync::Arc<$crate::array::Schema> {
                $schema.clone()
            }
        }
    };
}
pub(crate) use array_type;

static ID: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("IdArray")
            .column("id", DType::I32)
            .optional_columns(),
    )
});

array_type!(
    /// Arrays with only an `id` column; the base of all grid arrays.
    IdArray => ID
);

impl ArrayKind {
    /// The built-in schema of the member array.
    pub fn schema(&self) -> Arc<Schema> {
        match self {
            ArrayKind::Node => NodeArray::schema(),
            ArrayKind::Transformer => TransformerArray::schema(),
            ArrayKind::ThreeWindingTransformer => ThreeWindingTransformerArray::schema(),
            ArrayKind::Line => LineArray::schema(),
            ArrayKind::Link => LinkArray::schema(),
            ArrayKind::Source => SourceArray::schema(),
            ArrayKind::SymLoad => SymLoadArray::schema(),
            ArrayKind::SymGen => SymGenArray::schema(),
            ArrayKind::TransformerTapRegulator => TransformerTapRegulatorArray::schema(),
            ArrayKind::SymPowerSensor => SymPowerSensorArray::schema(),
            ArrayKind::SymVoltageSensor => SymVoltageSensorArray::schema(),
            ArrayKind::AsymVoltageSensor => AsymVoltageSensorArray::schema(),
        }
    }
}
