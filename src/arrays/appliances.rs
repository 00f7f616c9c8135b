// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

use super::{array_type, built_in, IdArray};
use crate::array::{ArrayType, DType, Schema};
use crate::ArrayKind;
use once_cell::sync::Lazy;
use std::sync::Arc;

static APPLIANCE: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("ApplianceArray")
            .extends(&IdArray::schema())
            .column("node", DType::I32)
            .column("status", DType::I8)
            .optional_columns(),
    )
});

static SOURCE: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("SourceArray")
            .extends(&ApplianceArray::schema())
            .kind(ArrayKind::Source)
            .column("u_ref", DType::F64)
            .default("u_ref", 1.0)
            .optional_columns(),
    )
});

// Loads and generators share their columns.
static LOAD_GEN: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("LoadGenArray")
            .extends(&ApplianceArray::schema())
            .column("type", DType::I8)
            .column("p_specified", DType::F64)
            .column("q_specified", DType::F64)
            .optional_columns(),
    )
});

static SYM_LOAD: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("SymLoadArray")
            .extends(&LOAD_GEN)
            .kind(ArrayKind::SymLoad),
    )
});

static SYM_GEN: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("SymGenArray")
            .extends(&LOAD_GEN)
            .kind(ArrayKind::SymGen),
    )
});

array_type!(
    /// Devices connected to a single node.
    ApplianceArray => APPLIANCE
);
array_type!(
    /// Voltage sources: the connections to the higher voltage grid.
    SourceArray => SOURCE
);
array_type!(SymLoadArray => SYM_LOAD);
array_type!(SymGenArray => SYM_GEN);
