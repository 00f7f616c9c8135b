// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

use super::{array_type, built_in, IdArray};
use crate::array::{ArrayType, DType, Schema};
use crate::ArrayKind;
use once_cell::sync::Lazy;
use std::sync::Arc;

static REGULATOR: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("RegulatorArray")
            .extends(&IdArray::schema())
            .column("regulated_object", DType::I32)
            .column("status", DType::I8)
            .optional_columns(),
    )
});

static TRANSFORMER_TAP_REGULATOR: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("TransformerTapRegulatorArray")
            .extends(&RegulatorArray::schema())
            .kind(ArrayKind::TransformerTapRegulator)
            .column("control_side", DType::I8)
            .column("u_set", DType::F64)
            .column("u_band", DType::F64)
            .column("line_drop_compensation_r", DType::F64)
            .column("line_drop_compensation_x", DType::F64)
            .optional_columns(),
    )
});

array_type!(
    /// Controllers attached to a branch, referenced by `regulated_object`.
    RegulatorArray => REGULATOR
);
array_type!(
    /// Automatic tap changers of transformers.
    TransformerTapRegulatorArray => TRANSFORMER_TAP_REGULATOR
);
