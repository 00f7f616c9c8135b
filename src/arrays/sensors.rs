// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

use super::{array_type, built_in, IdArray};
use crate::array::{ArrayType, DType, Schema};
use crate::ArrayKind;
use once_cell::sync::Lazy;
use std::sync::Arc;

static SENSOR: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("SensorArray")
            .extends(&IdArray::schema())
            .column("measured_object", DType::I32)
            .optional_columns(),
    )
});

static SYM_POWER_SENSOR: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("SymPowerSensorArray")
            .extends(&SensorArray::schema())
            .kind(ArrayKind::SymPowerSensor)
            .column("measured_terminal_type", DType::I8)
            .column("power_sigma", DType::F64)
            .column("p_measured", DType::F64)
            .column("q_measured", DType::F64)
            .column("p_sigma", DType::F64)
            .column("q_sigma", DType::F64)
            .optional_columns(),
    )
});

static SYM_VOLTAGE_SENSOR: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("SymVoltageSensorArray")
            .extends(&SensorArray::schema())
            .kind(ArrayKind::SymVoltageSensor)
            .column("u_sigma", DType::F64)
            .column("u_measured", DType::F64)
            .column("u_angle_measured", DType::F64)
            .optional_columns(),
    )
});

static ASYM_VOLTAGE_SENSOR: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("AsymVoltageSensorArray")
            .extends(&SensorArray::schema())
            .kind(ArrayKind::AsymVoltageSensor)
            .column("u_sigma", DType::F64x3)
            .column("u_measured", DType::F64x3)
            .column("u_angle_measured", DType::F64x3)
            .optional_columns(),
    )
});

array_type!(
    /// Measurements of a node or branch, referenced by `measured_object`.
    SensorArray => SENSOR
);
array_type!(SymPowerSensorArray => SYM_POWER_SENSOR);
array_type!(SymVoltageSensorArray => SYM_VOLTAGE_SENSOR);
array_type!(
    /// Voltage sensors with one value per phase.
    AsymVoltageSensorArray => ASYM_VOLTAGE_SENSOR
);
