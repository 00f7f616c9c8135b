// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Typed column storage.

use super::{DType, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The values of one column, stored contiguously.
///
/// All integer widths share `Int` storage; the width is enforced by the
/// column's [`DType`] when values are written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(#[serde(with = "nan_as_null")] Vec<f64>),
    Str(Vec<String>),
    Bool(Vec<bool>),
    Triple(#[serde(with = "nan_as_null_triple")] Vec<[f64; 3]>),
}

impl ColumnData {
    /// A column of `len` copies of `value`, which must already be coerced to
    /// `dtype`.
    pub(crate) fn filled(dtype: DType, value: &Value, len: usize) -> ColumnData {
        let mut column = ColumnData::with_capacity(dtype, len);
        for _ in 0..len {
            column.push(value.clone());
        }
        column
    }

    pub(crate) fn with_capacity(dtype: DType, capacity: usize) -> ColumnData {
        match dtype {
            DType::F32 | DType::F64 => ColumnData::Float(Vec::with_capacity(capacity)),
            DType::F64x3 => ColumnData::Triple(Vec::with_capacity(capacity)),
            DType::Str => ColumnData::Str(Vec::with_capacity(capacity)),
            DType::Bool => ColumnData::Bool(Vec::with_capacity(capacity)),
            _ => ColumnData::Int(Vec::with_capacity(capacity)),
        }
    }

    /// Whether this storage variant can hold values of `dtype`.
    pub(crate) fn matches_dtype(&self, dtype: DType) -> bool {
        matches!(
            (self, dtype),
            (ColumnData::Float(_), DType::F32 | DType::F64)
                | (ColumnData::Triple(_), DType::F64x3)
                | (ColumnData::Str(_), DType::Str)
                | (ColumnData::Bool(_), DType::Bool)
                | (ColumnData::Int(_), DType::I8 | DType::I16 | DType::I32 | DType::I64)
        )
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Str(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Triple(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `row`. Panics when `row` is out of bounds, callers check.
    pub(crate) fn get(&self, row: usize) -> Value {
        match self {
            ColumnData::Int(v) => Value::Int(v[row]),
            ColumnData::Float(v) => Value::Float(v[row]),
            ColumnData::Str(v) => Value::Str(v[row].clone()),
            ColumnData::Bool(v) => Value::Bool(v[row]),
            ColumnData::Triple(v) => Value::Triple(v[row]),
        }
    }

    /// Writes an already coerced value.
    pub(crate) fn set(&mut self, row: usize, value: Value) {
        match (self, value) {
            (ColumnData::Int(v), Value::Int(x)) => v[row] = x,
            (ColumnData::Float(v), Value::Float(x)) => v[row] = x,
            (ColumnData::Str(v), Value::Str(x)) => v[row] = x,
            (ColumnData::Bool(v), Value::Bool(x)) => v[row] = x,
            (ColumnData::Triple(v), Value::Triple(x)) => v[row] = x,
            (column, value) => {
                tracing::error!(
                    "Ignoring write of {value:?} into a {} column.",
                    column.type_name()
                );
            }
        }
    }

    /// Appends an already coerced value.
    pub(crate) fn push(&mut self, value: Value) {
        match (self, value) {
            (ColumnData::Int(v), Value::Int(x)) => v.push(x),
            (ColumnData::Float(v), Value::Float(x)) => v.push(x),
            (ColumnData::Str(v), Value::Str(x)) => v.push(x),
            (ColumnData::Bool(v), Value::Bool(x)) => v.push(x),
            (ColumnData::Triple(v), Value::Triple(x)) => v.push(x),
            (column, value) => {
                tracing::error!(
                    "Ignoring push of {value:?} into a {} column.",
                    column.type_name()
                );
            }
        }
    }

    pub(crate) fn take(&self, rows: &[usize]) -> ColumnData {
        fn pick<T: Clone>(v: &[T], rows: &[usize]) -> Vec<T> {
            rows.iter().map(|&r| v[r].clone()).collect()
        }
        match self {
            ColumnData::Int(v) => ColumnData::Int(pick(v, rows)),
            ColumnData::Float(v) => ColumnData::Float(pick(v, rows)),
            ColumnData::Str(v) => ColumnData::Str(pick(v, rows)),
            ColumnData::Bool(v) => ColumnData::Bool(pick(v, rows)),
            ColumnData::Triple(v) => ColumnData::Triple(pick(v, rows)),
        }
    }

    /// Appends all values of `other`, which must use the same storage.
    pub(crate) fn extend_from(&mut self, other: &ColumnData) -> bool {
        match (self, other) {
            (ColumnData::Int(a), ColumnData::Int(b)) => a.extend_from_slice(b),
            (ColumnData::Float(a), ColumnData::Float(b)) => a.extend_from_slice(b),
            (ColumnData::Str(a), ColumnData::Str(b)) => a.extend_from_slice(b),
            (ColumnData::Bool(a), ColumnData::Bool(b)) => a.extend_from_slice(b),
            (ColumnData::Triple(a), ColumnData::Triple(b)) => a.extend_from_slice(b),
            _ => return false,
        }
        true
    }

    /// Total order of two rows of this column, floats by `total_cmp`.
    pub(crate) fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match self {
            ColumnData::Int(v) => v[a].cmp(&v[b]),
            ColumnData::Float(v) => v[a].total_cmp(&v[b]),
            ColumnData::Str(v) => v[a].cmp(&v[b]),
            ColumnData::Bool(v) => v[a].cmp(&v[b]),
            ColumnData::Triple(v) => v[a]
                .iter()
                .zip(&v[b])
                .map(|(x, y)| x.total_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal),
        }
    }

    /// Whether the cell at `row` equals `value`, comparing numbers by value
    /// regardless of integer or float representation.
    pub(crate) fn matches(&self, row: usize, value: &Value) -> bool {
        match (self, value) {
            (ColumnData::Int(v), Value::Int(x)) => v[row] == *x,
            (ColumnData::Int(v), Value::Float(x)) => (v[row] as f64) == *x,
            (ColumnData::Int(v), Value::Bool(x)) => v[row] == i64::from(*x),
            (ColumnData::Float(v), Value::Float(x)) => v[row] == *x,
            (ColumnData::Float(v), Value::Int(x)) => v[row] == *x as f64,
            (ColumnData::Str(v), Value::Str(x)) => v[row] == *x,
            (ColumnData::Bool(v), Value::Bool(x)) => v[row] == *x,
            (ColumnData::Bool(v), Value::Int(x)) => i64::from(v[row]) == *x,
            (ColumnData::Triple(v), Value::Triple(x)) => v[row] == *x,
            _ => false,
        }
    }

    /// Whether the cell at `row` holds the empty sentinel of `dtype`.
    pub(crate) fn is_empty_at(&self, row: usize, dtype: DType) -> bool {
        match self {
            ColumnData::Int(v) => Some(v[row]) == dtype.int_range().map(|(min, _)| min),
            ColumnData::Float(v) => v[row].is_nan(),
            ColumnData::Str(v) => v[row].is_empty(),
            ColumnData::Bool(v) => !v[row],
            ColumnData::Triple(v) => v[row].iter().all(|x| x.is_nan()),
        }
    }

    pub(crate) fn has_nan(&self) -> bool {
        match self {
            ColumnData::Float(v) => v.iter().any(|x| x.is_nan()),
            ColumnData::Triple(v) => v.iter().flatten().any(|x| x.is_nan()),
            _ => false,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ColumnData::Int(_) => "int",
            ColumnData::Float(_) => "float",
            ColumnData::Str(_) => "str",
            ColumnData::Bool(_) => "bool",
            ColumnData::Triple(_) => "float[3]",
        }
    }
}

/// JSON has no NaN; empty float cells are written as `null`.
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|v| (!v.is_nan()).then_some(*v))
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

mod nan_as_null_triple {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(super) fn serialize<S: Serializer>(
        values: &[[f64; 3]],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|t| t.map(|v| (!v.is_nan()).then_some(v)))
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<[f64; 3]>, D::Error> {
        let values = Vec::<[Option<f64>; 3]>::deserialize(deserializer)?;
        Ok(values
            .into_iter()
            .map(|t| t.map(|v| v.unwrap_or(f64::NAN)))
            .collect())
    }
}
