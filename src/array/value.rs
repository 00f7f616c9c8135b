// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Scalar cell values exchanged with a [`RecordArray`][crate::RecordArray].

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A single cell value.
///
/// Values are converted to the declared type of a column when they are
/// written, so an `Int` can be stored in a float column, but a `Float` is
/// never silently truncated into an integer column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Triple([f64; 3]),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    pub fn as_triple(&self) -> Option<[f64; 3]> {
        match self {
            Value::Triple(t) => Some(*t),
            _ => None,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Triple(_) => "float[3]",
        }
    }

    /// Compares two values of the same column, optionally treating NaN as
    /// equal to NaN.
    pub(crate) fn eq_with_nan(&self, other: &Value, equal_nan: bool) -> bool {
        let float_eq = |a: f64, b: f64| a == b || (equal_nan && a.is_nan() && b.is_nan());
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => float_eq(*a, *b),
            (Value::Triple(a), Value::Triple(b)) => a.iter().zip(b).all(|(a, b)| float_eq(*a, *b)),
            (a, b) => a == b,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Triple([a, b, c]) => write!(f, "[{a:?} {b:?} {c:?}]"),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<[f64; 3]> for Value {
    fn from(value: [f64; 3]) -> Self {
        Value::Triple(value)
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}
