// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Column descriptors and schemas of record arrays.
//!
//! A [`Schema`] is an ordered list of [`ColumnDef`]s plus a flattened map of
//! default values. Schemas are built once through a [`SchemaBuilder`] and
//! shared behind an `Arc`; extending a parent concatenates its columns and
//! merges its defaults, later declarations taking precedence.

use super::Value;
use crate::{ArrayKind, Error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The maximum number of characters a string column holds, unless the
/// schema sets another length for the column.
pub const DEFAULT_STR_LENGTH: usize = 50;

/// The storage type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Str,
    Bool,
    /// Three-phase float values.
    F64x3,
}

impl DType {
    /// The inclusive range of an integer type.
    pub fn int_range(&self) -> Option<(i64, i64)> {
        match self {
            DType::I8 => Some((i8::MIN.into(), i8::MAX.into())),
            DType::I16 => Some((i16::MIN.into(), i16::MAX.into())),
            DType::I32 => Some((i32::MIN.into(), i32::MAX.into())),
            DType::I64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    pub fn is_int(&self) -> bool {
        self.int_range().is_some()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64 | DType::F64x3)
    }

    /// The value an `empty` array holds in a column of this type.
    pub(crate) fn empty_value(&self) -> Value {
        match self {
            DType::F32 | DType::F64 => Value::Float(f64::NAN),
            DType::F64x3 => Value::Triple([f64::NAN; 3]),
            DType::Str => Value::Str(String::new()),
            DType::Bool => Value::Bool(false),
            int => Value::Int(int.int_range().map_or(i64::MIN, |(min, _)| min)),
        }
    }

    /// The value a `zeros` array holds in a column of this type.
    pub(crate) fn zero_value(&self) -> Value {
        match self {
            DType::F32 | DType::F64 => Value::Float(0.0),
            DType::F64x3 => Value::Triple([0.0; 3]),
            DType::Str => Value::Str(String::new()),
            DType::Bool => Value::Bool(false),
            _ => Value::Int(0),
        }
    }
}

/// A named, typed column.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    name: String,
    dtype: DType,
    str_length: usize,
}

impl ColumnDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn str_length(&self) -> usize {
        self.str_length
    }

    /// Converts a value to the storage representation of this column.
    ///
    /// Integers out of the column's range fail with `Overflow`. Numbers are
    /// written out in string columns, and strings are truncated to the
    /// column's length.
    pub(crate) fn coerce(&self, value: Value) -> Result<Value, Error> {
        let mismatch = |value: &Value| {
            Error::invalid_type(format!(
                "Cannot store a {} value in column '{}' of type {:?}.",
                value.type_name(),
                self.name,
                self.dtype
            ))
        };
        match self.dtype {
            DType::I8 | DType::I16 | DType::I32 | DType::I64 => {
                let v = value.as_int().ok_or_else(|| mismatch(&value))?;
                let (min, max) = self.dtype.int_range().unwrap_or((i64::MIN, i64::MAX));
                if v < min || v > max {
                    return Err(Error::overflow(format!(
                        "Value {v} is out of bounds for column '{}' of type {:?}.",
                        self.name, self.dtype
                    )));
                }
                Ok(Value::Int(v))
            }
            DType::F32 => {
                let v = value.as_float().ok_or_else(|| mismatch(&value))?;
                Ok(Value::Float(f64::from(v as f32)))
            }
            DType::F64 => value
                .as_float()
                .map(Value::Float)
                .ok_or_else(|| mismatch(&value)),
            DType::F64x3 => match value {
                Value::Triple(t) => Ok(Value::Triple(t)),
                other => other
                    .as_float()
                    .map(|v| Value::Triple([v; 3]))
                    .ok_or_else(|| mismatch(&other)),
            },
            DType::Str => {
                let s = match value {
                    Value::Str(s) => s,
                    Value::Int(v) => v.to_string(),
                    Value::Float(v) => format!("{v:?}"),
                    other => return Err(mismatch(&other)),
                };
                Ok(Value::Str(s.chars().take(self.str_length).collect()))
            }
            DType::Bool => value
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| mismatch(&value)),
        }
    }
}

/// The column layout of a record array type.
#[derive(Debug, PartialEq)]
pub struct Schema {
    name: String,
    kind: Option<ArrayKind>,
    lineage: Vec<String>,
    columns: Vec<ColumnDef>,
    defaults: Vec<Option<Value>>,
}

impl Schema {
    /// Starts the definition of a new schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The grid member array this schema belongs to, if any.
    pub fn kind(&self) -> Option<ArrayKind> {
        self.kind
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn nr_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Result<&ColumnDef, Error> {
        self.column_index(name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| {
                Error::invalid_value(format!(
                    "Column '{name}' does not exist on {}.",
                    self.name
                ))
            })
    }

    /// The default value of a column, after resolving the whole extension
    /// chain.
    pub fn default_value(&self, name: &str) -> Option<&Value> {
        self.column_index(name)
            .and_then(|idx| self.defaults[idx].as_ref())
    }

    pub(crate) fn default_at(&self, idx: usize) -> Option<&Value> {
        self.defaults.get(idx).and_then(|d| d.as_ref())
    }

    /// Whether this schema is `name` or extends it, directly or not.
    pub fn is_a(&self, name: &str) -> bool {
        self.lineage.iter().any(|n| n == name)
    }

    /// Whether both schemas have the same column names and types, in the
    /// same order.
    pub fn same_layout(&self, other: &Schema) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.name == b.name && a.dtype == b.dtype)
    }
}

/// Builder for [`Schema`]s.
pub struct SchemaBuilder {
    name: String,
    kind: Option<ArrayKind>,
    lineage: Vec<String>,
    columns: Vec<ColumnDef>,
    inherited_defaults: Vec<(String, Value)>,
    own_columns: Vec<(String, DType)>,
    own_defaults: Vec<(String, Value)>,
    str_lengths: Vec<(String, usize)>,
    optional: bool,
}

impl SchemaBuilder {
    fn new(name: String) -> Self {
        Self {
            lineage: vec![name.clone()],
            name,
            kind: None,
            columns: vec![],
            inherited_defaults: vec![],
            own_columns: vec![],
            own_defaults: vec![],
            str_lengths: vec![],
            optional: false,
        }
    }

    /// Inherits all columns and defaults of `parent`.
    ///
    /// Can be called more than once. Columns shared by several parents must
    /// agree on their type; for defaults, the parent added last wins.
    pub fn extends(mut self, parent: &Schema) -> Self {
        for (idx, column) in parent.columns.iter().enumerate() {
            if !self.columns.iter().any(|c| c.name == column.name) {
                self.columns.push(column.clone());
            } else {
                // Type conflicts are reported by `build`.
                self.own_columns.push((column.name.clone(), column.dtype));
            }
            if let Some(default) = &parent.defaults[idx] {
                self.inherited_defaults
                    .push((column.name.clone(), default.clone()));
            }
        }
        for ancestor in &parent.lineage {
            if !self.lineage.contains(ancestor) {
                self.lineage.push(ancestor.clone());
            }
        }
        if parent.kind.is_some() {
            self.kind = parent.kind;
        }
        self
    }

    /// Sets the grid member array this schema belongs to.
    pub fn kind(mut self, kind: ArrayKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Adds a column.
    pub fn column(mut self, name: impl Into<String>, dtype: DType) -> Self {
        self.own_columns.push((name.into(), dtype));
        self
    }

    /// Declares the default value of a column, overriding inherited ones.
    pub fn default(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.own_defaults.push((name.into(), value.into()));
        self
    }

    /// Sets the maximum length of a string column.
    pub fn str_length(mut self, name: impl Into<String>, length: usize) -> Self {
        self.str_lengths.push((name.into(), length));
        self
    }

    /// Makes the empty value the default of every column that has no other
    /// default, so that arrays can be built from a subset of the columns.
    pub fn optional_columns(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn build(self) -> Result<Arc<Schema>, Error> {
        let SchemaBuilder {
            name,
            kind,
            lineage,
            mut columns,
            inherited_defaults,
            own_columns,
            own_defaults,
            str_lengths,
            optional,
        } = self;

        for (col_name, dtype) in own_columns {
            match columns.iter().find(|c| c.name == col_name) {
                Some(existing) if existing.dtype == dtype => {}
                Some(existing) => {
                    return Err(Error::array_definition(format!(
                        "Column '{col_name}' of {name} is declared as both {:?} and {dtype:?}.",
                        existing.dtype
                    )))
                }
                None => columns.push(ColumnDef {
                    name: col_name,
                    dtype,
                    str_length: DEFAULT_STR_LENGTH,
                }),
            }
        }

        for (col_name, length) in str_lengths {
            let column = columns
                .iter_mut()
                .find(|c| c.name == col_name && c.dtype == DType::Str)
                .ok_or_else(|| {
                    Error::array_definition(format!(
                        "Cannot set a string length on '{col_name}' of {name}: no such string column."
                    ))
                })?;
            column.str_length = length;
        }

        let mut defaults: Vec<Option<Value>> = vec![None; columns.len()];
        for (col_name, value) in inherited_defaults.into_iter().chain(own_defaults) {
            let idx = columns
                .iter()
                .position(|c| c.name == col_name)
                .ok_or_else(|| {
                    Error::array_definition(format!(
                        "Default given for unknown column '{col_name}' of {name}."
                    ))
                })?;
            let value = columns[idx].coerce(value).map_err(|e| {
                Error::array_definition(format!(
                    "Invalid default for column '{col_name}' of {name}: {}",
                    e.description()
                ))
            })?;
            defaults[idx] = Some(value);
        }
        if optional {
            for (default, column) in defaults.iter_mut().zip(&columns) {
                default.get_or_insert_with(|| column.dtype.empty_value());
            }
        }

        Ok(Arc::new(Schema {
            name,
            kind,
            lineage,
            columns,
            defaults,
        }))
    }
}
