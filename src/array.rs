// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A typed, columnar, in-memory table with a self-describing schema.
//!
//! A [`RecordArray`] stores one [`ColumnData`] per column of its [`Schema`].
//! Every row has a value for every column, and values are checked against
//! the column's [`DType`] when they are written.

mod column;
mod display;
mod filter;
mod modify;
mod record;
mod schema;
mod unique;
mod value;

pub use column::ColumnData;
pub use filter::{FilterMode, Query};
pub use modify::Values;
pub use record::{ArrayView, Columnar, Record};
pub use schema::{ColumnDef, DType, Schema, SchemaBuilder, DEFAULT_STR_LENGTH};
pub use unique::{array_equal, concatenate, unique, UniqueRows};
pub use value::Value;

use crate::{Error, EMPTY_ID};
use std::ops::Range;
use std::sync::Arc;

/// A record array type with a fixed, process-wide schema.
///
/// Implemented by the built-in power grid array types, so that arrays can be
/// created as `LineArray::empty(3)` without passing schemas around.
pub trait ArrayType {
    /// The schema of the array type.
    fn schema() -> Arc<Schema>;

    /// Creates an array without rows.
    fn new() -> Result<RecordArray, Error> {
        RecordArray::new(&Self::schema())
    }

    /// Creates `n` rows of zeros, see [`RecordArray::zeros`].
    fn zeros(n: usize) -> Result<RecordArray, Error> {
        RecordArray::zeros(&Self::schema(), n)
    }

    /// Creates `n` rows of defaults or empty values, see
    /// [`RecordArray::empty`].
    fn empty(n: usize) -> Result<RecordArray, Error> {
        RecordArray::empty(&Self::schema(), n)
    }

    /// Starts building an array of this type column by column.
    fn builder() -> ArrayBuilder {
        RecordArray::builder(&Self::schema())
    }

    /// Whether `array` is of this type or of a type extending it.
    fn is_instance(array: &impl Columnar) -> bool {
        array.schema().is_a(Self::schema().name())
    }
}

/// A typed, columnar table.
#[derive(Clone, Debug)]
pub struct RecordArray {
    schema: Arc<Schema>,
    columns: Vec<ColumnData>,
}

impl RecordArray {
    fn check_schema(schema: &Schema) -> Result<(), Error> {
        if schema.nr_columns() == 0 {
            return Err(Error::array_definition(format!(
                "{} has no columns defined.",
                schema.name()
            )));
        }
        Ok(())
    }

    /// Builds an array from prepared columns, which must match the schema.
    pub(crate) fn from_parts(schema: Arc<Schema>, columns: Vec<ColumnData>) -> RecordArray {
        RecordArray { schema, columns }
    }

    fn filled_with(
        schema: &Arc<Schema>,
        n: usize,
        fill: impl Fn(usize, &ColumnDef) -> Value,
    ) -> Result<RecordArray, Error> {
        Self::check_schema(schema)?;
        let columns = schema
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, def)| ColumnData::filled(def.dtype(), &fill(idx, def), n))
            .collect();
        Ok(RecordArray::from_parts(schema.clone(), columns))
    }

    /// Creates an array without rows.
    pub fn new(schema: &Arc<Schema>) -> Result<RecordArray, Error> {
        Self::filled_with(schema, 0, |_, def| def.dtype().zero_value())
    }

    /// Creates `n` rows with all values zero, `false` or the empty string.
    ///
    /// The `id` column is set to [`EMPTY_ID`], so that the rows can be given
    /// fresh ids when appended to a container.
    pub fn zeros(schema: &Arc<Schema>, n: usize) -> Result<RecordArray, Error> {
        Self::filled_with(schema, n, |_, def| {
            if def.name() == "id" {
                Value::Int(EMPTY_ID)
            } else {
                def.dtype().zero_value()
            }
        })
    }

    /// Creates `n` rows holding the column defaults, or the empty value of
    /// the column type where no default is declared.
    pub fn empty(schema: &Arc<Schema>, n: usize) -> Result<RecordArray, Error> {
        Self::filled_with(schema, n, |idx, def| match schema.default_at(idx) {
            Some(default) => default.clone(),
            None if def.name() == "id" => Value::Int(EMPTY_ID),
            None => def.dtype().empty_value(),
        })
    }

    /// Starts building an array column by column.
    pub fn builder(schema: &Arc<Schema>) -> ArrayBuilder {
        ArrayBuilder {
            schema: schema.clone(),
            columns: vec![],
        }
    }

    /// Creates an array from named columns.
    ///
    /// All columns must have the same length. Columns that are not given
    /// are filled with their default; a missing column without a default is
    /// an error, as is an unknown column.
    pub fn from_columns(
        schema: &Arc<Schema>,
        columns: Vec<(String, Vec<Value>)>,
    ) -> Result<RecordArray, Error> {
        Self::check_schema(schema)?;
        let len = columns.first().map_or(0, |(_, values)| values.len());
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != len) {
            return Err(Error::invalid_value(format!(
                "Column '{name}' has {} values, expected {len}.",
                values.len()
            )));
        }
        if let Some((name, _)) = columns.iter().find(|(n, _)| !schema.has_column(n)) {
            return Err(Error::invalid_value(format!(
                "Column '{name}' does not exist on {}.",
                schema.name()
            )));
        }
        let missing: Vec<&str> = schema
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, def)| {
                schema.default_at(*idx).is_none() && !columns.iter().any(|(n, _)| n == def.name())
            })
            .map(|(_, def)| def.name())
            .collect();
        if !missing.is_empty() {
            return Err(Error::invalid_value(format!(
                "Missing required columns for {}: {}.",
                schema.name(),
                missing.join(", ")
            )));
        }

        let mut data = Vec::with_capacity(schema.nr_columns());
        for (idx, def) in schema.columns().iter().enumerate() {
            let column = match columns.iter().find(|(n, _)| n == def.name()) {
                Some((_, values)) => {
                    let mut column = ColumnData::with_capacity(def.dtype(), len);
                    for value in values {
                        column.push(def.coerce(value.clone())?);
                    }
                    column
                }
                None => match schema.default_at(idx) {
                    Some(default) => ColumnData::filled(def.dtype(), default, len),
                    None => {
                        return Err(Error::internal(format!(
                            "No values for column '{}'.",
                            def.name()
                        )))
                    }
                },
            };
            data.push(column);
        }
        Ok(RecordArray::from_parts(schema.clone(), data))
    }

    /// Creates an array from rows holding one value per column, in schema
    /// order.
    pub fn from_rows(schema: &Arc<Schema>, rows: Vec<Vec<Value>>) -> Result<RecordArray, Error> {
        Self::check_schema(schema)?;
        let width = schema.nr_columns();
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(Error::invalid_value(format!(
                "Rows of {} need {width} values, got {}.",
                schema.name(),
                row.len()
            )));
        }
        let mut data: Vec<ColumnData> = schema
            .columns()
            .iter()
            .map(|def| ColumnData::with_capacity(def.dtype(), rows.len()))
            .collect();
        for row in rows {
            for ((def, column), value) in schema.columns().iter().zip(&mut data).zip(row) {
                column.push(def.coerce(value)?);
            }
        }
        Ok(RecordArray::from_parts(schema.clone(), data))
    }

    /// Creates an array from a two dimensional buffer, which may be row-major
    /// or column-major.
    ///
    /// When the inner vectors are as wide as the schema, they are taken as
    /// rows. Otherwise, when there are as many inner vectors as columns, they
    /// are taken as columns.
    pub fn from_raw(schema: &Arc<Schema>, raw: Vec<Vec<Value>>) -> Result<RecordArray, Error> {
        Self::check_schema(schema)?;
        let width = schema.nr_columns();
        if raw.iter().all(|inner| inner.len() == width) {
            return Self::from_rows(schema, raw);
        }
        if raw.len() == width {
            let columns = schema
                .column_names()
                .map(str::to_string)
                .zip(raw)
                .collect();
            return Self::from_columns(schema, columns);
        }
        Err(Error::invalid_value(format!(
            "Cannot interpret a buffer of {} x {} values as {} with {width} columns.",
            raw.len(),
            raw.first().map_or(0, Vec::len),
            schema.name()
        )))
    }

    /// Converts the array to another schema.
    ///
    /// Shared columns are copied, columns only known to `schema` are filled
    /// with their defaults and columns only known to `self` are dropped.
    pub fn convert_to(&self, schema: &Arc<Schema>) -> Result<RecordArray, Error> {
        Self::check_schema(schema)?;
        let missing: Vec<&str> = schema
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, def)| {
                schema.default_at(*idx).is_none() && !self.schema.has_column(def.name())
            })
            .map(|(_, def)| def.name())
            .collect();
        if !missing.is_empty() {
            return Err(Error::invalid_value(format!(
                "Cannot convert {} to {}, missing required columns: {}.",
                self.schema.name(),
                schema.name(),
                missing.join(", ")
            )));
        }

        let len = self.len();
        let mut data = Vec::with_capacity(schema.nr_columns());
        for (idx, def) in schema.columns().iter().enumerate() {
            let column = match self.schema.column_index(def.name()) {
                Some(src) if self.columns[src].matches_dtype(def.dtype()) => {
                    let mut column = ColumnData::with_capacity(def.dtype(), len);
                    for row in 0..len {
                        column.push(def.coerce(self.columns[src].get(row))?);
                    }
                    column
                }
                Some(_) => {
                    return Err(Error::invalid_type(format!(
                        "Column '{}' has different types in {} and {}.",
                        def.name(),
                        self.schema.name(),
                        schema.name()
                    )))
                }
                None => match schema.default_at(idx) {
                    Some(default) => ColumnData::filled(def.dtype(), default, len),
                    None => {
                        return Err(Error::internal(format!(
                            "No values for column '{}'.",
                            def.name()
                        )))
                    }
                },
            };
            data.push(column);
        }
        Ok(RecordArray::from_parts(schema.clone(), data))
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, ColumnData::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.column_names()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.schema.has_column(name)
    }

    pub(crate) fn column_index(&self, name: &str) -> Result<usize, Error> {
        self.schema.column_index(name).ok_or_else(|| {
            Error::invalid_value(format!(
                "Column '{name}' does not exist on {}.",
                self.schema.name()
            ))
        })
    }

    /// The raw storage of a column.
    pub fn column(&self, name: &str) -> Result<&ColumnData, Error> {
        Ok(&self.columns[self.column_index(name)?])
    }

    pub(crate) fn columns(&self) -> &[ColumnData] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [ColumnData] {
        &mut self.columns
    }

    fn wrong_type(&self, name: &str, expected: &str) -> Error {
        Error::invalid_type(format!(
            "Column '{name}' of {} is not a {expected} column.",
            self.schema.name()
        ))
    }

    pub fn ints(&self, name: &str) -> Result<&[i64], Error> {
        match self.column(name)? {
            ColumnData::Int(v) => Ok(v),
            _ => Err(self.wrong_type(name, "integer")),
        }
    }

    pub fn floats(&self, name: &str) -> Result<&[f64], Error> {
        match self.column(name)? {
            ColumnData::Float(v) => Ok(v),
            _ => Err(self.wrong_type(name, "float")),
        }
    }

    /// Mutable access to a float column; floats need no range checks.
    pub fn floats_mut(&mut self, name: &str) -> Result<&mut [f64], Error> {
        let idx = self.column_index(name)?;
        if !matches!(self.columns[idx], ColumnData::Float(_)) {
            return Err(self.wrong_type(name, "float"));
        }
        match &mut self.columns[idx] {
            ColumnData::Float(v) => Ok(v),
            _ => Err(Error::internal("column type changed")),
        }
    }

    pub fn strs(&self, name: &str) -> Result<&[String], Error> {
        match self.column(name)? {
            ColumnData::Str(v) => Ok(v),
            _ => Err(self.wrong_type(name, "string")),
        }
    }

    pub fn bools(&self, name: &str) -> Result<&[bool], Error> {
        match self.column(name)? {
            ColumnData::Bool(v) => Ok(v),
            _ => Err(self.wrong_type(name, "boolean")),
        }
    }

    pub fn triples(&self, name: &str) -> Result<&[[f64; 3]], Error> {
        match self.column(name)? {
            ColumnData::Triple(v) => Ok(v),
            _ => Err(self.wrong_type(name, "three-phase float")),
        }
    }

    /// The values of the `id` column.
    pub fn ids(&self) -> Result<&[i64], Error> {
        if !self.has_column("id") {
            return Err(Error::invalid_value(format!(
                "{} has no id column.",
                self.schema.name()
            )));
        }
        self.ints("id")
    }

    /// A copy of the value in `column` at `row`.
    pub fn value(&self, row: usize, column: &str) -> Result<Value, Error> {
        self.check_row(row)?;
        Ok(self.column(column)?.get(row))
    }

    pub(crate) fn check_row(&self, row: usize) -> Result<(), Error> {
        if row >= self.len() {
            return Err(Error::invalid_value(format!(
                "Row {row} is out of bounds for {} with {} rows.",
                self.schema.name(),
                self.len()
            )));
        }
        Ok(())
    }

    /// A single row.
    pub fn row(&self, index: usize) -> Result<Record<'_>, Error> {
        self.check_row(index)?;
        Ok(Record::new(self, index))
    }

    /// The only row of a single-row array.
    pub fn record(&self) -> Result<Record<'_>, Error> {
        if self.len() != 1 {
            return Err(Error::invalid_value(format!(
                "Expected a single row, {} has {} rows.",
                self.schema.name(),
                self.len()
            )));
        }
        Ok(Record::new(self, 0))
    }

    pub fn rows(&self) -> impl Iterator<Item = Record<'_>> {
        (0..self.len()).map(move |idx| Record::new(self, idx))
    }

    /// A read-only view of a contiguous range of rows, sharing storage with
    /// this array.
    pub fn slice(&self, range: Range<usize>) -> Result<ArrayView<'_>, Error> {
        if range.start > range.end || range.end > self.len() {
            return Err(Error::invalid_value(format!(
                "Range {range:?} is out of bounds for {} with {} rows.",
                self.schema.name(),
                self.len()
            )));
        }
        Ok(ArrayView::new(self, range))
    }

    /// A copy of the rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Result<RecordArray, Error> {
        if let Some(&idx) = indices.iter().find(|&&idx| idx >= self.len()) {
            self.check_row(idx)?;
        }
        Ok(RecordArray::from_parts(
            self.schema.clone(),
            self.columns.iter().map(|c| c.take(indices)).collect(),
        ))
    }

    /// A copy of the rows where `mask` is true.
    pub fn select(&self, mask: &[bool]) -> Result<RecordArray, Error> {
        self.check_mask(mask)?;
        let indices: Vec<usize> = mask_indices(mask).collect();
        self.take(&indices)
    }

    pub(crate) fn check_mask(&self, mask: &[bool]) -> Result<(), Error> {
        if mask.len() != self.len() {
            return Err(Error::invalid_value(format!(
                "Mask of length {} does not match {} with {} rows.",
                mask.len(),
                self.schema.name(),
                self.len()
            )));
        }
        Ok(())
    }

    /// Whether any row of this array equals `record` in every column.
    pub fn contains(&self, record: &Record<'_>) -> bool {
        let other = record.array();
        if !self.schema.same_layout(other.schema()) {
            return false;
        }
        (0..self.len()).any(|row| {
            self.columns
                .iter()
                .zip(other.columns())
                .all(|(a, b)| a.get(row).eq_with_nan(&b.get(record.index()), true))
        })
    }

    /// Per row, whether `column` holds its empty value.
    pub fn empty_mask(&self, column: &str) -> Result<Vec<bool>, Error> {
        let def = self.schema.column(column)?;
        let data = self.column(column)?;
        Ok((0..self.len())
            .map(|row| data.is_empty_at(row, def.dtype()))
            .collect())
    }
}

/// The indices where `mask` is true.
pub(crate) fn mask_indices(mask: &[bool]) -> impl Iterator<Item = usize> + '_ {
    mask.iter()
        .enumerate()
        .filter_map(|(idx, &keep)| keep.then_some(idx))
}

/// Builds a [`RecordArray`] column by column.
pub struct ArrayBuilder {
    schema: Arc<Schema>,
    columns: Vec<(String, Vec<Value>)>,
}

impl ArrayBuilder {
    /// Sets the values of a column.
    pub fn column<V: Into<Value>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.columns
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// See [`RecordArray::from_columns`].
    pub fn build(self) -> Result<RecordArray, Error> {
        RecordArray::from_columns(&self.schema, self.columns)
    }
}
