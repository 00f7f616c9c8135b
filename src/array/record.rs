// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Row and range views over a [`RecordArray`].

use super::{ColumnData, RecordArray, Schema, Value};
use crate::Error;
use std::ops::Range;
use std::sync::Arc;

/// Read access shared by arrays, views and single rows.
///
/// <details>
/// <summary>Example</summary>
///
/// ```ignore
/// fn first_id(rows: &impl Columnar) -> Result<Value, Error> {
///     rows.cell(0, "id")
/// }
/// ```
///
/// </details>
pub trait Columnar {
    fn schema(&self) -> &Arc<Schema>;

    fn nr_rows(&self) -> usize;

    /// The value at `row` (relative to this view) in `column`.
    fn cell(&self, row: usize, column: &str) -> Result<Value, Error>;

    /// Copies the rows into a new array.
    fn to_array(&self) -> RecordArray;

    /// All values of `column`.
    fn column_values(&self, column: &str) -> Result<Vec<Value>, Error> {
        (0..self.nr_rows()).map(|row| self.cell(row, column)).collect()
    }
}

impl Columnar for RecordArray {
    fn schema(&self) -> &Arc<Schema> {
        self.schema()
    }

    fn nr_rows(&self) -> usize {
        self.len()
    }

    fn cell(&self, row: usize, column: &str) -> Result<Value, Error> {
        self.value(row, column)
    }

    fn to_array(&self) -> RecordArray {
        self.clone()
    }
}

/// A single row of a [`RecordArray`].
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    array: &'a RecordArray,
    index: usize,
}

impl<'a> Record<'a> {
    pub(super) fn new(array: &'a RecordArray, index: usize) -> Self {
        Self { array, index }
    }

    /// The array this row belongs to.
    pub fn array(&self) -> &'a RecordArray {
        self.array
    }

    /// The position of this row in its array.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Result<Value, Error> {
        Ok(self.array.column(column)?.get(self.index))
    }

    pub fn int(&self, column: &str) -> Result<i64, Error> {
        Ok(self.array.ints(column)?[self.index])
    }

    pub fn float(&self, column: &str) -> Result<f64, Error> {
        Ok(self.array.floats(column)?[self.index])
    }

    pub fn str(&self, column: &str) -> Result<&'a str, Error> {
        Ok(&self.array.strs(column)?[self.index])
    }

    pub fn bool(&self, column: &str) -> Result<bool, Error> {
        Ok(self.array.bools(column)?[self.index])
    }

    pub fn triple(&self, column: &str) -> Result<[f64; 3], Error> {
        Ok(self.array.triples(column)?[self.index])
    }

    pub fn id(&self) -> Result<i64, Error> {
        Ok(self.array.ids()?[self.index])
    }
}

impl Columnar for Record<'_> {
    fn schema(&self) -> &Arc<Schema> {
        self.array.schema()
    }

    fn nr_rows(&self) -> usize {
        1
    }

    fn cell(&self, row: usize, column: &str) -> Result<Value, Error> {
        if row != 0 {
            return Err(Error::invalid_value(format!(
                "Row {row} is out of bounds for a single record."
            )));
        }
        self.get(column)
    }

    fn to_array(&self) -> RecordArray {
        self.array.slice_copy(self.index..self.index + 1)
    }
}

impl std::fmt::Display for Record<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_array())
    }
}

/// A read-only view of a contiguous range of rows of a [`RecordArray`].
#[derive(Clone, Debug)]
pub struct ArrayView<'a> {
    array: &'a RecordArray,
    range: Range<usize>,
}

impl<'a> ArrayView<'a> {
    pub(super) fn new(array: &'a RecordArray, range: Range<usize>) -> Self {
        Self { array, range }
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// A row of the view, indexed relative to the view.
    pub fn row(&self, index: usize) -> Result<Record<'a>, Error> {
        if index >= self.len() {
            return Err(Error::invalid_value(format!(
                "Row {index} is out of bounds for a view of {} rows.",
                self.len()
            )));
        }
        Ok(Record::new(self.array, self.range.start + index))
    }

    pub fn rows(&self) -> impl Iterator<Item = Record<'a>> + '_ {
        self.range.clone().map(|idx| Record::new(self.array, idx))
    }

    pub fn ints(&self, column: &str) -> Result<&'a [i64], Error> {
        Ok(&self.array.ints(column)?[self.range.clone()])
    }

    pub fn floats(&self, column: &str) -> Result<&'a [f64], Error> {
        Ok(&self.array.floats(column)?[self.range.clone()])
    }

    pub fn strs(&self, column: &str) -> Result<&'a [String], Error> {
        Ok(&self.array.strs(column)?[self.range.clone()])
    }

    pub fn bools(&self, column: &str) -> Result<&'a [bool], Error> {
        Ok(&self.array.bools(column)?[self.range.clone()])
    }
}

impl Columnar for ArrayView<'_> {
    fn schema(&self) -> &Arc<Schema> {
        self.array.schema()
    }

    fn nr_rows(&self) -> usize {
        self.len()
    }

    fn cell(&self, row: usize, column: &str) -> Result<Value, Error> {
        Ok(self.row(row)?.get(column)?)
    }

    fn to_array(&self) -> RecordArray {
        self.array.slice_copy(self.range.clone())
    }
}

impl RecordArray {
    /// Copies a range of rows that is known to be in bounds.
    fn slice_copy(&self, range: Range<usize>) -> RecordArray {
        let indices: Vec<usize> = range.collect();
        RecordArray::from_parts(
            self.schema().clone(),
            self.columns().iter().map(|c: &ColumnData| c.take(&indices)).collect(),
        )
    }
}
