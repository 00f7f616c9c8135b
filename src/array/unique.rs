// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Whole-array operations: equality, concatenation and de-duplication.

use super::{ColumnData, RecordArray};
use crate::Error;
use std::cmp::Ordering;

/// Whether both arrays have the same columns and values.
///
/// With `equal_nan`, NaN values compare equal to each other.
pub fn array_equal(a: &RecordArray, b: &RecordArray, equal_nan: bool) -> bool {
    a.schema().same_layout(b.schema())
        && a.len() == b.len()
        && a.columns().iter().zip(b.columns()).all(|(ca, cb)| {
            (0..a.len()).all(|row| ca.get(row).eq_with_nan(&cb.get(row), equal_nan))
        })
}

/// Joins arrays with the same column layout, in the given order.
pub fn concatenate(arrays: &[&RecordArray]) -> Result<RecordArray, Error> {
    let (first, rest) = arrays
        .split_first()
        .ok_or_else(|| Error::invalid_value("Nothing to concatenate."))?;
    let mut joined = (*first).clone();
    for array in rest {
        joined.append(array)?;
    }
    Ok(joined)
}

/// The result of [`unique`].
#[derive(Clone, Debug)]
pub struct UniqueRows {
    /// The distinct rows, sorted.
    pub array: RecordArray,
    /// For every distinct row, the position of its first occurrence.
    pub index: Vec<usize>,
    /// For every input row, the position of its distinct row.
    pub inverse: Vec<usize>,
    /// How often each distinct row occurs.
    pub counts: Vec<usize>,
}

/// De-duplicates full rows.
///
/// Fails with `NotImplemented` when a float column holds NaN, because NaN
/// rows never compare equal.
pub fn unique(array: &RecordArray) -> Result<UniqueRows, Error> {
    if array.columns().iter().any(ColumnData::has_nan) {
        return Err(Error::not_implemented(format!(
            "Cannot de-duplicate {}: float columns contain NaN values.",
            array.schema().name()
        )));
    }
    let compare = |a: usize, b: usize| {
        array
            .columns()
            .iter()
            .map(|c| c.compare_rows(a, b))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    };

    let mut order: Vec<usize> = (0..array.len()).collect();
    order.sort_by(|&a, &b| compare(a, b));

    let mut index: Vec<usize> = vec![];
    let mut counts: Vec<usize> = vec![];
    let mut inverse = vec![0; array.len()];
    for &row in &order {
        match index.last() {
            Some(&first) if compare(first, row).is_eq() => {
                if let Some(count) = counts.last_mut() {
                    *count += 1;
                }
            }
            _ => {
                index.push(row);
                counts.push(1);
            }
        }
        inverse[row] = index.len() - 1;
    }

    Ok(UniqueRows {
        array: array.take(&index)?,
        index,
        inverse,
        counts,
    })
}
