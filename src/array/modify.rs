// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! In-place modification of record arrays.
//!
//! All writes convert their values to the column types before touching the
//! array, so a failed write leaves the array unchanged.

use super::{mask_indices, Query, RecordArray, Value};
use crate::Error;
use std::cmp::Ordering;
use std::collections::HashMap;

/// New values for a column in [`RecordArray::update_by_id`].
#[derive(Clone, Debug, PartialEq)]
pub enum Values {
    /// One value for all updated rows.
    Scalar(Value),
    /// One value per given id.
    List(Vec<Value>),
}

impl Values {
    pub fn scalar(value: impl Into<Value>) -> Self {
        Values::Scalar(value.into())
    }

    pub fn list<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Values::List(values.into_iter().map(Into::into).collect())
    }
}

/// Modification methods.
impl RecordArray {
    fn coerce_all(&self, column: usize, values: Vec<Value>) -> Result<Vec<Value>, Error> {
        let def = &self.schema().columns()[column];
        values.into_iter().map(|v| def.coerce(v)).collect()
    }

    /// Sets every row of `column` to `value`.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> Result<(), Error> {
        let mask = vec![true; self.len()];
        self.set_where(column, &mask, value)
    }

    /// Sets a single cell.
    pub fn set_at(&mut self, row: usize, column: &str, value: impl Into<Value>) -> Result<(), Error> {
        self.check_row(row)?;
        let idx = self.column_index(column)?;
        let value = self.schema().columns()[idx].coerce(value.into())?;
        self.columns_mut()[idx].set(row, value);
        Ok(())
    }

    /// Sets the rows of `column` where `mask` is true to `value`.
    pub fn set_where(
        &mut self,
        column: &str,
        mask: &[bool],
        value: impl Into<Value>,
    ) -> Result<(), Error> {
        self.check_mask(mask)?;
        let idx = self.column_index(column)?;
        let value = self.schema().columns()[idx].coerce(value.into())?;
        let data = &mut self.columns_mut()[idx];
        for row in mask_indices(mask) {
            data.set(row, value.clone());
        }
        Ok(())
    }

    /// Replaces all values of `column`.
    pub fn set_values<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<(), Error> {
        let idx = self.column_index(column)?;
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() != self.len() {
            return Err(Error::invalid_value(format!(
                "Got {} values for column '{column}' of an array with {} rows.",
                values.len(),
                self.len()
            )));
        }
        let values = self.coerce_all(idx, values)?;
        let data = &mut self.columns_mut()[idx];
        for (row, value) in values.into_iter().enumerate() {
            data.set(row, value);
        }
        Ok(())
    }

    /// Replaces a row with values given in column order.
    pub fn set_row(&mut self, row: usize, values: Vec<Value>) -> Result<(), Error> {
        self.check_row(row)?;
        if values.len() != self.schema().nr_columns() {
            return Err(Error::invalid_value(format!(
                "Rows of {} need {} values, got {}.",
                self.schema().name(),
                self.schema().nr_columns(),
                values.len()
            )));
        }
        let values: Vec<Value> = self
            .schema()
            .columns()
            .iter()
            .zip(values)
            .map(|(def, v)| def.coerce(v))
            .collect::<Result<_, _>>()?;
        for (data, value) in self.columns_mut().iter_mut().zip(values) {
            data.set(row, value);
        }
        Ok(())
    }

    /// Overwrites the rows where `mask` is true with the rows of `other`, in
    /// order.
    pub fn assign_rows(&mut self, mask: &[bool], other: &RecordArray) -> Result<(), Error> {
        self.check_mask(mask)?;
        if !self.schema().same_layout(other.schema()) {
            return Err(Error::invalid_type(format!(
                "Cannot assign rows of {} to {}.",
                other.schema().name(),
                self.schema().name()
            )));
        }
        let rows: Vec<usize> = mask_indices(mask).collect();
        if rows.len() != other.len() {
            return Err(Error::invalid_value(format!(
                "Cannot assign {} rows to {} selected rows.",
                other.len(),
                rows.len()
            )));
        }
        for (src, &dst) in rows.iter().enumerate() {
            for (data, other_data) in self.columns_mut().iter_mut().zip(other.columns()) {
                data.set(dst, other_data.get(src));
            }
        }
        Ok(())
    }

    /// Appends the rows of an array with the same column layout.
    pub fn append(&mut self, other: &RecordArray) -> Result<(), Error> {
        if !self.schema().same_layout(other.schema()) {
            return Err(Error::invalid_type(format!(
                "Cannot append {} to {}: the columns differ.",
                other.schema().name(),
                self.schema().name()
            )));
        }
        for (data, other_data) in self.columns_mut().iter_mut().zip(other.columns()) {
            if !data.extend_from(other_data) {
                return Err(Error::internal("column storage does not match its schema"));
            }
        }
        Ok(())
    }

    /// Sorts the rows in place, stable and ascending, by the given columns.
    pub fn sort(&mut self, columns: &[&str]) -> Result<(), Error> {
        let keys = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| {
            keys.iter()
                .map(|&k| self.columns()[k].compare_rows(a, b))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        *self = self.take(&order)?;
        Ok(())
    }

    /// A copy with its rows ordered like `values` in `column`.
    pub fn re_order<V: Into<Value>>(
        &self,
        values: impl IntoIterator<Item = V>,
        column: &str,
    ) -> Result<RecordArray, Error> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.len() != self.len() {
            return Err(Error::invalid_value(format!(
                "Cannot re-order {} rows by {} values.",
                self.len(),
                values.len()
            )));
        }
        let data = self.column(column)?;
        let order = values
            .iter()
            .map(|value| {
                (0..self.len())
                    .find(|&row| data.matches(row, value))
                    .ok_or_else(|| {
                        Error::invalid_value(format!(
                            "Value {value} does not occur in column '{column}'."
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.take(&order)
    }

    /// Updates the rows with the given ids.
    ///
    /// `Values::List` must hold one value per id. Unless `allow_missing` is
    /// set, every id must exist.
    pub fn update_by_id(
        &mut self,
        ids: &[i64],
        updates: &[(&str, Values)],
        allow_missing: bool,
    ) -> Result<(), Error> {
        let rows_by_id: HashMap<i64, usize> = {
            let existing = self.ids()?;
            let mut map = HashMap::with_capacity(existing.len());
            for (row, id) in existing.iter().enumerate() {
                map.entry(*id).or_insert(row);
            }
            map
        };
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !rows_by_id.contains_key(id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() && !allow_missing {
            return Err(Error::invalid_value(format!(
                "Ids not found in {}: {}.",
                self.schema().name(),
                missing.join(", ")
            )));
        }

        let mut prepared = Vec::with_capacity(updates.len());
        for (column, values) in updates {
            let idx = self.column_index(column)?;
            let values = match values {
                Values::Scalar(value) => vec![value.clone(); ids.len()],
                Values::List(values) if values.len() == ids.len() => values.clone(),
                Values::List(values) => {
                    return Err(Error::invalid_value(format!(
                        "Got {} values for column '{column}' and {} ids.",
                        values.len(),
                        ids.len()
                    )))
                }
            };
            prepared.push((idx, self.coerce_all(idx, values)?));
        }

        for (idx, values) in prepared {
            let data = &mut self.columns_mut()[idx];
            for (id, value) in ids.iter().zip(values) {
                if let Some(&row) = rows_by_id.get(id) {
                    data.set(row, value);
                }
            }
        }
        Ok(())
    }

    /// Like [`update_by_id`][Self::update_by_id], returning the updated rows.
    pub fn get_updated_by_id(
        &mut self,
        ids: &[i64],
        updates: &[(&str, Values)],
        allow_missing: bool,
    ) -> Result<RecordArray, Error> {
        self.update_by_id(ids, updates, allow_missing)?;
        self.filter(&Query::ids(ids.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{array_equal, ArrayType, DType, Schema};
    use crate::test_utils::{fancy_test_array, FancyTestArray};
    use crate::{ErrorKind, EMPTY_ID};

    #[test]
    fn test_set_columns() -> Result<(), Error> {
        let mut array = fancy_test_array()?;
        array.set_values("id", [9, 9, 9])?;
        assert_eq!(array.ids()?, &[9, 9, 9]);
        array.set("test_int", 123)?;
        assert_eq!(array.ints("test_int")?, &[123, 123, 123]);
        array.set_where("test_str", &[false, true, false], "x")?;
        assert_eq!(array.strs("test_str")?, &["a", "x", "d"]);
        assert!(array
            .set_values("test_int", [1, 2])
            .is_err_and(|e| e.kind() == ErrorKind::InvalidValue));
        Ok(())
    }

    #[test]
    fn test_overflow_keeps_previous_value() -> Result<(), Error> {
        let schema = Schema::builder("TapArray")
            .column("tap_min", DType::I8)
            .build()?;
        let mut array = crate::RecordArray::empty(&schema, 1)?;
        assert!(array
            .set("tap_min", -167)
            .is_err_and(|e| e.kind() == ErrorKind::Overflow));
        assert_eq!(array.ints("tap_min")?, &[-128]);
        Ok(())
    }

    #[test]
    fn test_set_rows() -> Result<(), Error> {
        let mut array = fancy_test_array()?;
        array.set_row(0, [9, 9, 9, 9, 9].map(Value::from).to_vec())?;
        assert_eq!(array.ids()?, &[9, 2, 3]);
        assert_eq!(array.strs("test_str")?, &["9", "c", "d"]);

        let mut array = fancy_test_array()?;
        array.assign_rows(&[true, false, true], &FancyTestArray::zeros(2)?)?;
        assert_eq!(array.ids()?, &[EMPTY_ID, 2, EMPTY_ID]);

        assert!(array
            .assign_rows(&[true, false, true], &FancyTestArray::zeros(3)?)
            .is_err_and(|e| e.kind() == ErrorKind::InvalidValue));
        Ok(())
    }

    #[test]
    fn test_sort() -> Result<(), Error> {
        let mut array = fancy_test_array()?;
        array.sort(&["test_float"])?;
        assert_eq!(array.floats("test_float")?, &[1.0, 4.0, 4.0]);
        assert_eq!(array.ids()?, &[3, 1, 2]);

        array.sort(&["test_bool", "test_int"])?;
        assert_eq!(array.ids()?, &[2, 1, 3]);
        Ok(())
    }

    #[test]
    fn test_re_order() -> Result<(), Error> {
        let array = fancy_test_array()?;
        let reordered = array.re_order([3, 1, 2], "id")?;
        assert_eq!(reordered.ids()?, &[3, 1, 2]);
        assert_eq!(reordered.strs("test_str")?, &["d", "a", "c"]);

        let reordered = array.re_order(["d", "a", "c"], "test_str")?;
        assert_eq!(reordered.ids()?, &[3, 1, 2]);

        assert!(array
            .re_order([3, 1], "id")
            .is_err_and(|e| e.kind() == ErrorKind::InvalidValue));
        Ok(())
    }

    #[test]
    fn test_update_by_id() -> Result<(), Error> {
        let mut array = fancy_test_array()?;
        let updated = array.get_updated_by_id(&[1, 3], &[("test_str", Values::scalar("e"))], false)?;
        assert_eq!(updated.ids()?, &[1, 3]);
        assert_eq!(updated.strs("test_str")?, &["e", "e"]);
        assert_eq!(array.strs("test_str")?, &["e", "c", "e"]);

        let updated = array.get_updated_by_id(
            &[1, 3, 1, 3, 1, 3],
            &[("test_str", Values::scalar("e"))],
            false,
        )?;
        assert_eq!(updated.ids()?, &[1, 3]);

        array.update_by_id(
            &[1, 3],
            &[
                ("test_str", Values::scalar("e")),
                ("test_int", Values::list([88, 99])),
            ],
            false,
        )?;
        assert_eq!(array.ints("test_int")?, &[88, 0, 99]);

        let before = array.clone();
        array.update_by_id(&[1, 3], &[("test_int", Values::list([88, 99]))], false)?;
        assert!(array_equal(&before, &array, true));
        Ok(())
    }

    #[test]
    fn test_update_by_id_errors() -> Result<(), Error> {
        let mut array = fancy_test_array()?;
        let is_value_error = |r: Result<(), Error>| r.is_err_and(|e| e.kind() == ErrorKind::InvalidValue);

        assert!(is_value_error(array.update_by_id(
            &[1, 3],
            &[("non_existing_column", Values::scalar(123))],
            false
        )));
        assert!(is_value_error(array.update_by_id(
            &[1, 3],
            &[("test_str", Values::list(["e", "f", "g"]))],
            false
        )));
        assert!(is_value_error(array.update_by_id(
            &[1, 4],
            &[("test_str", Values::scalar("e"))],
            false
        )));
        // Nothing was written by the failed calls.
        assert!(array_equal(&array, &fancy_test_array()?, true));

        array.update_by_id(&[1, 4], &[("test_str", Values::scalar("e"))], true)?;
        assert_eq!(array.get(&Query::id(1))?.record()?.str("test_str")?, "e");

        let non_id = Schema::builder("FancyNonIdArray")
            .column("test_int", DType::I64)
            .column("test_str", DType::Str)
            .build()?;
        let mut non_id_array = RecordArray::zeros(&non_id, 10)?;
        assert!(is_value_error(non_id_array.update_by_id(
            &[1, 4],
            &[("test_str", Values::scalar("e"))],
            false
        )));
        Ok(())
    }
}
