// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A named collection of record arrays that share one id space.

use crate::array::{Query, Record, RecordArray, Value};
use crate::{Error, EMPTY_ID};
use std::collections::HashMap;

/// Record arrays stored by name, with ids unique across all of them.
///
/// New rows without an id get one from the container's id counter, which
/// always holds the highest id handed out or appended so far.
#[derive(Clone, Debug, Default)]
pub struct ArrayContainer {
    arrays: Vec<(String, RecordArray)>,
    id_counter: i64,
}

impl ArrayContainer {
    /// Creates a container without arrays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `array` under `name`, replacing an earlier array of that name.
    pub fn with_array(mut self, name: impl Into<String>, array: RecordArray) -> Self {
        self.insert(name, array);
        self
    }

    /// Stores `array` under `name`, replacing an earlier array of that name.
    pub fn insert(&mut self, name: impl Into<String>, array: RecordArray) {
        let name = name.into();
        match self.arrays.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = array,
            None => self.arrays.push((name, array)),
        }
    }

    /// The arrays in insertion order.
    pub fn all_arrays(&self) -> impl Iterator<Item = &RecordArray> {
        self.arrays.iter().map(|(_, array)| array)
    }

    /// The arrays and their names, in insertion order.
    pub fn named_arrays(&self) -> impl Iterator<Item = (&str, &RecordArray)> {
        self.arrays.iter().map(|(name, array)| (name.as_str(), array))
    }

    pub fn array(&self, name: &str) -> Result<&RecordArray, Error> {
        self.arrays
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, array)| array)
            .ok_or_else(|| Error::invalid_value(format!("No array named '{name}'.")))
    }

    pub fn array_mut(&mut self, name: &str) -> Result<&mut RecordArray, Error> {
        self.arrays
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, array)| array)
            .ok_or_else(|| Error::invalid_value(format!("No array named '{name}'.")))
    }

    /// The highest id handed out or appended so far.
    pub fn id_counter(&self) -> i64 {
        self.id_counter
    }

    pub(crate) fn set_id_counter(&mut self, id_counter: i64) {
        self.id_counter = id_counter;
    }

    /// Checks that no id occurs twice, within or across arrays.
    ///
    /// Arrays without an `id` column and rows without an id are skipped.
    pub fn check_ids(&self) -> Result<(), Error> {
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for array in self.all_arrays().filter(|a| a.has_column("id")) {
            for &id in array.ids()? {
                if id != EMPTY_ID {
                    *counts.entry(id).or_default() += 1;
                }
            }
        }
        let mut duplicates: Vec<i64> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, _)| id)
            .collect();
        if duplicates.is_empty() {
            return Ok(());
        }
        duplicates.sort_unstable();
        Err(Error::invalid_value(format!(
            "Duplicate ids found: {}.",
            duplicates
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Every row holding `id`, in array order.
    ///
    /// Fails with `RecordDoesNotExist` when no array has a row with that id.
    pub fn search_for_id(&self, id: i64) -> Result<Vec<Record<'_>>, Error> {
        let mut found = vec![];
        for array in self.all_arrays().filter(|a| a.has_column("id")) {
            for (row, &value) in array.ids()?.iter().enumerate() {
                if value == id {
                    found.push(array.row(row)?);
                }
            }
        }
        if found.is_empty() {
            return Err(Error::record_does_not_exist(format!(
                "No record with id {id} found."
            )));
        }
        Ok(found)
    }

    /// Appends `array` to the array named `name`, after converting it to that
    /// array's schema.
    ///
    /// Rows without ids get fresh ones from the counter. Arrays mixing rows
    /// with and without ids are rejected, and with `check_max_id`, so are
    /// explicit ids that are not above the counter.
    ///
    /// Returns the appended rows, with their final ids.
    pub fn append(
        &mut self,
        name: &str,
        array: &RecordArray,
        check_max_id: bool,
    ) -> Result<RecordArray, Error> {
        let target = self.array(name)?;
        let mut rows = if target.schema().same_layout(array.schema()) {
            array.clone()
        } else {
            array.convert_to(target.schema())?
        };
        let id_counter = if rows.has_column("id") {
            self.assign_ids(&mut rows, check_max_id)?
        } else {
            self.id_counter
        };

        self.array_mut(name)?.append(&rows)?;
        self.id_counter = id_counter;
        Ok(rows)
    }

    /// Gives fresh ids to rows without one and returns the updated counter.
    fn assign_ids(&self, rows: &mut RecordArray, check_max_id: bool) -> Result<i64, Error> {
        let ids = rows.ids()?;
        let nr_empty = ids.iter().filter(|&&id| id == EMPTY_ID).count();

        if nr_empty > 0 && nr_empty == ids.len() {
            let start = self.id_counter + 1;
            let end = self.id_counter + ids.len() as i64;
            rows.set_values("id", (start..=end).map(Value::Int))?;
            return Ok(end);
        }
        if nr_empty > 0 {
            return Err(Error::invalid_value(format!(
                "Cannot append {}: {nr_empty} of {} rows have no id.",
                rows.schema().name(),
                ids.len()
            )));
        }
        if check_max_id {
            if let Some(id) = ids.iter().find(|&&id| id <= self.id_counter) {
                return Err(Error::invalid_value(format!(
                    "Cannot append {}: id {id} is not above the id counter {}.",
                    rows.schema().name(),
                    self.id_counter
                )));
            }
        }
        Ok(ids.iter().copied().fold(self.id_counter, i64::max))
    }

    /// Removes the rows of the array named `name` that match `query`, and
    /// returns them.
    pub(crate) fn remove_where(&mut self, name: &str, query: &Query) -> Result<RecordArray, Error> {
        let array = self.array(name)?;
        if array.is_empty() {
            return Ok(array.clone());
        }
        let removed = array.filter(query)?;
        let kept = array.exclude(query)?;
        *self.array_mut(name)? = kept;
        Ok(removed)
    }
}
