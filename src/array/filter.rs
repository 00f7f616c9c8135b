// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Row selection by column values.

use super::{mask_indices, RecordArray, Value};
use crate::Error;

/// How the criteria of a [`Query`] are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    #[default]
    And,
    Or,
}

/// Selection criteria for [`RecordArray::filter`] and friends.
///
/// Each criterion names a column and the values it may hold. A criterion
/// with an empty value list matches no row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    criteria: Vec<(String, Vec<Value>)>,
    mode: FilterMode,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a criterion on the `id` column.
    pub fn ids<V: Into<Value>>(ids: impl IntoIterator<Item = V>) -> Self {
        Self::new().is_in("id", ids)
    }

    /// Shorthand for a single id.
    pub fn id(id: impl Into<Value>) -> Self {
        Self::new().eq("id", id)
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.is_in(column, [value.into()])
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.criteria
            .push((column.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Filtering methods.
impl RecordArray {
    /// Per row, whether the row matches `query`.
    pub fn filter_mask(&self, query: &Query) -> Result<Vec<bool>, Error> {
        if query.is_empty() {
            return Err(Error::invalid_type(
                "No filter criteria given; pass at least one column and value.",
            ));
        }
        let mut mask = vec![query.mode == FilterMode::And; self.len()];
        for (column, values) in &query.criteria {
            let data = self.column(column)?;
            for (row, selected) in mask.iter_mut().enumerate() {
                let hit = values.iter().any(|value| data.matches(row, value));
                *selected = match query.mode {
                    FilterMode::And => *selected && hit,
                    FilterMode::Or => *selected || hit,
                };
            }
        }
        Ok(mask)
    }

    /// The rows matching `query`, in their original order.
    pub fn filter(&self, query: &Query) -> Result<RecordArray, Error> {
        let mask = self.filter_mask(query)?;
        self.take(&mask_indices(&mask).collect::<Vec<_>>())
    }

    /// The negation of [`filter_mask`][Self::filter_mask].
    pub fn exclude_mask(&self, query: &Query) -> Result<Vec<bool>, Error> {
        Ok(self.filter_mask(query)?.into_iter().map(|m| !m).collect())
    }

    /// The rows not matching `query`, in their original order.
    pub fn exclude(&self, query: &Query) -> Result<RecordArray, Error> {
        let mask = self.exclude_mask(query)?;
        self.take(&mask_indices(&mask).collect::<Vec<_>>())
    }

    /// The single row matching `query`.
    pub fn get(&self, query: &Query) -> Result<RecordArray, Error> {
        let found = self.filter(query)?;
        match found.len() {
            1 => Ok(found),
            0 => Err(Error::record_does_not_exist(format!(
                "No record in {} matches {query:?}.",
                self.schema().name()
            ))),
            n => Err(Error::multiple_records_returned(format!(
                "{n} records in {} match {query:?}.",
                self.schema().name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fancy_test_array;
    use crate::ErrorKind;

    #[test]
    fn test_filter() -> Result<(), Error> {
        let array = fancy_test_array()?;
        assert_eq!(array.filter(&Query::id(1))?.ids()?, &[1]);
        assert_eq!(array.filter(&Query::new().eq("test_int", 4))?.ids()?, &[3]);
        assert_eq!(array.filter(&Query::new().eq("test_float", 4.0))?.ids()?, &[1, 2]);
        assert_eq!(array.filter(&Query::new().eq("test_str", "c"))?.ids()?, &[2]);
        assert!(array.filter(&Query::new().eq("test_str", "z"))?.is_empty());
        assert!(array.filter(&Query::ids(Vec::<i64>::new()))?.is_empty());

        // Original order is kept, not the order of the query values.
        assert_eq!(array.filter(&Query::ids([3, 1]))?.ids()?, &[1, 3]);

        let or = Query::new()
            .eq("test_float", 1.0)
            .eq("test_str", "a")
            .mode(FilterMode::Or);
        assert_eq!(array.filter(&or)?.ids()?, &[1, 3]);
        assert_eq!(array.filter_mask(&or)?, vec![true, false, true]);

        let and = Query::new().eq("test_float", 4.0).eq("test_bool", true);
        assert_eq!(array.filter(&and)?.ids()?, &[1]);
        Ok(())
    }

    #[test]
    fn test_filter_without_criteria() -> Result<(), Error> {
        let array = fancy_test_array()?;
        assert!(array
            .filter(&Query::new())
            .is_err_and(|e| e.kind() == ErrorKind::InvalidType));
        assert!(array
            .exclude_mask(&Query::new())
            .is_err_and(|e| e.kind() == ErrorKind::InvalidType));
        assert!(array
            .filter(&Query::new().eq("non_existing", 1))
            .is_err_and(|e| e.kind() == ErrorKind::InvalidValue));
        Ok(())
    }

    #[test]
    fn test_exclude() -> Result<(), Error> {
        let array = fancy_test_array()?;
        assert_eq!(array.exclude(&Query::id(1))?.ids()?, &[2, 3]);
        assert_eq!(array.exclude_mask(&Query::new().eq("test_int", 4))?, vec![true, true, false]);
        assert_eq!(array.exclude(&Query::new().eq("test_float", 4.0))?.ids()?, &[3]);
        assert_eq!(array.exclude(&Query::new().eq("test_str", "z"))?.len(), 3);
        assert_eq!(array.exclude(&Query::ids(Vec::<i64>::new()))?.len(), 3);

        let or = Query::new()
            .eq("test_float", 1.0)
            .eq("test_str", "a")
            .mode(FilterMode::Or);
        assert_eq!(array.exclude_mask(&or)?, vec![false, true, false]);
        assert_eq!(array.exclude(&or)?.ids()?, &[2]);
        Ok(())
    }

    #[test]
    fn test_get() -> Result<(), Error> {
        let array = fancy_test_array()?;
        let found = array.get(&Query::id(2))?;
        assert_eq!(found.record()?.str("test_str")?, "c");

        assert!(array
            .get(&Query::id(9))
            .is_err_and(|e| e.kind() == ErrorKind::RecordDoesNotExist));
        assert!(array
            .get(&Query::new().eq("test_float", 4.0))
            .is_err_and(|e| e.kind() == ErrorKind::MultipleRecordsReturned));
        Ok(())
    }
}
