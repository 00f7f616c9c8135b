// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Serializable snapshots of a [`Grid`].

use super::Grid;
use crate::array::{ColumnData, RecordArray, Schema};
use crate::{ArrayKind, Error, GridConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The raw columns of one member array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArraySnapshot {
    /// The member array name, as in [`ArrayKind::name`].
    pub name: String,
    pub columns: Vec<(String, ColumnData)>,
}

/// The state of a grid's arrays, sufficient to recreate the grid.
///
/// Graphs are not part of the snapshot; they are rebuilt from the arrays on
/// load.
///
/// <details>
/// <summary>Example</summary>
///
/// ```ignore
/// let json = serde_json::to_string(&grid.snapshot())?;
/// let snapshot: GridSnapshot = serde_json::from_str(&json)?;
/// let restored = Grid::from_snapshot(&snapshot, GridConfig::default())?;
/// ```
///
/// </details>
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub id_counter: i64,
    pub arrays: Vec<ArraySnapshot>,
}

impl Grid {
    /// Takes a snapshot of all member arrays and the id counter.
    pub fn snapshot(&self) -> GridSnapshot {
        let arrays = self
            .arrays
            .named_arrays()
            .map(|(name, array)| ArraySnapshot {
                name: name.to_string(),
                columns: array
                    .column_names()
                    .map(str::to_string)
                    .zip(array.columns().iter().cloned())
                    .collect(),
            })
            .collect();
        GridSnapshot {
            id_counter: self.id_counter(),
            arrays,
        }
    }

    /// Recreates a grid from a snapshot, with the schemas of `config`.
    ///
    /// Columns missing from the snapshot are filled with their default.
    /// Fails with `InvalidValue` for unknown array names, columns of
    /// different lengths and missing columns without a default, and with
    /// `InvalidType` if a column's values do not fit its type.
    pub fn from_snapshot(snapshot: &GridSnapshot, config: GridConfig) -> Result<Grid, Error> {
        let arrays = snapshot
            .arrays
            .iter()
            .map(|array| {
                let kind = ArrayKind::from_name(&array.name).ok_or_else(|| {
                    Error::invalid_value(format!("Unknown grid array '{}'.", array.name))
                })?;
                Ok((kind, restore_array(&config.schema(kind), array)?))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Grid::from_member_arrays(config, arrays, snapshot.id_counter)
    }
}

fn restore_array(schema: &Arc<Schema>, snapshot: &ArraySnapshot) -> Result<RecordArray, Error> {
    let len = snapshot.columns.first().map_or(0, |(_, data)| data.len());
    for (name, _) in &snapshot.columns {
        if !schema.has_column(name) {
            tracing::warn!("Dropping column '{name}' of {}: not in {}.", snapshot.name, schema.name());
        }
    }

    let mut columns = Vec::with_capacity(schema.nr_columns());
    for (idx, def) in schema.columns().iter().enumerate() {
        let column = match snapshot.columns.iter().find(|(name, _)| name == def.name()) {
            Some((_, data)) if data.len() != len => {
                return Err(Error::invalid_value(format!(
                    "Column '{}' of {} has {} values, expected {len}.",
                    def.name(),
                    snapshot.name,
                    data.len()
                )))
            }
            Some((_, data)) if !data.matches_dtype(def.dtype()) => {
                return Err(Error::invalid_type(format!(
                    "Column '{}' of {} does not hold {:?} values.",
                    def.name(),
                    snapshot.name,
                    def.dtype()
                )))
            }
            Some((_, data)) => {
                let mut column = ColumnData::with_capacity(def.dtype(), len);
                for row in 0..len {
                    column.push(def.coerce(data.get(row))?);
                }
                column
            }
            None => match schema.default_at(idx) {
                Some(default) => ColumnData::filled(def.dtype(), default, len),
                None => {
                    return Err(Error::invalid_value(format!(
                        "Column '{}' of {} is missing and has no default.",
                        def.name(),
                        schema.name()
                    )))
                }
            },
        };
        columns.push(column);
    }
    Ok(RecordArray::from_parts(schema.clone(), columns))
}
