// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

use super::{array_type, built_in, IdArray, EMPTY_ID};
use crate::array::{ArrayType, DType, RecordArray, Schema, Value};
use crate::{ArrayKind, Error};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static BRANCH: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("BranchArray")
            .extends(&IdArray::schema())
            .column("from_node", DType::I32)
            .column("to_node", DType::I32)
            .column("from_status", DType::I8)
            .column("to_status", DType::I8)
            .column("feeder_branch_id", DType::I32)
            .column("feeder_node_id", DType::I32)
            .column("is_feeder", DType::Bool)
            .default("feeder_branch_id", EMPTY_ID)
            .default("feeder_node_id", EMPTY_ID)
            .default("is_feeder", false)
            .optional_columns(),
    )
});

static LINE: Lazy<Arc<Schema>> = Lazy::new(|| {
    let mut builder = Schema::builder("LineArray")
        .extends(&BranchArray::schema())
        .kind(ArrayKind::Line);
    for column in ["r1", "x1", "c1", "tan1", "i_n"] {
        builder = builder.column(column, DType::F64);
    }
    built_in(builder.optional_columns())
});

static LINK: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("LinkArray")
            .extends(&BranchArray::schema())
            .kind(ArrayKind::Link)
            .optional_columns(),
    )
});

static TRANSFORMER: Lazy<Arc<Schema>> = Lazy::new(|| {
    let mut builder = Schema::builder("TransformerArray")
        .extends(&BranchArray::schema())
        .kind(ArrayKind::Transformer);
    for column in ["u1", "u2", "sn", "uk", "pk", "i0", "p0"] {
        builder = builder.column(column, DType::F64);
    }
    for column in [
        "winding_from",
        "winding_to",
        "clock",
        "tap_side",
        "tap_pos",
        "tap_min",
        "tap_max",
        "tap_nom",
    ] {
        builder = builder.column(column, DType::I8);
    }
    built_in(
        builder
            .column("tap_size", DType::F64)
            .optional_columns(),
    )
});

static BRANCH3: Lazy<Arc<Schema>> = Lazy::new(|| {
    built_in(
        Schema::builder("Branch3Array")
            .extends(&IdArray::schema())
            .column("node_1", DType::I32)
            .column("node_2", DType::I32)
            .column("node_3", DType::I32)
            .column("status_1", DType::I8)
            .column("status_2", DType::I8)
            .column("status_3", DType::I8)
            .optional_columns(),
    )
});

static THREE_WINDING_TRANSFORMER: Lazy<Arc<Schema>> = Lazy::new(|| {
    let mut builder = Schema::builder("ThreeWindingTransformerArray")
        .extends(&Branch3Array::schema())
        .kind(ArrayKind::ThreeWindingTransformer);
    for column in [
        "u1", "u2", "u3", "sn_1", "sn_2", "sn_3", "uk_12", "uk_13", "uk_23", "pk_12", "pk_13",
        "pk_23", "i0", "p0",
    ] {
        builder = builder.column(column, DType::F64);
    }
    for column in [
        "winding_1",
        "winding_2",
        "winding_3",
        "clock_12",
        "clock_13",
        "tap_side",
        "tap_pos",
        "tap_min",
        "tap_max",
        "tap_nom",
    ] {
        builder = builder.column(column, DType::I8);
    }
    built_in(builder.column("tap_size", DType::F64).optional_columns())
});

array_type!(
    /// Two-terminal branches of any type.
    BranchArray => BRANCH
);
array_type!(LineArray => LINE);
array_type!(
    /// Zero-impedance connections between two nodes.
    LinkArray => LINK
);
array_type!(TransformerArray => TRANSFORMER);
array_type!(
    /// Three-terminal branches of any type.
    Branch3Array => BRANCH3
);
array_type!(ThreeWindingTransformerArray => THREE_WINDING_TRANSFORMER);

/// Selects branches by how many branches share their pair of nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParallelMode {
    /// Exactly `n` branches share the pair.
    Eq,
    /// Any other number of branches shares the pair.
    Neq,
}

/// Helpers for arrays with `BranchArray` columns.
pub trait BranchColumns {
    /// Whether each branch is in service at both ends.
    fn is_active(&self) -> Result<Vec<bool>, Error>;

    /// All from nodes followed by all to nodes.
    fn node_ids(&self) -> Result<Vec<i64>, Error>;

    /// The branches whose node pair, in either direction, is shared by
    /// exactly (`Eq`) or not exactly (`Neq`) `n` branches.
    fn filter_parallel(&self, n: usize, mode: ParallelMode) -> Result<RecordArray, Error>;
}

/// The unordered node pair of each branch.
fn node_pairs(array: &RecordArray) -> Result<Vec<(i64, i64)>, Error> {
    Ok(array
        .ints("from_node")?
        .iter()
        .zip(array.ints("to_node")?)
        .map(|(&a, &b)| (a.min(b), a.max(b)))
        .collect())
}

impl BranchColumns for RecordArray {
    fn is_active(&self) -> Result<Vec<bool>, Error> {
        Ok(self
            .ints("from_status")?
            .iter()
            .zip(self.ints("to_status")?)
            .map(|(&from, &to)| from == 1 && to == 1)
            .collect())
    }

    fn node_ids(&self) -> Result<Vec<i64>, Error> {
        let mut ids = self.ints("from_node")?.to_vec();
        ids.extend_from_slice(self.ints("to_node")?);
        Ok(ids)
    }

    fn filter_parallel(&self, n: usize, mode: ParallelMode) -> Result<RecordArray, Error> {
        let pairs = node_pairs(self)?;
        let mut counts: HashMap<(i64, i64), usize> = HashMap::new();
        for pair in &pairs {
            *counts.entry(*pair).or_default() += 1;
        }
        let mask: Vec<bool> = pairs
            .iter()
            .map(|pair| {
                let shared = counts.get(pair).copied().unwrap_or(0) == n;
                match mode {
                    ParallelMode::Eq => shared,
                    ParallelMode::Neq => !shared,
                }
            })
            .collect();
        self.select(&mask)
    }
}

/// Helpers for arrays with `Branch3Array` columns.
pub trait Branch3Columns {
    /// Splits every three-terminal branch into its 1-2, 1-3 and 2-3 branches.
    ///
    /// All 1-2 branches come first, then all 1-3 and all 2-3 branches. Each
    /// keeps the id of its three-terminal branch and the statuses of its own
    /// two terminals.
    fn as_branches(&self) -> Result<RecordArray, Error>;
}

impl Branch3Columns for RecordArray {
    fn as_branches(&self) -> Result<RecordArray, Error> {
        let ids = self.ids()?;
        let mut from_node = vec![];
        let mut to_node = vec![];
        let mut from_status = vec![];
        let mut to_status = vec![];
        for (a, b) in [(1, 2), (1, 3), (2, 3)] {
            from_node.extend_from_slice(self.ints(&format!("node_{a}"))?);
            to_node.extend_from_slice(self.ints(&format!("node_{b}"))?);
            from_status.extend_from_slice(self.ints(&format!("status_{a}"))?);
            to_status.extend_from_slice(self.ints(&format!("status_{b}"))?);
        }
        let column = |values: Vec<i64>| values.into_iter().map(Value::from).collect::<Vec<_>>();
        RecordArray::from_columns(
            &BranchArray::schema(),
            vec![
                ("id".to_string(), column(ids.repeat(3))),
                ("from_node".to_string(), column(from_node)),
                ("to_node".to_string(), column(to_node)),
                ("from_status".to_string(), column(from_status)),
                ("to_status".to_string(), column(to_status)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::array_equal;

    fn parallel_branches() -> Result<RecordArray, Error> {
        BranchArray::builder()
            .column("from_node", [0, 0, 1])
            .column("to_node", [1, 1, 2])
            .build()
    }

    #[test]
    fn test_is_active() -> Result<(), Error> {
        let branches = BranchArray::builder()
            .column("from_status", [1, 1, 0, 0])
            .column("to_status", [1, 0, 1, 0])
            .build()?;
        assert_eq!(branches.is_active()?, vec![true, false, false, false]);
        Ok(())
    }

    #[test]
    fn test_node_ids() -> Result<(), Error> {
        let branches = BranchArray::builder()
            .column("from_node", [0, 1])
            .column("to_node", [1, 2])
            .build()?;
        assert_eq!(branches.node_ids()?, vec![0, 1, 1, 2]);
        Ok(())
    }

    #[test]
    fn test_filter_parallel() -> Result<(), Error> {
        let branches = parallel_branches()?;
        assert!(array_equal(
            &branches.filter_parallel(1, ParallelMode::Eq)?,
            &branches.take(&[2])?,
            true
        ));
        assert!(array_equal(
            &branches.filter_parallel(1, ParallelMode::Neq)?,
            &branches.take(&[0, 1])?,
            true
        ));
        assert_eq!(branches.filter_parallel(2, ParallelMode::Eq)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_as_branches() -> Result<(), Error> {
        let branch3 = Branch3Array::builder()
            .column("id", [10])
            .column("node_1", [1])
            .column("node_2", [2])
            .column("node_3", [3])
            .column("status_1", [1])
            .column("status_2", [1])
            .column("status_3", [0])
            .build()?;
        let branches = branch3.as_branches()?;
        assert_eq!(branches.ids()?, &[10, 10, 10]);
        assert_eq!(branches.ints("from_node")?, &[1, 1, 2]);
        assert_eq!(branches.ints("to_node")?, &[2, 3, 3]);
        assert_eq!(branches.ints("from_status")?, &[1, 1, 1]);
        assert_eq!(branches.ints("to_status")?, &[1, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_as_branches_multiple() -> Result<(), Error> {
        let branch3 = Branch3Array::builder()
            .column("id", [10, 11])
            .column("node_1", [1, 4])
            .column("node_2", [2, 5])
            .column("node_3", [3, 6])
            .column("status_1", [1, 1])
            .column("status_2", [1, 1])
            .column("status_3", [1, 0])
            .build()?;
        let mut branches = branch3.as_branches()?;
        branches.sort(&["from_node", "to_node"])?;
        assert_eq!(branches.ints("from_node")?, &[1, 1, 2, 4, 4, 5]);
        assert_eq!(branches.ints("to_node")?, &[2, 3, 3, 5, 6, 6]);
        assert_eq!(branches.ints("from_status")?, &[1, 1, 1, 1, 1, 1]);
        assert_eq!(branches.ints("to_status")?, &[1, 1, 1, 1, 0, 0]);
        Ok(())
    }

    #[test]
    fn test_typed_branches_are_branches() -> Result<(), Error> {
        for array in [LineArray::empty(1)?, LinkArray::empty(1)?, TransformerArray::empty(1)?] {
            assert!(BranchArray::is_instance(&array));
            assert!(!Branch3Array::is_instance(&array));
            assert_eq!(array.bools("is_feeder")?, &[false]);
        }
        assert!(Branch3Array::is_instance(&ThreeWindingTransformerArray::empty(1)?));
        Ok(())
    }
}
