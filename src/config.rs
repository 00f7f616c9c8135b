// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the configuration options for the `Grid`.

use crate::array::Schema;
use crate::ArrayKind;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Configuration options for the `Grid`.
///
/// Chooses the schema of every member array of a grid. Member arrays that
/// are not configured use their built-in schema. A configured schema must
/// extend the built-in schema of its slot, which `Grid::with_config`
/// checks.
///
/// <details>
/// <summary>Example:</summary>
///
/// ```ignore
/// let line = Schema::builder("ExtendedLineArray")
///     .extends(&LineArray::schema())
///     .column("i_from", DType::F64)
///     .build()?;
/// let grid = Grid::with_config(GridConfig::default().with_schema(ArrayKind::Line, line))?;
/// ```
/// </details>
#[derive(Clone, Default, Debug)]
pub struct GridConfig {
    schemas: BTreeMap<ArrayKind, Arc<Schema>>,
}

impl GridConfig {
    /// Uses `schema` for the member array of the given kind.
    pub fn with_schema(mut self, kind: ArrayKind, schema: Arc<Schema>) -> Self {
        self.schemas.insert(kind, schema);
        self
    }

    /// The schema of the member array of the given kind.
    pub fn schema(&self, kind: ArrayKind) -> Arc<Schema> {
        self.schemas
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.schema())
    }
}
