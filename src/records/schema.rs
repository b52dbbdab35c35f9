//! # Schema Definition
//!
//! A `Schema` is the ordered list of column definitions a table is decoded
//! against. Schemas are supplied from outside the codec through the
//! [`SchemaProvider`] trait, keyed by a row-type name such as `"Map"` or
//! `"ItemDisplayInfo"`.
//!
//! ## Stored Columns
//!
//! Not every column occupies bytes in a record:
//!
//! - auto-generated columns are synthesized from the row ordinal
//! - when the file carries an index table, the first column's value lives in
//!   that table instead of the record body

use hashbrown::HashMap;

use crate::records::types::ColumnDef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub(crate) columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, idx: usize) -> Option<&ColumnDef> {
        self.columns.get(idx)
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether column `idx` is read from / written to the record body.
    pub fn is_stored(&self, idx: usize, index_table: bool) -> bool {
        match self.columns.get(idx) {
            Some(col) => !col.is_auto_generated() && !(index_table && idx == 0),
            None => false,
        }
    }

    /// Columns that occupy bytes in the record body, in schema order.
    pub fn stored_columns(&self, index_table: bool) -> usize {
        (0..self.columns.len())
            .filter(|&idx| self.is_stored(idx, index_table))
            .count()
    }

    /// Byte width of one record body, or `None` when inline strings make the
    /// width value-dependent.
    pub fn record_width(&self, inline_strings: bool, index_table: bool) -> Option<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.is_stored(*idx, index_table))
            .map(|(_, col)| col.stored_width(inline_strings))
            .sum()
    }
}

/// Resolves the column list for a requested row type.
pub trait SchemaProvider {
    fn schema(&self, row_type: &str) -> Option<Schema>;
}

/// In-memory [`SchemaProvider`] keyed by row-type name.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, row_type: impl Into<String>, schema: Schema) -> &mut Self {
        self.schemas.insert(row_type.into(), schema);
        self
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaProvider for SchemaRegistry {
    fn schema(&self, row_type: &str) -> Option<Schema> {
        self.schemas.get(row_type).cloned()
    }
}
