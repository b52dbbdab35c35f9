//! # Tables and Rows
//!
//! A `Table` is what a read produces and what a write consumes: the schema,
//! the header the table was read from (or a fresh one for new tables), and
//! the rows in file order.
//!
//! Every row carries one value per schema column, auto-generated columns
//! included. The codec never mutates a row after it has been created.

use eyre::Result;
use smallvec::SmallVec;

use crate::error::CodecError;
use crate::header::Header;
use crate::records::schema::Schema;
use crate::records::value::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: SmallVec<[Value; 8]>,
}

impl Row {
    pub fn new(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Id of the row, taken from its first column.
    pub fn id(&self) -> Option<u32> {
        self.values.first().and_then(Value::as_id)
    }

    /// Copy of this row with the first column replaced.
    pub(crate) fn with_first(&self, value: Value) -> Self {
        let mut values = self.values.clone();
        if let Some(first) = values.first_mut() {
            *first = value;
        }
        Self { values }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    header: Header,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(schema: Schema, header: Header) -> Self {
        Self {
            schema,
            header,
            rows: Vec::new(),
        }
    }

    pub(crate) fn from_parts(schema: Schema, header: Header, rows: Vec<Row>) -> Self {
        Self {
            schema,
            header,
            rows,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row after checking it against the schema.
    pub fn push_row(&mut self, row: Row) -> Result<()> {
        self.check_row(self.rows.len(), &row)?;
        self.rows.push(row);
        Ok(())
    }

    pub(crate) fn check_row(&self, idx: usize, row: &Row) -> Result<()> {
        if row.len() != self.schema.column_count() {
            eyre::bail!(CodecError::InvalidRow {
                row: idx,
                reason: format!(
                    "expected {} values, found {}",
                    self.schema.column_count(),
                    row.len()
                ),
            });
        }
        for (col, value) in self.schema.columns().iter().zip(row.values()) {
            if !col.is_auto_generated() && !value.matches(col.ty) {
                eyre::bail!(CodecError::InvalidRow {
                    row: idx,
                    reason: format!(
                        "column '{}' expects {:?}, found {:?}",
                        col.name, col.ty, value
                    ),
                });
            }
        }
        Ok(())
    }
}
