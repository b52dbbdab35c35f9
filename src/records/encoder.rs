//! # Row Encoder
//!
//! Serializes rows into the record area of an output buffer. The mirror of
//! the row decoder: auto-generated columns and the index-table column are
//! not written, packed integers are masked to their bit width, and strings
//! go inline or into a [`StringPoolBuilder`] depending on the layout.
//!
//! Fixed layouts pad every record to `record_size`. Offset-table layouts
//! record `(start, length)` for each row so the writer can emit the offset
//! table afterwards.

use eyre::{bail, Result};
use tracing::trace;

use crate::encoding::ByteWriter;
use crate::error::CodecError;
use crate::header::Header;
use crate::records::schema::Schema;
use crate::records::string_pool::StringPoolBuilder;
use crate::records::table::Row;
use crate::records::types::{ColumnDef, ColumnType};
use crate::records::value::Value;

/// Absolute `(start, length)` of every record written, in row order.
pub type OffsetMap = Vec<(u32, u32)>;

pub struct RowEncoder<'a> {
    schema: &'a Schema,
    header: &'a Header,
    pool: StringPoolBuilder,
}

impl<'a> RowEncoder<'a> {
    pub fn new(schema: &'a Schema, header: &'a Header, allow_duplicate_strings: bool) -> Self {
        Self {
            schema,
            header,
            pool: StringPoolBuilder::new(allow_duplicate_strings),
        }
    }

    /// Writes every row at the writer's current position.
    pub fn encode(&mut self, writer: &mut ByteWriter, rows: &[&Row]) -> Result<OffsetMap> {
        let mut offsets = OffsetMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let start = writer.position();
            self.encode_row(writer, idx, row)?;
            let len = writer.position() - start;
            offsets.push((to_u32(start)?, to_u32(len)?));

            self.header
                .write_record_padding(writer, start, idx + 1 == rows.len())?;
            trace!(row = idx, start, len, "encoded row");
        }
        Ok(offsets)
    }

    fn encode_row(&mut self, writer: &mut ByteWriter, row_idx: usize, row: &Row) -> Result<()> {
        if row.len() != self.schema.column_count() {
            bail!(CodecError::InvalidRow {
                row: row_idx,
                reason: format!(
                    "expected {} values, found {}",
                    self.schema.column_count(),
                    row.len()
                ),
            });
        }

        let index_table = self.header.has_index_table();
        for (col_idx, (col, value)) in self.schema.columns().iter().zip(row.values()).enumerate() {
            if !self.schema.is_stored(col_idx, index_table) {
                continue;
            }
            self.write_value(writer, row_idx, col, value)?;
        }
        Ok(())
    }

    fn write_value(
        &mut self,
        writer: &mut ByteWriter,
        row_idx: usize,
        col: &ColumnDef,
        value: &Value,
    ) -> Result<()> {
        if let ColumnType::Unknown(_) = col.ty {
            bail!(CodecError::UnsupportedType {
                column: col.name.clone(),
                ty: col.ty,
            });
        }
        if !value.matches(col.ty) {
            bail!(CodecError::InvalidRow {
                row: row_idx,
                reason: format!("column '{}' expects {:?}, found {:?}", col.name, col.ty, value),
            });
        }

        match value {
            Value::Bool(b) => writer.write_u8(u8::from(*b)),
            Value::F32(f) => writer.write_f32(*f),
            Value::Str(s) if self.header.has_offset_table() => writer.write_cstr(s),
            Value::Str(s) => {
                let offset = self.pool.insert(s);
                writer.write_u32(offset);
            }
            other => {
                let (Some(field), Some(raw)) = (col.bit_field(), other.raw_bits()) else {
                    bail!(CodecError::UnsupportedType {
                        column: col.name.clone(),
                        ty: col.ty,
                    });
                };
                writer.write_uint(field.encode(raw), field.byte_len());
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &StringPoolBuilder {
        &self.pool
    }

    pub fn into_pool(self) -> StringPoolBuilder {
        self.pool
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| eyre::eyre!("output offset {} exceeds 4 GiB", value))
}
