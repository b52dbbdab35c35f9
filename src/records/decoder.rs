//! # Row Decoder
//!
//! Walks the record area described by a [`RecordLayout`] and produces one
//! [`Row`] per record, in file order.
//!
//! ## Per-Column Rules
//!
//! | Column | Bytes consumed | Value |
//! |--------|----------------|-------|
//! | auto-generated | 0 | row ordinal + 1 |
//! | first column, index table present | 0 | index table entry for the row |
//! | packed integer | `ceil(bits / 8)` | sign-extended or masked |
//! | string, offset-table layout | until `\0` | inline text |
//! | string, pool layout | 4 | pool lookup, placeholder if missing |
//! | unknown type | 4 | `Value::Null` |
//!
//! After the last column the cursor is advanced to the end of the record.
//! A record that consumed more than its width fails with
//! `CodecError::SchemaOverflow` and no row is produced for it.
//!
//! ## Copy Table
//!
//! [`RowDecoder::expand_copies`] appends one row per copy entry: a clone of
//! the first row whose id equals the entry's source id, with the id column
//! replaced by the entry's new id.

use eyre::{bail, Result};
use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::{trace, warn};

use crate::config::{COPY_ENTRY_SIZE, UNKNOWN_COLUMN_WIDTH, UNRESOLVED_STRING};
use crate::encoding::ByteReader;
use crate::error::{CodecError, StringResolutionWarning};
use crate::records::layout::RecordLayout;
use crate::records::schema::Schema;
use crate::records::string_pool::StringPool;
use crate::records::table::Row;
use crate::records::types::{ColumnDef, ColumnType};
use crate::records::value::Value;

pub struct RowDecoder<'a> {
    schema: &'a Schema,
    layout: &'a RecordLayout,
    data: &'a [u8],
    pool: StringPool,
    index_ids: Vec<u32>,
    strict_strings: bool,
    warnings: Vec<StringResolutionWarning>,
}

impl<'a> RowDecoder<'a> {
    /// Prepares a decoder, parsing the string block and index table once.
    pub fn new(schema: &'a Schema, layout: &'a RecordLayout, data: &'a [u8]) -> Result<Self> {
        let pool = match &layout.string_block {
            Some(range) if !layout.inline_strings => StringPool::parse(slice(data, range)?),
            _ => StringPool::default(),
        };

        let mut index_ids = Vec::new();
        if let Some(range) = &layout.index_table {
            let mut reader = ByteReader::new(slice(data, range)?);
            while reader.remaining() >= 4 {
                index_ids.push(reader.read_u32()?);
            }
        }

        Ok(Self {
            schema,
            layout,
            data,
            pool,
            index_ids,
            strict_strings: false,
            warnings: Vec::new(),
        })
    }

    /// Fail on the first unresolved string instead of substituting the
    /// placeholder.
    pub fn strict_strings(mut self, strict: bool) -> Self {
        self.strict_strings = strict;
        self
    }

    pub fn pool(&self) -> &StringPool {
        &self.pool
    }

    /// Decodes every record. Offset-table layouts seek to each span; rows
    /// past the span array and fixed layouts read sequentially.
    pub fn decode(&mut self) -> Result<Vec<Row>> {
        let mut reader = ByteReader::new(self.data);
        reader.seek(self.layout.data_start)?;

        let iterations = self.layout.iterations();
        let mut rows = Vec::with_capacity(iterations.min(self.data.len()));
        for idx in 0..iterations {
            let expected = match self.layout.spans.get(idx) {
                Some(span) => {
                    reader.seek(span.start)?;
                    span.len()
                }
                None => self.layout.record_size,
            };
            let start = reader.position();
            let row = self.decode_row(&mut reader, idx, expected)?;
            trace!(row = idx, start, expected, "decoded row");
            rows.push(row);
        }
        Ok(rows)
    }

    fn decode_row(
        &mut self,
        reader: &mut ByteReader<'_>,
        row: usize,
        expected: usize,
    ) -> Result<Row> {
        let start = reader.position();
        let index_column = self.layout.has_index_table();

        let mut values: SmallVec<[Value; 8]> = SmallVec::new();
        for (col_idx, col) in self.schema.columns().iter().enumerate() {
            let value = if col.is_auto_generated() {
                Value::from_id(col.ty, row as u32 + 1)
            } else if index_column && col_idx == 0 {
                let id = self.index_ids.get(row).copied().unwrap_or(0);
                Value::from_id(col.ty, id)
            } else {
                self.read_value(reader, row, col_idx, col)?
            };
            values.push(value);
        }

        let consumed = reader.position() - start;
        if consumed > expected {
            bail!(CodecError::SchemaOverflow {
                row,
                consumed,
                expected,
            });
        }
        reader.skip(expected - consumed)?;
        Ok(Row::new(values))
    }

    fn read_value(
        &mut self,
        reader: &mut ByteReader<'_>,
        row: usize,
        col_idx: usize,
        col: &ColumnDef,
    ) -> Result<Value> {
        let value = match col.ty {
            ColumnType::Bool => Value::Bool(reader.read_u8()? != 0),
            ColumnType::F32 => Value::F32(reader.read_f32()?),
            ColumnType::String if self.layout.inline_strings => Value::Str(reader.read_cstr()?),
            ColumnType::String => {
                let offset = reader.read_u32()?;
                Value::Str(self.resolve(row, col_idx, offset)?)
            }
            ColumnType::Unknown(_) => {
                reader.skip(UNKNOWN_COLUMN_WIDTH)?;
                Value::Null
            }
            ty => {
                let Some(field) = col.bit_field() else {
                    bail!(CodecError::UnsupportedType {
                        column: col.name.clone(),
                        ty,
                    });
                };
                let raw = reader.read_uint(field.byte_len())?;
                let bits = if ty.is_signed() {
                    field.decode_signed(raw) as u64
                } else {
                    field.decode_unsigned(raw)
                };
                Value::from_raw(ty, bits).ok_or_else(|| {
                    eyre::eyre!("column '{}' of type {:?} is not an integer", col.name, ty)
                })?
            }
        };
        Ok(value)
    }

    fn resolve(&mut self, row: usize, column: usize, offset: u32) -> Result<String> {
        if let Some(text) = self.pool.get(offset) {
            return Ok(text.to_owned());
        }

        let warning = StringResolutionWarning {
            row,
            column,
            offset,
        };
        if self.strict_strings {
            bail!(CodecError::UnresolvedString(warning));
        }
        warn!(row, column, offset, "string offset does not start a pool entry");
        self.warnings.push(warning);
        Ok(UNRESOLVED_STRING.to_owned())
    }

    /// Appends the rows described by the copy table. Returns how many rows
    /// were added.
    pub fn expand_copies(&self, rows: &mut Vec<Row>) -> Result<usize> {
        let Some(range) = &self.layout.copy_table else {
            return Ok(0);
        };
        let Some(id_column) = self.schema.column(0) else {
            return Ok(0);
        };

        let mut sources: HashMap<u32, usize> = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if let Some(id) = row.id() {
                sources.entry(id).or_insert(idx);
            }
        }

        let bytes = slice(self.data, range)?;
        if bytes.len() % COPY_ENTRY_SIZE != 0 {
            warn!(
                len = bytes.len(),
                "copy table length is not a multiple of the entry size"
            );
        }

        let mut reader = ByteReader::new(bytes);
        let mut added = 0;
        while reader.remaining() >= COPY_ENTRY_SIZE {
            let new_id = reader.read_u32()?;
            let source_id = reader.read_u32()?;
            let Some(&source) = sources.get(&source_id) else {
                warn!(new_id, source_id, "copy table entry references a missing row");
                continue;
            };
            let copy = rows[source].with_first(Value::from_id(id_column.ty, new_id));
            rows.push(copy);
            added += 1;
        }
        Ok(added)
    }

    pub fn warnings(&self) -> &[StringResolutionWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<StringResolutionWarning> {
        self.warnings
    }
}

fn slice<'d>(data: &'d [u8], range: &std::ops::Range<usize>) -> Result<&'d [u8]> {
    match data.get(range.clone()) {
        Some(bytes) => Ok(bytes),
        None => bail!(CodecError::Truncated {
            offset: range.start,
            needed: range.len(),
            available: data.len().saturating_sub(range.start),
        }),
    }
}
