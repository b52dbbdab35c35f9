//! # Table Codec
//!
//! Entry points that read a whole table file into a [`Table`] and write a
//! [`Table`] back out. Everything below this module works on one layer of
//! the format; this module sequences them.
//!
//! ## Read Pipeline
//!
//! ```text
//! bytes ─> Header::parse ─> SchemaProvider::schema ─> RecordLayout::plan
//!       ─> RowDecoder::decode ─> RowDecoder::expand_copies ─> ReadOutcome
//! ```
//!
//! Header problems surface before any schema lookup: an unknown signature
//! is `UnknownFormat`, a zero record count or size is `InvalidFile`. A row
//! type the provider does not know is `MissingSchema`.
//!
//! ## Write Pipeline
//!
//! ```text
//! validate rows ─> collapse duplicates (copy table) ─> refresh header
//!   ─> header ─> records ─> string block | offset table
//!   ─> index table ─> copy table
//! ```
//!
//! Sizes that are only known after the records are written are patched
//! into the header afterwards: `string_block_size` receives the pool size,
//! or the offset-table position for offset-table layouts, in which case
//! `record_size` receives the longest record.
//!
//! Nothing is returned on failure: a fatal error discards the partial table
//! or buffer.

pub mod options;

pub use options::{ReadOptions, WriteOptions};

use std::path::Path;

use eyre::{bail, Result, WrapErr};
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::config::COPY_ENTRY_SIZE;
use crate::encoding::{ByteReader, ByteWriter};
use crate::error::{CodecError, StringResolutionWarning};
use crate::header::{Header, HeaderUpdate, RECORD_SIZE_FIELD, STRING_BLOCK_SIZE_FIELD};
use crate::records::{RecordLayout, Row, RowDecoder, RowEncoder, Schema, SchemaProvider, Table};

/// A decoded table plus the non-fatal problems met while decoding it.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    pub table: Table,
    pub warnings: Vec<StringResolutionWarning>,
}

/// Decodes `bytes` as a table of `row_type`, whose schema comes from
/// `provider`.
pub fn read_table<P>(
    bytes: &[u8],
    provider: &P,
    row_type: &str,
    options: &ReadOptions,
) -> Result<ReadOutcome>
where
    P: SchemaProvider + ?Sized,
{
    let mut reader = ByteReader::new(bytes);
    let header = Header::parse(&mut reader)?;

    let Some(schema) = provider.schema(row_type) else {
        bail!(CodecError::MissingSchema {
            row_type: row_type.to_owned(),
        });
    };
    check_field_structure(&header, &schema);

    let layout = RecordLayout::plan(&header, bytes, reader.position())?;
    let mut decoder =
        RowDecoder::new(&schema, &layout, bytes)?.strict_strings(options.is_strict());
    let mut rows = decoder.decode()?;
    let copies = decoder.expand_copies(&mut rows)?;
    let warnings = decoder.into_warnings();

    debug!(
        row_type,
        variant = ?header.variant(),
        rows = rows.len(),
        copies,
        warnings = warnings.len(),
        "read table"
    );

    Ok(ReadOutcome {
        table: Table::from_parts(schema, header, rows),
        warnings,
    })
}

/// Reads and decodes the file at `path`.
pub fn read_file<P>(
    path: impl AsRef<Path>,
    provider: &P,
    row_type: &str,
    options: &ReadOptions,
) -> Result<ReadOutcome>
where
    P: SchemaProvider + ?Sized,
{
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).wrap_err_with(|| format!("failed to read '{}'", path.display()))?;
    read_table(&bytes, provider, row_type, options)
}

/// Encodes `table` into a complete file image.
pub fn write_table(table: &Table, options: &WriteOptions) -> Result<Vec<u8>> {
    let schema = table.schema();
    for (idx, row) in table.rows().iter().enumerate() {
        table.check_row(idx, row)?;
    }

    let mut header = table.header().clone();
    let (records, copies) = if options.uses_copy_table(&header) {
        collapse_duplicates(table.rows())
    } else {
        (table.rows().iter().collect(), Vec::new())
    };

    let (min_id, max_id) = id_range(table.rows());
    let update = HeaderUpdate {
        schema,
        records: &records,
        record_size: planned_record_size(&header, schema),
        min_id,
        max_id,
        copy_table_size: (copies.len() * COPY_ENTRY_SIZE) as u32,
    };
    header.refresh(&update)?;

    let ids = record_ids(&header, &records)?;

    let mut writer = ByteWriter::with_capacity(estimated_size(&header, records.len()));
    header.write(&mut writer);

    let mut encoder = RowEncoder::new(schema, &header, options.allows_duplicate_strings());
    let offsets = encoder.encode(&mut writer, &records)?;

    match header.as_wdb5().filter(|h| h.has_offset_table()) {
        Some(wdb5) => {
            let table_pos = u32::try_from(writer.position())
                .map_err(|_| eyre::eyre!("offset table position exceeds 4 GiB"))?;
            let longest = offsets.iter().map(|&(_, len)| len).max().unwrap_or(0);
            writer.patch_u32(STRING_BLOCK_SIZE_FIELD, table_pos)?;
            writer.patch_u32(RECORD_SIZE_FIELD, longest)?;
            wdb5.write_offset_table(&mut writer, &offsets, &ids)?;
        }
        None => {
            let pool = encoder.into_pool();
            writer.patch_u32(STRING_BLOCK_SIZE_FIELD, pool.size() as u32)?;
            writer.write_bytes(pool.as_bytes());
        }
    }

    if let Some(wdb5) = header.as_wdb5() {
        if wdb5.has_index_table() {
            wdb5.write_index_table(&mut writer, &ids);
        }
        wdb5.write_copy_table(&mut writer, &copies);
    }

    debug!(
        variant = ?header.variant(),
        records = records.len(),
        copies = copies.len(),
        bytes = writer.position(),
        "wrote table"
    );
    Ok(writer.into_inner())
}

/// Encodes `table` and writes the file at `path` in one call.
pub fn write_file(path: impl AsRef<Path>, table: &Table, options: &WriteOptions) -> Result<()> {
    let path = path.as_ref();
    let bytes = write_table(table, options)?;
    std::fs::write(path, bytes).wrap_err_with(|| format!("failed to write '{}'", path.display()))
}

/// Splits rows into the ones written as records and `(new_id, source_id)`
/// pairs for rows equal to an earlier record in everything but the id.
fn collapse_duplicates(rows: &[Row]) -> (Vec<&Row>, Vec<(u32, u32)>) {
    let mut sources: HashMap<Vec<u8>, u32> = HashMap::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    let mut copies = Vec::new();

    for row in rows {
        let Some(id) = row.id() else {
            records.push(row);
            continue;
        };
        let mut key = Vec::new();
        for value in row.values().iter().skip(1) {
            value.write_key(&mut key);
        }
        match sources.get(&key) {
            Some(&source_id) => copies.push((id, source_id)),
            None => {
                sources.insert(key, id);
                records.push(row);
            }
        }
    }
    (records, copies)
}

/// Ids for the offset and index tables, one per record. Offset-table slots
/// are keyed by id, so there every record needs its own id.
fn record_ids(header: &Header, records: &[&Row]) -> Result<Vec<u32>> {
    if !header.has_offset_table() && !header.has_index_table() {
        return Ok(Vec::new());
    }
    let unique = header.has_offset_table();
    let mut seen: HashMap<u32, usize> = HashMap::with_capacity(records.len());
    let mut ids = Vec::with_capacity(records.len());

    for (idx, row) in records.iter().enumerate() {
        let Some(id) = row.id() else {
            bail!(CodecError::InvalidRow {
                row: idx,
                reason: "first column does not hold an integer id".to_owned(),
            });
        };
        if unique {
            if let Some(first) = seen.insert(id, idx) {
                bail!(CodecError::InvalidRow {
                    row: idx,
                    reason: format!("id {} already used by row {}", id, first),
                });
            }
        }
        ids.push(id);
    }
    Ok(ids)
}

fn id_range(rows: &[Row]) -> (u32, u32) {
    let mut ids = rows.iter().filter_map(Row::id);
    let Some(first) = ids.next() else {
        return (0, 0);
    };
    ids.fold((first, first), |(min, max), id| (min.min(id), max.max(id)))
}

/// Fixed layouts keep the declared record size unless the schema needs more.
/// Offset-table layouts get their record size patched after encoding.
fn planned_record_size(header: &Header, schema: &Schema) -> u32 {
    if header.has_offset_table() {
        return header.record_size();
    }
    let width = schema
        .record_width(false, header.has_index_table())
        .unwrap_or(0) as u32;
    header.record_size().max(width)
}

fn estimated_size(header: &Header, records: usize) -> usize {
    64 + records * header.record_size() as usize
}

fn check_field_structure(header: &Header, schema: &Schema) {
    let Some(wdb5) = header.as_wdb5() else {
        return;
    };
    if wdb5.has_offset_table() || wdb5.field_structure().is_empty() {
        return;
    }
    let stored: usize = wdb5.field_structure().iter().map(|f| f.byte_width()).sum();
    let expected = schema.record_width(false, wdb5.has_index_table());
    if expected != Some(stored) {
        warn!(
            stored,
            expected = ?expected,
            "field structure width differs from schema width"
        );
    }
}
