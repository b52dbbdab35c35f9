//! Tests for the records module

use super::*;
use crate::config::WDB5_FLAG_OFFSET_TABLE;
use crate::encoding::{ByteReader, ByteWriter};
use crate::error::CodecError;
use crate::header::{FormatVariant, Header};

fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn wdbc_file(record_count: u32, record_size: u32, records: &[u8], pool: &[u8]) -> Vec<u8> {
    let mut bytes = b"WDBC".to_vec();
    bytes.extend(u32s(&[record_count, 2, record_size, pool.len() as u32]));
    bytes.extend_from_slice(records);
    bytes.extend_from_slice(pool);
    bytes
}

fn decode(bytes: &[u8], schema: &Schema) -> eyre::Result<(RecordLayout, Vec<Row>)> {
    let mut reader = ByteReader::new(bytes);
    let header = Header::parse(&mut reader)?;
    let layout = RecordLayout::plan(&header, bytes, reader.position())?;
    let rows = RowDecoder::new(schema, &layout, bytes)?.decode()?;
    Ok((layout, rows))
}

fn zone_schema() -> Schema {
    Schema::new(vec![
        ColumnDef::new("id", ColumnType::U32),
        ColumnDef::new("name", ColumnType::String),
    ])
}

/// WDB5 offset-table file with three records of 12, 9 and 12 bytes and the
/// given header record count.
fn offset_table_file(record_count: u32) -> Vec<u8> {
    let records: [(u32, &str); 3] = [(1, "Durotar"), (2, "Naxx"), (3, "Mulgore")];

    let mut body = Vec::new();
    let mut entries = Vec::new();
    let data_start = 48 + 2 * 4;
    for (id, name) in records {
        let offset = data_start + body.len();
        body.extend_from_slice(&id.to_le_bytes());
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        entries.push((offset as u32, (data_start + body.len() - offset) as u16));
    }
    let table_pos = (data_start + body.len()) as u32;

    let mut bytes = b"WDB5".to_vec();
    bytes.extend(u32s(&[record_count, 2, 12, table_pos, 0, 0, 1, 3, 0, 0]));
    bytes.extend_from_slice(&WDB5_FLAG_OFFSET_TABLE.to_le_bytes());
    bytes.extend_from_slice(&0u16.to_le_bytes());
    for (bits, offset) in [(0i16, 0u16), (0, 4)] {
        bytes.extend_from_slice(&bits.to_le_bytes());
        bytes.extend_from_slice(&offset.to_le_bytes());
    }
    bytes.extend(body);
    for (offset, len) in entries {
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());
    }
    bytes
}

#[test]
fn schema_counts_stored_columns() {
    let schema = Schema::new(vec![
        ColumnDef::new("id", ColumnType::U32),
        ColumnDef::new("ordinal", ColumnType::U32).auto_generated(),
        ColumnDef::new("name", ColumnType::String),
    ]);

    assert_eq!(schema.column_count(), 3);
    assert_eq!(schema.stored_columns(false), 2);
    assert_eq!(schema.stored_columns(true), 1);
    assert!(!schema.is_stored(1, false));
    assert!(!schema.is_stored(0, true));
    assert!(!schema.is_stored(7, false));
}

#[test]
fn schema_record_width_depends_on_layout() {
    let schema = Schema::new(vec![
        ColumnDef::new("id", ColumnType::U32),
        ColumnDef::new("flags", ColumnType::U32).with_bits(12).unwrap(),
        ColumnDef::new("name", ColumnType::String),
    ]);

    assert_eq!(schema.record_width(false, false), Some(10));
    assert_eq!(schema.record_width(false, true), Some(6));
    assert_eq!(schema.record_width(true, false), None);
}

#[test]
fn registry_resolves_registered_row_types() {
    let mut registry = SchemaRegistry::new();
    registry.register("AreaTable", zone_schema());

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.schema("AreaTable"), Some(zone_schema()));
    assert_eq!(registry.schema("Spell"), None);
}

#[test]
fn table_rejects_rows_that_do_not_fit_schema() {
    let mut table = Table::new(zone_schema(), Header::new(FormatVariant::Wdbc));

    table
        .push_row(Row::new([Value::U32(1), Value::from("Elwynn Forest")]))
        .unwrap();
    let short = table.push_row(Row::new([Value::U32(2)])).unwrap_err();
    let wrong = table
        .push_row(Row::new([Value::from("two"), Value::from("Westfall")]))
        .unwrap_err();

    assert!(matches!(
        short.downcast_ref::<CodecError>(),
        Some(CodecError::InvalidRow { row: 1, .. })
    ));
    assert!(matches!(
        wrong.downcast_ref::<CodecError>(),
        Some(CodecError::InvalidRow { row: 1, .. })
    ));
    assert_eq!(table.len(), 1);
}

#[test]
fn fixed_file_decodes_through_pool() {
    let records = u32s(&[1, 1, 2, 11]);
    let bytes = wdbc_file(2, 8, &records, b"\0Stormwind\0Ironforge\0");

    let (_, rows) = decode(&bytes, &zone_schema()).unwrap();
    assert_eq!(rows[0].values(), &[Value::U32(1), Value::from("Stormwind")]);
    assert_eq!(rows[1].values(), &[Value::U32(2), Value::from("Ironforge")]);
}

#[test]
fn pool_offset_zero_is_empty_string() {
    let records = u32s(&[5, 0]);
    let bytes = wdbc_file(1, 8, &records, b"\0");

    let (_, rows) = decode(&bytes, &zone_schema()).unwrap();
    assert_eq!(rows[0].get(1), Some(&Value::from("")));
}

#[test]
fn cursor_advances_full_record_size_for_short_schema() {
    let schema = Schema::new(vec![ColumnDef::new("id", ColumnType::U32)]);
    let records = u32s(&[10, 0xDEAD, 20, 0xBEEF]);
    let bytes = wdbc_file(2, 8, &records, b"\0");

    let (_, rows) = decode(&bytes, &schema).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id(), Some(10));
    assert_eq!(rows[1].id(), Some(20));
}

#[test]
fn oversized_schema_fails_without_producing_rows() {
    let schema = Schema::new(vec![
        ColumnDef::new("id", ColumnType::U32),
        ColumnDef::new("a", ColumnType::U32),
        ColumnDef::new("b", ColumnType::U32),
    ]);
    let records = u32s(&[1, 2]);
    let bytes = wdbc_file(1, 8, &records, b"\0padding\0");

    let err = decode(&bytes, &schema).unwrap_err();
    assert_eq!(
        err.downcast_ref::<CodecError>(),
        Some(&CodecError::SchemaOverflow {
            row: 0,
            consumed: 12,
            expected: 8
        })
    );
}

#[test]
fn offset_table_spans_drive_iterations() {
    let bytes = offset_table_file(3);
    let (layout, rows) = decode(&bytes, &zone_schema()).unwrap();

    let lens: Vec<usize> = layout.spans.iter().map(|span| span.len()).collect();
    assert_eq!(lens, vec![12, 9, 12]);
    assert!(layout.inline_strings);
    assert_eq!(layout.string_block, None);
    assert_eq!(layout.iterations(), 3);

    let names: Vec<&str> = rows.iter().filter_map(|r| r.get(1)?.as_str()).collect();
    assert_eq!(names, vec!["Durotar", "Naxx", "Mulgore"]);
}

#[test]
fn spans_beyond_record_count_are_all_decoded() {
    let bytes = offset_table_file(1);
    let (layout, rows) = decode(&bytes, &zone_schema()).unwrap();

    assert_eq!(layout.record_count, 1);
    assert_eq!(layout.spans.len(), 3);
    assert_eq!(layout.iterations(), 3);

    let names: Vec<&str> = rows.iter().filter_map(|r| r.get(1)?.as_str()).collect();
    assert_eq!(names, vec!["Durotar", "Naxx", "Mulgore"]);
}

#[test]
fn rows_past_span_array_continue_sequentially() {
    let bytes = offset_table_file(4);
    let (layout, rows) = decode(&bytes, &zone_schema()).unwrap();

    assert_eq!(layout.spans.len(), 3);
    assert_eq!(layout.iterations(), 4);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2].get(1), Some(&Value::from("Mulgore")));

    // the fourth row starts where Mulgore ended, which is the offset table:
    // its first entry is { offset: 56, length: 12 }
    assert_eq!(rows[3].id(), Some(56));
    assert_eq!(rows[3].get(1), Some(&Value::from("\u{c}")));
}

#[test]
fn legacy_pool_ignores_declared_block_size() {
    let records = u32s(&[1, 1]);
    let mut bytes = wdbc_file(1, 8, &records, b"\0Stormwind\0");
    bytes[16..20].copy_from_slice(&0u32.to_le_bytes());

    let schema = zone_schema();
    let mut reader = ByteReader::new(&bytes);
    let header = Header::parse(&mut reader).unwrap();
    let layout = RecordLayout::plan(&header, &bytes, reader.position()).unwrap();
    let mut decoder = RowDecoder::new(&schema, &layout, &bytes).unwrap();
    let rows = decoder.decode().unwrap();

    assert_eq!(rows[0].get(1), Some(&Value::from("Stormwind")));
    assert!(decoder.warnings().is_empty());
}

#[test]
fn encoded_rows_decode_back() {
    let schema = Schema::new(vec![
        ColumnDef::new("id", ColumnType::U32),
        ColumnDef::new("level", ColumnType::I8).with_bits(5).unwrap(),
        ColumnDef::new("scale", ColumnType::F32),
        ColumnDef::new("name", ColumnType::String),
    ]);
    let rows = [
        Row::new([
            Value::U32(12),
            Value::I8(-3),
            Value::F32(1.5),
            Value::from("Hogger"),
        ]),
        Row::new([
            Value::U32(13),
            Value::I8(11),
            Value::F32(0.25),
            Value::from(""),
        ]),
    ];
    let refs: Vec<&Row> = rows.iter().collect();

    let mut header = crate::header::WdbcHeader::new();
    header.common.set_record_size(13);
    let header = Header::Wdbc(header);

    let mut writer = ByteWriter::new();
    let mut encoder = RowEncoder::new(&schema, &header, false);
    encoder.encode(&mut writer, &refs).unwrap();
    let records = writer.into_inner();
    let pool = encoder.into_pool();

    let bytes = wdbc_file(2, 13, &records, pool.as_bytes());
    let (_, decoded) = decode(&bytes, &schema).unwrap();
    assert_eq!(decoded, rows.to_vec());
}
