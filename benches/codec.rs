//! Codec benchmarks for clientdb
//!
//! These benchmarks measure the bit-field codec on its own and whole-table
//! reads and writes for the fixed and offset-table layouts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box as hint_black_box;

use clientdb::codec::{read_table, write_table, ReadOptions, WriteOptions};
use clientdb::config::WDB5_FLAG_OFFSET_TABLE;
use clientdb::encoding::BitField;
use clientdb::header::{FormatVariant, Header};
use clientdb::records::{ColumnDef, ColumnType, Row, Schema, SchemaRegistry, Table, Value};

const ROW_COUNTS: [usize; 3] = [100, 1_000, 10_000];

fn schema() -> Schema {
    Schema::new(vec![
        ColumnDef::new("id", ColumnType::U32),
        ColumnDef::new("flags", ColumnType::U32)
            .with_bits(20)
            .expect("20 bits fit u32"),
        ColumnDef::new("level", ColumnType::I16),
        ColumnDef::new("scale", ColumnType::F32),
        ColumnDef::new("name", ColumnType::String),
    ])
}

fn table(header: Header, rows: usize) -> Table {
    let mut table = Table::new(schema(), header);
    for i in 0..rows {
        let row = Row::new([
            Value::U32(i as u32 + 1),
            Value::U32((i as u32 * 7) & 0xF_FFFF),
            Value::I16((i % 120) as i16 - 60),
            Value::F32(i as f32 * 0.5),
            Value::from(format!("Zone {}", i % 64)),
        ]);
        table.push_row(row).expect("row matches schema");
    }
    table
}

fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register("Zone", schema());
    registry
}

fn bench_bit_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("bit_field");

    for bits in [5u8, 12, 20, 32] {
        let field = BitField::new(Some(bits), 32);
        let raw: Vec<u64> = (0..1024u64).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();

        group.bench_with_input(BenchmarkId::new("decode_signed", bits), &raw, |b, raw| {
            b.iter(|| {
                let sum: i64 = raw.iter().map(|&r| field.decode_signed(black_box(r))).sum();
                hint_black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("encode", bits), &raw, |b, raw| {
            b.iter(|| {
                let sum: u64 = raw.iter().map(|&r| field.encode(black_box(r))).sum();
                hint_black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_table");
    let registry = registry();

    for rows in ROW_COUNTS {
        let layouts = [
            ("wdbc", Header::new(FormatVariant::Wdbc)),
            ("wdb5_offset", Header::wdb5(WDB5_FLAG_OFFSET_TABLE)),
        ];
        for (name, header) in layouts {
            let bytes = write_table(&table(header, rows), &WriteOptions::new())
                .expect("benchmark table encodes");

            group.bench_with_input(BenchmarkId::new(name, rows), &bytes, |b, bytes| {
                b.iter(|| {
                    let outcome =
                        read_table(black_box(bytes), &registry, "Zone", &ReadOptions::new());
                    hint_black_box(outcome)
                });
            });
        }
    }

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_table");

    for rows in ROW_COUNTS {
        let fixed = table(Header::new(FormatVariant::Wdbc), rows);
        group.bench_with_input(BenchmarkId::new("wdbc", rows), &fixed, |b, table| {
            b.iter(|| hint_black_box(write_table(black_box(table), &WriteOptions::new())));
        });

        let copies = table(Header::wdb5(0), rows);
        let options = WriteOptions::new().copy_table(true);
        group.bench_with_input(BenchmarkId::new("wdb5_copy", rows), &copies, |b, table| {
            b.iter(|| hint_black_box(write_table(black_box(table), &options)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_bit_field, bench_read, bench_write);
criterion_main!(benches);
