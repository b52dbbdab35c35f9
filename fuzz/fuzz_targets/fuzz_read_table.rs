//! Fuzz testing for the table reader.
//!
//! Feeds arbitrary bytes and an arbitrary column list through `read_table`.
//! Malformed input must come back as an error, never a panic. Tables that
//! do decode are written back out to exercise the encoder on odd shapes.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use clientdb::codec::{read_table, write_table, ReadOptions, WriteOptions};
use clientdb::records::{ColumnDef, ColumnType, Schema, SchemaRegistry};

#[derive(Debug, Arbitrary)]
struct ReadInput {
    columns: Vec<FuzzColumn>,
    strict: bool,
    data: Vec<u8>,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
struct FuzzColumn {
    ty: FuzzColumnType,
    bits: Option<u8>,
    auto_generated: bool,
}

#[derive(Debug, Arbitrary, Clone, Copy)]
enum FuzzColumnType {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    String,
    Unknown(u8),
}

impl From<FuzzColumnType> for ColumnType {
    fn from(fct: FuzzColumnType) -> Self {
        match fct {
            FuzzColumnType::Bool => ColumnType::Bool,
            FuzzColumnType::I8 => ColumnType::I8,
            FuzzColumnType::U8 => ColumnType::U8,
            FuzzColumnType::I16 => ColumnType::I16,
            FuzzColumnType::U16 => ColumnType::U16,
            FuzzColumnType::I32 => ColumnType::I32,
            FuzzColumnType::U32 => ColumnType::U32,
            FuzzColumnType::I64 => ColumnType::I64,
            FuzzColumnType::U64 => ColumnType::U64,
            FuzzColumnType::F32 => ColumnType::F32,
            FuzzColumnType::String => ColumnType::String,
            FuzzColumnType::Unknown(tag) => ColumnType::Unknown(tag),
        }
    }
}

fn column(idx: usize, fuzz: FuzzColumn) -> ColumnDef {
    let mut def = ColumnDef::new(format!("c{idx}"), fuzz.ty.into());
    if let Some(bits) = fuzz.bits {
        def = match def.clone().with_bits(bits) {
            Ok(packed) => packed,
            Err(_) => def,
        };
    }
    if fuzz.auto_generated {
        def = def.auto_generated();
    }
    def
}

fuzz_target!(|input: ReadInput| {
    if input.columns.is_empty() || input.columns.len() > 64 {
        return;
    }

    let columns = input
        .columns
        .iter()
        .enumerate()
        .map(|(idx, &fuzz)| column(idx, fuzz))
        .collect();
    let mut registry = SchemaRegistry::new();
    registry.register("Fuzz", Schema::new(columns));

    let options = ReadOptions::new().strict_strings(input.strict);
    if let Ok(outcome) = read_table(&input.data, &registry, "Fuzz", &options) {
        let _ = write_table(&outcome.table, &WriteOptions::new());
    }
});
