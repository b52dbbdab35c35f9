//! # WDB2 Header
//!
//! Second generation: the WDBC fields plus build metadata and an id range.
//!
//! ```text
//! +--------+------------------+------------+-------+-----------+--------+--------+--------+-----------+
//! | "WDB2" | common (4 x u32) | table_hash | build | timestamp | min_id | max_id | locale | copy_size |
//! +--------+------------------+------------+-------+-----------+--------+--------+--------+-----------+
//! ```
//!
//! ## Sparse Tables
//!
//! Files from builds above `WDB2_SPARSE_BUILD` with a nonzero `max_id` carry
//! two arrays between the header and the first record, each with one slot
//! per id in `min_id..=max_id`:
//!
//! - `u32` row index of the record holding that id
//! - `u16` total string length of that record
//!
//! Both are kept as parsed and rebuilt from the rows on write.

use eyre::{ensure, Result};
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{CommonFields, HeaderUpdate};
use crate::config::{WDB2_HEADER_SIZE, WDB2_SIGNATURE, WDB2_SPARSE_BUILD};
use crate::encoding::{ByteReader, ByteWriter};
use crate::records::{ColumnType, Row};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct Wdb2Fields {
    table_hash: U32,
    build: U32,
    timestamp: U32,
    min_id: U32,
    max_id: U32,
    locale: U32,
    copy_table_size: U32,
}

const _: () = assert!(
    std::mem::size_of::<CommonFields>() + std::mem::size_of::<Wdb2Fields>() + 4
        == WDB2_HEADER_SIZE
);

impl Wdb2Fields {
    le_accessors! {
        table_hash: u32,
        build: u32,
        timestamp: u32,
        min_id: u32,
        max_id: u32,
        locale: u32,
        copy_table_size: u32,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SparseTables {
    pub indices: Vec<u32>,
    pub string_lengths: Vec<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wdb2Header {
    pub(crate) common: CommonFields,
    pub(crate) fields: Wdb2Fields,
    pub(crate) sparse: Option<SparseTables>,
}

impl Wdb2Header {
    pub fn new(build: u32) -> Self {
        let mut fields = Wdb2Fields::new_zeroed();
        fields.set_build(build);
        Self {
            common: CommonFields::zeroed(),
            fields,
            sparse: None,
        }
    }

    pub fn fields(&self) -> &Wdb2Fields {
        &self.fields
    }

    pub fn sparse(&self) -> Option<&SparseTables> {
        self.sparse.as_ref()
    }

    fn carries_sparse(&self) -> bool {
        self.fields.build() > WDB2_SPARSE_BUILD && self.fields.max_id() != 0
    }

    fn sparse_len(&self) -> Result<usize> {
        let (min, max) = (self.fields.min_id(), self.fields.max_id());
        ensure!(max >= min, "WDB2 id range is inverted: min {} > max {}", min, max);
        Ok((max - min) as usize + 1)
    }

    pub(crate) fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let common = CommonFields::parse(reader)?;
        let bytes = reader.take(std::mem::size_of::<Wdb2Fields>())?;
        let fields = Wdb2Fields::read_from_bytes(bytes)
            .map_err(|e| eyre::eyre!("failed to parse WDB2 header: {:?}", e))?;

        let mut header = Self {
            common,
            fields,
            sparse: None,
        };

        if header.carries_sparse() {
            let len = header.sparse_len()?;
            let capacity = len.min(reader.remaining() / 6);
            let mut sparse = SparseTables {
                indices: Vec::with_capacity(capacity),
                string_lengths: Vec::with_capacity(capacity),
            };
            for _ in 0..len {
                sparse.indices.push(reader.read_u32()?);
            }
            for _ in 0..len {
                sparse.string_lengths.push(reader.read_u16()?);
            }
            header.sparse = Some(sparse);
        }

        Ok(header)
    }

    pub(crate) fn refresh(&mut self, update: &HeaderUpdate<'_>) -> Result<()> {
        self.common.refresh(update, false);
        self.fields.set_min_id(update.min_id);
        self.fields.set_max_id(update.max_id);
        self.fields.set_copy_table_size(0);

        self.sparse = None;
        if self.carries_sparse() {
            let len = self.sparse_len()?;
            let mut sparse = SparseTables {
                indices: vec![0; len],
                string_lengths: vec![0; len],
            };
            for (ordinal, row) in update.records.iter().enumerate() {
                let Some(id) = row.id() else { continue };
                if id < update.min_id || id > update.max_id {
                    continue;
                }
                let slot = (id - update.min_id) as usize;
                sparse.indices[slot] = ordinal as u32;
                sparse.string_lengths[slot] = string_bytes(update, row);
            }
            self.sparse = Some(sparse);
        }
        Ok(())
    }

    pub(crate) fn write(&self, writer: &mut ByteWriter) {
        writer.write_bytes(WDB2_SIGNATURE);
        writer.write_bytes(self.common.as_bytes());
        writer.write_bytes(self.fields.as_bytes());
        if let Some(sparse) = &self.sparse {
            for &index in &sparse.indices {
                writer.write_u32(index);
            }
            for &len in &sparse.string_lengths {
                writer.write_u16(len);
            }
        }
    }
}

fn string_bytes(update: &HeaderUpdate<'_>, row: &Row) -> u16 {
    let total: usize = update
        .schema
        .columns()
        .iter()
        .zip(row.values())
        .filter(|(col, _)| col.ty == ColumnType::String)
        .filter_map(|(_, value)| value.as_str())
        .map(str::len)
        .sum();
    total.min(u16::MAX as usize) as u16
}
