//! # WDB5 Header
//!
//! Third generation. Adds layout flags, a per-field storage table, and the
//! auxiliary tables that can follow the records.
//!
//! ```text
//! +--------+------------------+------------+-------------+--------+--------+--------+-----------+-------+----------+
//! | "WDB5" | common (4 x u32) | table_hash | layout_hash | min_id | max_id | locale | copy_size | flags | id_index |
//! +--------+------------------+------------+-------------+--------+--------+--------+-----------+-------+----------+
//! | field structure: field_count x { bits: i16, offset: u16 }                                                    |
//! +--------------------------------------------------------------------------------------------------------------+
//! ```
//!
//! A field's stored width is `(32 - bits) / 8` bytes.
//!
//! ## Flags
//!
//! | Bit | Meaning |
//! |-----|---------|
//! | `0x01` | offset table: variable-width records, inline strings, `string_block_size` holds the table position |
//! | `0x02` | second index: suppresses the 4-byte tail alignment after the last record |
//! | `0x04` | index table: the first column is stored after the records, not in them |
//!
//! ## Trailing Tables
//!
//! ```text
//! records | string block or offset table | index table | copy table
//! ```
//!
//! - offset table: `(max_id - min_id + 1)` x `{ offset: u32, length: u16 }`,
//!   one slot per id, zeroed for ids with no record
//! - index table: `record_count` x `u32` id
//! - copy table: `copy_size / 8` x `{ new_id: u32, source_id: u32 }`

use eyre::{ensure, Result};
use hashbrown::HashMap;
use zerocopy::little_endian::{I16, U16, U32};
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::{CommonFields, HeaderUpdate};
use crate::config::{
    FIELD_ENTRY_SIZE, OFFSET_ENTRY_SIZE, STRING_REF_WIDTH, WDB5_FLAG_INDEX_TABLE,
    WDB5_FLAG_OFFSET_TABLE, WDB5_FLAG_SECOND_INDEX, WDB5_HEADER_SIZE, WDB5_SIGNATURE,
};
use crate::encoding::{ByteReader, ByteWriter};
use crate::error::CodecError;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct Wdb5Fields {
    table_hash: U32,
    layout_hash: U32,
    min_id: U32,
    max_id: U32,
    locale: U32,
    copy_table_size: U32,
    flags: U16,
    id_index: U16,
}

const _: () = assert!(
    std::mem::size_of::<CommonFields>() + std::mem::size_of::<Wdb5Fields>() + 4
        == WDB5_HEADER_SIZE
);

impl Wdb5Fields {
    le_accessors! {
        table_hash: u32,
        layout_hash: u32,
        min_id: u32,
        max_id: u32,
        locale: u32,
        copy_table_size: u32,
        flags: u16,
        id_index: u16,
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct FieldEntry {
    bits: I16,
    offset: U16,
}

const _: () = assert!(std::mem::size_of::<FieldEntry>() == FIELD_ENTRY_SIZE);

impl FieldEntry {
    le_accessors! {
        bits: i16,
        offset: u16,
    }

    /// Entry for a field `width` bytes wide starting `offset` bytes into the
    /// record. Both must fit the 16-bit on-disk fields.
    pub fn for_width(width: usize, offset: usize) -> Result<Self> {
        let offset = u16::try_from(offset)
            .map_err(|_| eyre::eyre!("field offset {} exceeds the 16-bit field structure", offset))?;
        let bits = i16::try_from(width)
            .ok()
            .and_then(|w| w.checked_mul(8))
            .map(|b| 32 - b)
            .ok_or_else(|| eyre::eyre!("field width {} cannot be stored as a bit count", width))?;

        let mut entry = Self::new_zeroed();
        entry.set_bits(bits);
        entry.set_offset(offset);
        Ok(entry)
    }

    pub fn byte_width(&self) -> usize {
        ((32 - i32::from(self.bits())) / 8).max(0) as usize
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct OffsetEntry {
    offset: U32,
    length: U16,
}

const _: () = assert!(std::mem::size_of::<OffsetEntry>() == OFFSET_ENTRY_SIZE);

impl OffsetEntry {
    le_accessors! {
        offset: u32,
        length: u16,
    }

    pub fn is_empty(&self) -> bool {
        self.offset() == 0 || self.length() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wdb5Header {
    pub(crate) common: CommonFields,
    pub(crate) fields: Wdb5Fields,
    pub(crate) field_structure: Vec<FieldEntry>,
}

impl Wdb5Header {
    pub fn new(flags: u16) -> Self {
        let mut fields = Wdb5Fields::new_zeroed();
        fields.set_flags(flags);
        Self {
            common: CommonFields::zeroed(),
            fields,
            field_structure: Vec::new(),
        }
    }

    pub fn fields(&self) -> &Wdb5Fields {
        &self.fields
    }

    pub fn field_structure(&self) -> &[FieldEntry] {
        &self.field_structure
    }

    pub fn has_offset_table(&self) -> bool {
        self.fields.flags() & WDB5_FLAG_OFFSET_TABLE != 0
    }

    pub fn has_second_index(&self) -> bool {
        self.fields.flags() & WDB5_FLAG_SECOND_INDEX != 0
    }

    pub fn has_index_table(&self) -> bool {
        self.fields.flags() & WDB5_FLAG_INDEX_TABLE != 0
    }

    pub(crate) fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let common = CommonFields::parse(reader)?;
        let bytes = reader.take(std::mem::size_of::<Wdb5Fields>())?;
        let fields = Wdb5Fields::read_from_bytes(bytes)
            .map_err(|e| eyre::eyre!("failed to parse WDB5 header: {:?}", e))?;

        let table = reader.take(common.field_count() as usize * FIELD_ENTRY_SIZE)?;
        let field_structure = table
            .chunks_exact(FIELD_ENTRY_SIZE)
            .map(|chunk| {
                FieldEntry::read_from_bytes(chunk)
                    .map_err(|e| eyre::eyre!("failed to parse WDB5 field entry: {:?}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            common,
            fields,
            field_structure,
        })
    }

    /// Reads the offset table and returns its non-empty entries in id order.
    pub(crate) fn read_offset_table(&self, data: &[u8]) -> Result<Vec<OffsetEntry>> {
        let (min, max) = (self.fields.min_id(), self.fields.max_id());
        ensure!(max >= min, "WDB5 id range is inverted: min {} > max {}", min, max);

        let start = self.common.string_block_size() as usize;
        let len = ((max - min) as usize + 1) * OFFSET_ENTRY_SIZE;
        let Some(bytes) = data.get(start..start.saturating_add(len)) else {
            eyre::bail!(CodecError::Truncated {
                offset: start,
                needed: len,
                available: data.len().saturating_sub(start),
            });
        };

        let mut entries = Vec::new();
        for chunk in bytes.chunks_exact(OFFSET_ENTRY_SIZE) {
            let entry = OffsetEntry::read_from_bytes(chunk)
                .map_err(|e| eyre::eyre!("failed to parse WDB5 offset entry: {:?}", e))?;
            if !entry.is_empty() {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    pub(crate) fn refresh(&mut self, update: &HeaderUpdate<'_>) -> Result<()> {
        let index_table = self.has_index_table();

        self.common.refresh(update, index_table);
        self.fields.set_min_id(update.min_id);
        self.fields.set_max_id(update.max_id);
        self.fields.set_copy_table_size(update.copy_table_size);

        let schema = update.schema;
        let mut offset = 0usize;
        self.field_structure = schema
            .columns()
            .iter()
            .enumerate()
            .filter(|(idx, _)| schema.is_stored(*idx, index_table))
            .map(|(_, col)| {
                let width = col.stored_width(false).unwrap_or(STRING_REF_WIDTH);
                let entry = FieldEntry::for_width(width, offset)?;
                offset += width;
                Ok(entry)
            })
            .collect::<Result<_>>()?;
        Ok(())
    }

    pub(crate) fn write(&self, writer: &mut ByteWriter) {
        writer.write_bytes(WDB5_SIGNATURE);
        writer.write_bytes(self.common.as_bytes());
        writer.write_bytes(self.fields.as_bytes());
        for entry in &self.field_structure {
            writer.write_bytes(entry.as_bytes());
        }
    }

    /// Emits one offset slot per id in `min_id..=max_id`. `spans[i]` is the
    /// `(offset, length)` of the record written for `ids[i]`.
    pub fn write_offset_table(
        &self,
        writer: &mut ByteWriter,
        spans: &[(u32, u32)],
        ids: &[u32],
    ) -> Result<()> {
        if spans.is_empty() {
            return Ok(());
        }
        let (min, max) = (self.fields.min_id(), self.fields.max_id());
        ensure!(max >= min, "WDB5 id range is inverted: min {} > max {}", min, max);

        let mut by_id: HashMap<u32, (u32, u32)> = HashMap::with_capacity(spans.len());
        for (&id, &span) in ids.iter().zip(spans) {
            by_id.insert(id, span);
        }

        for id in min..=max {
            let mut entry = OffsetEntry::new_zeroed();
            if let Some(&(offset, length)) = by_id.get(&id) {
                ensure!(
                    length <= u32::from(u16::MAX),
                    "record for id {} is {} bytes, offset table lengths are 16-bit",
                    id,
                    length
                );
                entry.set_offset(offset);
                entry.set_length(length as u16);
            }
            writer.write_bytes(entry.as_bytes());
        }
        Ok(())
    }

    pub fn write_index_table(&self, writer: &mut ByteWriter, ids: &[u32]) {
        for &id in ids {
            writer.write_u32(id);
        }
    }

    pub fn write_copy_table(&self, writer: &mut ByteWriter, copies: &[(u32, u32)]) {
        for &(new_id, source_id) in copies {
            writer.write_u32(new_id);
            writer.write_u32(source_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_entry_encodes_width_as_bits() {
        let entry = FieldEntry::for_width(3, 8).unwrap();
        assert_eq!(entry.bits(), 8);
        assert_eq!(entry.offset(), 8);
        assert_eq!(entry.byte_width(), 3);
    }

    #[test]
    fn field_offset_past_16_bits_is_rejected() {
        assert!(FieldEntry::for_width(4, usize::from(u16::MAX)).is_ok());
        assert!(FieldEntry::for_width(4, 65_536).is_err());
    }
}
