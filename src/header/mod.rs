//! # Header Variants
//!
//! Every table file starts with a 4-byte signature that selects one of three
//! header generations. The signature is followed by four u32 fields shared by
//! all generations and then by generation-specific fields.
//!
//! | Signature | Type | Layout |
//! |-----------|------|--------|
//! | `WDBC` | [`WdbcHeader`] | fixed records + string pool |
//! | `WDB2` | [`Wdb2Header`] | fixed records + string pool, optional sparse id tables |
//! | `WDB5` | [`Wdb5Header`] | fixed or offset-table records, optional index and copy tables |
//!
//! ## Signature Normalization
//!
//! Some tools wrote the signature as a little-endian u32, which reverses the
//! four characters on disk (`CBDW`). If the first byte is not `W` the bytes
//! are reversed before matching. Writes always emit the canonical order.
//!
//! ## Common Fields
//!
//! ```text
//! offset  0: signature          [u8; 4]
//! offset  4: record_count       u32
//! offset  8: field_count        u32
//! offset 12: record_size        u32   <- back-patched for offset-table writes
//! offset 16: string_block_size  u32   <- back-patched with pool size / table position
//! ```
//!
//! A header is valid only when both `record_count` and `record_size` are
//! nonzero; [`Header::parse`] rejects anything else with
//! `CodecError::InvalidFile`.

pub mod wdb2;
pub mod wdb5;
pub mod wdbc;

pub use wdb2::{SparseTables, Wdb2Fields, Wdb2Header};
pub use wdb5::{FieldEntry, OffsetEntry, Wdb5Fields, Wdb5Header};
pub use wdbc::WdbcHeader;

use eyre::{bail, ensure, Result};
use tracing::debug;
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{
    SIGNATURE_LEAD, SIGNATURE_SIZE, WDB2_SIGNATURE, WDB5_SIGNATURE, WDBC_SIGNATURE,
};
use crate::encoding::{ByteReader, ByteWriter};
use crate::error::CodecError;
use crate::records::{Row, Schema};

/// File position of the `record_size` field.
pub const RECORD_SIZE_FIELD: usize = SIGNATURE_SIZE + 8;
/// File position of the `string_block_size` field.
pub const STRING_BLOCK_SIZE_FIELD: usize = SIGNATURE_SIZE + 12;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct CommonFields {
    record_count: U32,
    field_count: U32,
    record_size: U32,
    string_block_size: U32,
}

const _: () = assert!(std::mem::size_of::<CommonFields>() == 16);

impl CommonFields {
    le_accessors! {
        record_count: u32,
        field_count: u32,
        record_size: u32,
        string_block_size: u32,
    }

    pub(crate) fn zeroed() -> Self {
        Self::new_zeroed()
    }

    pub(crate) fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let bytes = reader.take(std::mem::size_of::<Self>())?;
        Self::read_from_bytes(bytes).map_err(|e| eyre::eyre!("failed to parse header: {:?}", e))
    }

    pub(crate) fn refresh(&mut self, update: &HeaderUpdate<'_>, index_table: bool) {
        self.set_record_count(update.records.len() as u32);
        self.set_field_count(update.schema.stored_columns(index_table) as u32);
        self.set_record_size(update.record_size);
        self.set_string_block_size(0);
    }
}

/// Values a writer computes from the table before emitting the header.
#[derive(Debug, Clone, Copy)]
pub struct HeaderUpdate<'a> {
    pub schema: &'a Schema,
    /// Rows emitted as records, in write order.
    pub records: &'a [&'a Row],
    pub record_size: u32,
    pub min_id: u32,
    pub max_id: u32,
    pub copy_table_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVariant {
    Wdbc,
    Wdb2,
    Wdb5,
}

impl FormatVariant {
    pub fn signature(&self) -> &'static [u8; 4] {
        match self {
            FormatVariant::Wdbc => WDBC_SIGNATURE,
            FormatVariant::Wdb2 => WDB2_SIGNATURE,
            FormatVariant::Wdb5 => WDB5_SIGNATURE,
        }
    }

    /// Maps an on-disk signature to a variant, reversing byte order first if
    /// the leading byte is not `W`.
    pub fn from_signature(raw: [u8; 4]) -> Result<Self> {
        let mut normalized = raw;
        if normalized[0] != SIGNATURE_LEAD {
            normalized.reverse();
        }
        match &normalized {
            s if s == WDBC_SIGNATURE => Ok(FormatVariant::Wdbc),
            s if s == WDB2_SIGNATURE => Ok(FormatVariant::Wdb2),
            s if s == WDB5_SIGNATURE => Ok(FormatVariant::Wdb5),
            _ => bail!(CodecError::UnknownFormat { signature: raw }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    Wdbc(WdbcHeader),
    Wdb2(Wdb2Header),
    Wdb5(Wdb5Header),
}

impl Header {
    /// Empty header for a table that was not read from a file.
    pub fn new(variant: FormatVariant) -> Self {
        match variant {
            FormatVariant::Wdbc => Header::Wdbc(WdbcHeader::new()),
            FormatVariant::Wdb2 => Header::Wdb2(Wdb2Header::new(0)),
            FormatVariant::Wdb5 => Header::Wdb5(Wdb5Header::new(0)),
        }
    }

    /// Empty WDB5 header with the given layout flags.
    pub fn wdb5(flags: u16) -> Self {
        Header::Wdb5(Wdb5Header::new(flags))
    }

    /// Resolves the signature and parses the matching header. On success the
    /// reader sits on the first record.
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let available = reader.remaining().min(SIGNATURE_SIZE);
        let mut signature = [0u8; 4];
        signature[..available].copy_from_slice(reader.take(available)?);
        if available < SIGNATURE_SIZE {
            bail!(CodecError::UnknownFormat { signature });
        }

        let variant = FormatVariant::from_signature(signature)?;
        let header = match variant {
            FormatVariant::Wdbc => Header::Wdbc(WdbcHeader::parse(reader)?),
            FormatVariant::Wdb2 => Header::Wdb2(Wdb2Header::parse(reader)?),
            FormatVariant::Wdb5 => Header::Wdb5(Wdb5Header::parse(reader)?),
        };

        debug!(
            ?variant,
            record_count = header.record_count(),
            record_size = header.record_size(),
            string_block_size = header.string_block_size(),
            data_start = reader.position(),
            "resolved table header"
        );

        if !header.is_valid() {
            bail!(CodecError::InvalidFile {
                record_count: header.record_count(),
                record_size: header.record_size(),
            });
        }
        Ok(header)
    }

    pub fn variant(&self) -> FormatVariant {
        match self {
            Header::Wdbc(_) => FormatVariant::Wdbc,
            Header::Wdb2(_) => FormatVariant::Wdb2,
            Header::Wdb5(_) => FormatVariant::Wdb5,
        }
    }

    fn common(&self) -> &CommonFields {
        match self {
            Header::Wdbc(h) => &h.common,
            Header::Wdb2(h) => &h.common,
            Header::Wdb5(h) => &h.common,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.record_count() != 0 && self.record_size() != 0
    }

    pub fn record_count(&self) -> u32 {
        self.common().record_count()
    }

    pub fn field_count(&self) -> u32 {
        self.common().field_count()
    }

    pub fn record_size(&self) -> u32 {
        self.common().record_size()
    }

    /// Pool size, or the offset-table position when the offset table is on.
    pub fn string_block_size(&self) -> u32 {
        self.common().string_block_size()
    }

    pub fn has_offset_table(&self) -> bool {
        matches!(self, Header::Wdb5(h) if h.has_offset_table())
    }

    pub fn has_index_table(&self) -> bool {
        matches!(self, Header::Wdb5(h) if h.has_index_table())
    }

    pub fn has_second_index(&self) -> bool {
        matches!(self, Header::Wdb5(h) if h.has_second_index())
    }

    pub fn copy_table_size(&self) -> u32 {
        match self {
            Header::Wdb5(h) => h.fields.copy_table_size(),
            _ => 0,
        }
    }

    pub fn min_id(&self) -> u32 {
        match self {
            Header::Wdbc(_) => 0,
            Header::Wdb2(h) => h.fields.min_id(),
            Header::Wdb5(h) => h.fields.min_id(),
        }
    }

    pub fn max_id(&self) -> u32 {
        match self {
            Header::Wdbc(_) => 0,
            Header::Wdb2(h) => h.fields.max_id(),
            Header::Wdb5(h) => h.fields.max_id(),
        }
    }

    pub fn supports_copy_table(&self) -> bool {
        matches!(self, Header::Wdb5(_))
    }

    pub fn as_wdb5(&self) -> Option<&Wdb5Header> {
        match self {
            Header::Wdb5(h) => Some(h),
            _ => None,
        }
    }

    /// Recomputes counts, sizes and derived tables for a write.
    pub(crate) fn refresh(&mut self, update: &HeaderUpdate<'_>) -> Result<()> {
        match self {
            Header::Wdbc(h) => h.refresh(update),
            Header::Wdb2(h) => h.refresh(update)?,
            Header::Wdb5(h) => h.refresh(update)?,
        }
        Ok(())
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        match self {
            Header::Wdbc(h) => h.write(writer),
            Header::Wdb2(h) => h.write(writer),
            Header::Wdb5(h) => h.write(writer),
        }
    }

    /// Pads the record that started at `row_start`. Fixed layouts fill up to
    /// `record_size`; offset-table layouts only align the tail after the last
    /// record when no second index follows.
    pub fn write_record_padding(
        &self,
        writer: &mut ByteWriter,
        row_start: usize,
        is_last: bool,
    ) -> Result<()> {
        if self.has_offset_table() {
            if is_last && !self.has_second_index() {
                writer.pad_to_alignment(crate::config::RECORD_ALIGNMENT);
            }
            return Ok(());
        }

        let written = writer.position() - row_start;
        let record_size = self.record_size() as usize;
        ensure!(
            written <= record_size,
            "record at {} wrote {} bytes into a {}-byte record",
            row_start,
            written,
            record_size
        );
        writer.write_zeros(record_size - written);
        Ok(())
    }
}
