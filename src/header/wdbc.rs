//! # WDBC Header
//!
//! The first generation: a signature followed by four u32 fields. Records
//! are fixed width and strings live in a pool after the records.
//!
//! ```text
//! +-----------+--------------+-------------+-------------+-------------------+
//! | "WDBC"    | record_count | field_count | record_size | string_block_size |
//! +-----------+--------------+-------------+-------------+-------------------+
//! ```

use eyre::Result;
use zerocopy::IntoBytes;

use super::{CommonFields, HeaderUpdate};
use crate::config::{WDBC_HEADER_SIZE, WDBC_SIGNATURE};
use crate::encoding::{ByteReader, ByteWriter};

const _: () = assert!(std::mem::size_of::<CommonFields>() + 4 == WDBC_HEADER_SIZE);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WdbcHeader {
    pub(crate) common: CommonFields,
}

impl WdbcHeader {
    pub fn new() -> Self {
        Self {
            common: CommonFields::zeroed(),
        }
    }

    pub(crate) fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        let common = CommonFields::parse(reader)?;
        Ok(Self { common })
    }

    pub(crate) fn refresh(&mut self, update: &HeaderUpdate<'_>) {
        self.common.refresh(update, false);
    }

    pub(crate) fn write(&self, writer: &mut ByteWriter) {
        writer.write_bytes(WDBC_SIGNATURE);
        writer.write_bytes(self.common.as_bytes());
    }
}

impl Default for WdbcHeader {
    fn default() -> Self {
        Self::new()
    }
}
