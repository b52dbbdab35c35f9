//! # Record Layout Planner
//!
//! Turns a parsed header and the raw buffer into the byte ranges a decoder
//! needs: where records start, how each record is addressed, and where the
//! string block and the WDB5 trailing tables live.
//!
//! ## Fixed Layouts
//!
//! WDBC, WDB2 and WDB5 without an offset table store `record_count` records
//! of `record_size` bytes back to back from `data_start`.
//!
//! ```text
//! WDBC / WDB2:  header | records | string block (rest of the buffer)
//! WDB5:         header | records | string block | index table | copy table
//! ```
//!
//! The WDBC and WDB2 string block is everything after the records;
//! `string_block_size` is only compared against it.
//!
//! WDB5 trailing tables are located from the end of the buffer backwards:
//! the copy table is the last `copy_table_size` bytes, the index table
//! (`record_count * 4` bytes) sits before it, and the string block before
//! that.
//!
//! ## Offset-Table Layout
//!
//! With the offset-table flag each record is addressed by a span taken from
//! the offset table, strings are stored inline, and there is no string
//! block. The decoder runs `max(spans, record_count)` iterations; rows past
//! the span array are read sequentially with `record_size` as their width.

use std::ops::Range;

use eyre::{bail, Result};
use tracing::{debug, warn};

use crate::config::INDEX_ENTRY_SIZE;
use crate::error::CodecError;
use crate::header::{FormatVariant, Header};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    pub data_start: usize,
    pub record_size: usize,
    pub record_count: usize,
    /// Absolute byte range of each record, offset-table layouts only.
    pub spans: Vec<Range<usize>>,
    pub string_block: Option<Range<usize>>,
    pub index_table: Option<Range<usize>>,
    pub copy_table: Option<Range<usize>>,
    pub inline_strings: bool,
}

impl RecordLayout {
    /// Plans the layout for `data`, whose header has already been parsed and
    /// ends at `data_start`.
    pub fn plan(header: &Header, data: &[u8], data_start: usize) -> Result<Self> {
        let record_size = header.record_size() as usize;
        let record_count = header.record_count() as usize;

        let mut layout = Self {
            data_start,
            record_size,
            record_count,
            spans: Vec::new(),
            string_block: None,
            index_table: None,
            copy_table: None,
            inline_strings: header.has_offset_table(),
        };

        match header.variant() {
            FormatVariant::Wdbc | FormatVariant::Wdb2 => {
                let records_end = layout.fixed_records_end(data.len())?;
                let pool_len = data.len() - records_end;
                if pool_len != header.string_block_size() as usize {
                    warn!(
                        declared = header.string_block_size(),
                        actual = pool_len,
                        "string block size differs from bytes after records"
                    );
                }
                layout.string_block = Some(records_end..data.len());
            }
            FormatVariant::Wdb5 => layout.plan_wdb5(header, data)?,
        }

        debug!(
            data_start,
            record_size,
            record_count,
            spans = layout.spans.len(),
            inline_strings = layout.inline_strings,
            string_block = ?layout.string_block,
            index_table = ?layout.index_table,
            copy_table = ?layout.copy_table,
            "planned record layout"
        );
        Ok(layout)
    }

    fn plan_wdb5(&mut self, header: &Header, data: &[u8]) -> Result<()> {
        let mut end = data.len();

        let copy_len = header.copy_table_size() as usize;
        if copy_len > 0 {
            let start = take_back(end, copy_len)?;
            self.copy_table = Some(start..end);
            end = start;
        }

        if header.has_index_table() {
            let start = take_back(end, self.record_count * INDEX_ENTRY_SIZE)?;
            self.index_table = Some(start..end);
            end = start;
        }

        if let Some(wdb5) = header.as_wdb5().filter(|h| h.has_offset_table()) {
            for entry in wdb5.read_offset_table(data)? {
                let (offset, len) = (entry.offset() as usize, entry.length() as usize);
                self.spans.push(checked_range(offset, len, data.len())?);
            }
            if self.spans.len() != self.record_count {
                warn!(
                    spans = self.spans.len(),
                    record_count = self.record_count,
                    "offset table and record count disagree"
                );
            }
            return Ok(());
        }

        let pool_len = header.string_block_size() as usize;
        let pool_start = take_back(end, pool_len)?;
        self.string_block = Some(pool_start..end);

        let records_end = self.fixed_records_end(pool_start)?;
        if records_end < pool_start {
            debug!(
                gap = pool_start - records_end,
                "unclaimed bytes between records and string block"
            );
        }
        Ok(())
    }

    /// End of the fixed record area, checked against `limit`.
    fn fixed_records_end(&self, limit: usize) -> Result<usize> {
        let len = self
            .record_count
            .checked_mul(self.record_size)
            .ok_or_else(|| eyre::eyre!("record area size overflows usize"))?;
        Ok(checked_range(self.data_start, len, limit)?.end)
    }

    /// Number of decode iterations.
    pub fn iterations(&self) -> usize {
        self.spans.len().max(self.record_count)
    }

    pub fn has_index_table(&self) -> bool {
        self.index_table.is_some()
    }
}

fn checked_range(start: usize, len: usize, limit: usize) -> Result<Range<usize>> {
    match start.checked_add(len) {
        Some(end) if end <= limit => Ok(start..end),
        _ => bail!(CodecError::Truncated {
            offset: start,
            needed: len,
            available: limit.saturating_sub(start),
        }),
    }
}

fn take_back(end: usize, len: usize) -> Result<usize> {
    match end.checked_sub(len) {
        Some(start) => Ok(start),
        None => bail!(CodecError::Truncated {
            offset: 0,
            needed: len,
            available: end,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ByteReader;

    fn wdbc(records: &[u8], record_count: u32, record_size: u32, pool: &[u8]) -> Vec<u8> {
        let mut bytes = b"WDBC".to_vec();
        for field in [record_count, 1, record_size, pool.len() as u32] {
            bytes.extend_from_slice(&field.to_le_bytes());
        }
        bytes.extend_from_slice(records);
        bytes.extend_from_slice(pool);
        bytes
    }

    fn plan(bytes: &[u8]) -> Result<RecordLayout> {
        let mut reader = ByteReader::new(bytes);
        let header = Header::parse(&mut reader)?;
        RecordLayout::plan(&header, bytes, reader.position())
    }

    #[test]
    fn fixed_layout_places_pool_after_records() {
        let bytes = wdbc(&[1, 0, 0, 0, 2, 0, 0, 0], 2, 4, b"\0abc\0");
        let layout = plan(&bytes).unwrap();

        assert_eq!(layout.data_start, 20);
        assert_eq!(layout.string_block, Some(28..33));
        assert!(!layout.inline_strings);
        assert_eq!(layout.iterations(), 2);
    }

    #[test]
    fn records_past_end_are_truncated() {
        let bytes = wdbc(&[1, 0, 0, 0], 2, 4, b"");
        let err = plan(&bytes).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CodecError>(),
            Some(CodecError::Truncated { .. })
        ));
    }

    #[test]
    fn legacy_pool_runs_to_end_whatever_the_declared_size() {
        for declared in [0u32, 2, 40] {
            let mut bytes = wdbc(&[1, 0, 0, 0], 1, 4, b"\0abc\0");
            bytes[16..20].copy_from_slice(&declared.to_le_bytes());

            let layout = plan(&bytes).unwrap();
            assert_eq!(layout.string_block, Some(24..29));
        }
    }
}
