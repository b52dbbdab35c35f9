//! # Byte Cursors
//!
//! `ByteReader` and `ByteWriter` move little-endian fixed-width primitives in
//! and out of one in-memory buffer. Every table read and write goes through
//! exactly one cursor; nothing here touches the filesystem.
//!
//! ## Reader
//!
//! - Borrows the input slice, never copies it
//! - Running past the end is `CodecError::Truncated`, never a panic
//! - `seek` accepts any position up to and including the buffer length
//!
//! ## Writer
//!
//! - Appends to an owned `Vec<u8>`
//! - `patch_u32` overwrites a previously written field, used to back-patch
//!   sizes and table positions into the header once they are known
//! - `pad_to_alignment` zero-fills up to the next multiple of an alignment

use eyre::{bail, Result};

use crate::error::CodecError;

#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            bail!(CodecError::Truncated {
                offset: pos,
                needed: 0,
                available: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            bail!(CodecError::Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.take_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.take_array().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.take_array().map(u64::from_le_bytes)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.take_array().map(f32::from_le_bytes)
    }

    /// Reads `width` bytes (at most 8) as a little-endian unsigned integer.
    pub fn read_uint(&mut self, width: usize) -> Result<u64> {
        debug_assert!(width <= 8);
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(self.take(width)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads a null-terminated string and consumes the terminator. A missing
    /// terminator consumes the rest of the buffer.
    pub fn read_cstr(&mut self) -> Result<String> {
        let rest = &self.data[self.pos..];
        let (bytes, consumed) = match rest.iter().position(|&b| b == 0) {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_le_bytes());
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Writes the low `width` bytes (at most 8) of `value`, little-endian.
    pub fn write_uint(&mut self, value: u64, width: usize) {
        debug_assert!(width <= 8);
        self.write_bytes(&value.to_le_bytes()[..width]);
    }

    pub fn write_cstr(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
        self.write_u8(0);
    }

    pub fn write_zeros(&mut self, len: usize) {
        self.buf.resize(self.buf.len() + len, 0);
    }

    pub fn pad_to_alignment(&mut self, alignment: usize) {
        let rem = self.buf.len() % alignment;
        if rem != 0 {
            self.write_zeros(alignment - rem);
        }
    }

    pub fn patch_u32(&mut self, at: usize, value: u32) -> Result<()> {
        if at + 4 > self.buf.len() {
            bail!(CodecError::Truncated {
                offset: at,
                needed: 4,
                available: self.buf.len().saturating_sub(at),
            });
        }
        self.buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_decodes_little_endian_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x0302);
        assert_eq!(reader.read_u32().unwrap(), 0x0706_0504);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn reader_reports_truncation_instead_of_panicking() {
        let data = [0xAA, 0xBB];
        let mut reader = ByteReader::new(&data);

        let err = reader.read_u32().unwrap_err();
        assert_eq!(
            err.downcast_ref::<CodecError>(),
            Some(&CodecError::Truncated {
                offset: 0,
                needed: 4,
                available: 2
            })
        );
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn read_uint_zero_extends_narrow_fields() {
        let data = [0xFF, 0xFF, 0xFF];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_uint(3).unwrap(), 0x00FF_FFFF);
    }

    #[test]
    fn read_cstr_consumes_terminator() {
        let data = b"Orgrimmar\0Thunder Bluff\0";
        let mut reader = ByteReader::new(data);

        assert_eq!(reader.read_cstr().unwrap(), "Orgrimmar");
        assert_eq!(reader.position(), 10);
        assert_eq!(reader.read_cstr().unwrap(), "Thunder Bluff");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn read_cstr_without_terminator_takes_rest() {
        let mut reader = ByteReader::new(b"Darnassus");
        assert_eq!(reader.read_cstr().unwrap(), "Darnassus");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn seek_past_end_is_rejected() {
        let data = [0u8; 4];
        let mut reader = ByteReader::new(&data);
        assert!(reader.seek(4).is_ok());
        assert!(reader.seek(5).is_err());
    }

    #[test]
    fn writer_patches_and_aligns() {
        let mut writer = ByteWriter::new();
        writer.write_u32(0);
        writer.write_u8(7);
        writer.pad_to_alignment(4);
        writer.patch_u32(0, 0xDEAD_BEEF).unwrap();

        assert_eq!(
            writer.as_slice(),
            &[0xEF, 0xBE, 0xAD, 0xDE, 0x07, 0x00, 0x00, 0x00]
        );
        assert!(writer.patch_u32(6, 1).is_err());
    }

    #[test]
    fn write_uint_emits_low_bytes_only() {
        let mut writer = ByteWriter::new();
        writer.write_uint(0x0011_2233, 3);
        assert_eq!(writer.as_slice(), &[0x33, 0x22, 0x11]);
    }
}
