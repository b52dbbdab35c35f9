//! # Encoding Module
//!
//! Low-level byte handling shared by the header parsers and the row codecs:
//!
//! - **Cursors**: little-endian fixed-width reads and writes over one buffer
//! - **Bit fields**: sign extension and masking for bit-packed integers

pub mod bits;
pub mod cursor;

pub use bits::BitField;
pub use cursor::{ByteReader, ByteWriter};
