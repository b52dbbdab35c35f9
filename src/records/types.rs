//! # Column Types and Column Definitions
//!
//! A column's semantic type is a closed enum; the row codecs dispatch on it
//! directly instead of on any reflected native type.
//!
//! ## Stored Widths
//!
//! | Type | Native bits | Bytes (unpacked) |
//! |------|-------------|------------------|
//! | Bool | - | 1 |
//! | I8 / U8 | 8 | 1 |
//! | I16 / U16 | 16 | 2 |
//! | I32 / U32 | 32 | 4 |
//! | I64 / U64 | 64 | 8 |
//! | F32 | - | 4 |
//! | String | - | 4 (pool offset) or inline bytes + `\0` |
//! | Unknown | - | 4 (skipped on read, rejected on write) |
//!
//! Integer columns may declare a bit width below their native width; the
//! stored width then shrinks to `ceil(bits / 8)` bytes.

use eyre::{bail, ensure, Result};

use crate::config::{STRING_REF_WIDTH, UNKNOWN_COLUMN_WIDTH};
use crate::encoding::BitField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
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
    /// A definition type the codec cannot interpret, carried by its raw tag.
    Unknown(u8),
}

impl ColumnType {
    pub fn native_bits(&self) -> Option<u8> {
        match self {
            ColumnType::I8 | ColumnType::U8 => Some(8),
            ColumnType::I16 | ColumnType::U16 => Some(16),
            ColumnType::I32 | ColumnType::U32 => Some(32),
            ColumnType::I64 | ColumnType::U64 => Some(64),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.native_bits().is_some()
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            ColumnType::I8 | ColumnType::I16 | ColumnType::I32 | ColumnType::I64
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: ColumnType,
    bit_width: Option<u8>,
    auto_generated: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            bit_width: None,
            auto_generated: false,
        }
    }

    /// Declares a packed storage width. Only integer columns can be packed
    /// and the width must lie in `1..=native`.
    pub fn with_bits(mut self, bits: u8) -> Result<Self> {
        let Some(native) = self.ty.native_bits() else {
            bail!(
                "column '{}' of type {:?} cannot be bit-packed",
                self.name,
                self.ty
            );
        };
        ensure!(
            bits > 0 && bits <= native,
            "column '{}': bit width {} outside 1..={}",
            self.name,
            bits,
            native
        );
        self.bit_width = Some(bits);
        Ok(self)
    }

    /// Marks the column as synthesized from the 1-based row ordinal. Such a
    /// column never touches the byte stream.
    pub fn auto_generated(mut self) -> Self {
        self.auto_generated = true;
        self
    }

    pub fn bit_width(&self) -> Option<u8> {
        self.bit_width
    }

    pub fn is_auto_generated(&self) -> bool {
        self.auto_generated
    }

    pub fn bit_field(&self) -> Option<BitField> {
        self.ty
            .native_bits()
            .map(|native| BitField::new(self.bit_width, native))
    }

    /// Bytes this column occupies in a record, or `None` for inline strings
    /// whose width depends on the value.
    pub fn stored_width(&self, inline_strings: bool) -> Option<usize> {
        if self.auto_generated {
            return Some(0);
        }
        match self.ty {
            ColumnType::Bool => Some(1),
            ColumnType::F32 => Some(4),
            ColumnType::String if inline_strings => None,
            ColumnType::String => Some(STRING_REF_WIDTH),
            ColumnType::Unknown(_) => Some(UNKNOWN_COLUMN_WIDTH),
            _ => self.bit_field().map(|field| field.byte_len()),
        }
    }
}
