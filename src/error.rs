//! # Codec Errors
//!
//! Every fallible function in the crate returns `eyre::Result`. Conditions a
//! caller may want to branch on are raised as [`CodecError`] through
//! `eyre::bail!`, so they can be recovered with
//! `report.downcast_ref::<CodecError>()`.
//!
//! | Variant | Raised by | Fatal |
//! |---------|-----------|-------|
//! | `UnknownFormat` | header resolver | yes |
//! | `InvalidFile` | header resolver, orchestrator | yes |
//! | `MissingSchema` | orchestrator | yes |
//! | `SchemaOverflow` | row decoder | yes |
//! | `Truncated` | byte cursor, layout planner | yes |
//! | `UnsupportedType` | row encoder | yes |
//! | `InvalidRow` | row encoder | yes |
//! | `UnresolvedString` | orchestrator in strict mode | yes |
//!
//! Missing string-pool entries are not errors by default: the decoder
//! produces a [`StringResolutionWarning`] and keeps going.

use crate::records::ColumnType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    UnknownFormat {
        signature: [u8; 4],
    },
    InvalidFile {
        record_count: u32,
        record_size: u32,
    },
    MissingSchema {
        row_type: String,
    },
    SchemaOverflow {
        row: usize,
        consumed: usize,
        expected: usize,
    },
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    UnsupportedType {
        column: String,
        ty: ColumnType,
    },
    InvalidRow {
        row: usize,
        reason: String,
    },
    UnresolvedString(StringResolutionWarning),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::UnknownFormat { signature } => {
                write!(f, "unknown table format signature {:02X?}", signature)
            }
            CodecError::InvalidFile {
                record_count,
                record_size,
            } => write!(
                f,
                "invalid file: record count {} and record size {} must both be nonzero",
                record_count, record_size
            ),
            CodecError::MissingSchema { row_type } => {
                write!(f, "no schema registered for row type '{}'", row_type)
            }
            CodecError::SchemaOverflow {
                row,
                consumed,
                expected,
            } => write!(
                f,
                "definition exceeds record size: row {} consumed {} bytes but the record holds {}",
                row, consumed, expected
            ),
            CodecError::Truncated {
                offset,
                needed,
                available,
            } => write!(
                f,
                "unexpected end of data at offset {}: needed {} bytes, {} available",
                offset, needed, available
            ),
            CodecError::UnsupportedType { column, ty } => {
                write!(f, "column '{}' has unsupported type {:?}", column, ty)
            }
            CodecError::InvalidRow { row, reason } => write!(f, "row {}: {}", row, reason),
            CodecError::UnresolvedString(warning) => write!(f, "{}", warning),
        }
    }
}

impl std::error::Error for CodecError {}

/// A string column referenced a pool offset with no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringResolutionWarning {
    pub row: usize,
    pub column: usize,
    pub offset: u32,
}

impl std::fmt::Display for StringResolutionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} column {}: no string at pool offset {}",
            self.row, self.column, self.offset
        )
    }
}
