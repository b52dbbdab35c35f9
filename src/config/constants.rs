//! # Format Constants
//!
//! Numeric and byte-level constants shared by the header parsers, the layout
//! planner and the row codecs. Values that depend on each other live next to
//! each other and are checked at compile time.
//!
//! ## Dependency Graph
//!
//! ```text
//! COMMON_HEADER_SIZE (20 bytes: signature + 4 x u32)
//!       │
//!       ├─> WDBC_HEADER_SIZE (== COMMON_HEADER_SIZE)
//!       │
//!       ├─> WDB2_HEADER_SIZE (COMMON + 7 x u32 = 48)
//!       │     └─> WDB2_SPARSE_BUILD (builds above this carry sparse tables)
//!       │
//!       └─> WDB5_HEADER_SIZE (COMMON + 6 x u32 + 2 x u16 = 48)
//!             ├─> FIELD_ENTRY_SIZE (4 bytes per field-structure entry)
//!             └─> OFFSET_ENTRY_SIZE (6 bytes per offset-table entry)
//!
//! RECORD_ALIGNMENT (4)
//!       └─> tail padding after the last variable-width record
//! ```

/// Leading byte of every signature once normalized to on-disk order.
pub const SIGNATURE_LEAD: u8 = b'W';

pub const WDBC_SIGNATURE: &[u8; 4] = b"WDBC";
pub const WDB2_SIGNATURE: &[u8; 4] = b"WDB2";
pub const WDB5_SIGNATURE: &[u8; 4] = b"WDB5";

pub const SIGNATURE_SIZE: usize = 4;

pub const COMMON_HEADER_SIZE: usize = SIGNATURE_SIZE + 4 * 4;
pub const WDBC_HEADER_SIZE: usize = COMMON_HEADER_SIZE;
pub const WDB2_HEADER_SIZE: usize = COMMON_HEADER_SIZE + 7 * 4;
pub const WDB5_HEADER_SIZE: usize = COMMON_HEADER_SIZE + 6 * 4 + 2 * 2;

const _: () = assert!(WDBC_HEADER_SIZE == 20);
const _: () = assert!(WDB2_HEADER_SIZE == 48);
const _: () = assert!(WDB5_HEADER_SIZE == 48);

/// WDB2 files from builds newer than this carry a sparse index array and a
/// string-length array after the fixed header whenever `max_id != 0`.
pub const WDB2_SPARSE_BUILD: u32 = 12880;

pub const FIELD_ENTRY_SIZE: usize = 4;
pub const OFFSET_ENTRY_SIZE: usize = 6;
pub const INDEX_ENTRY_SIZE: usize = 4;
pub const COPY_ENTRY_SIZE: usize = 8;

pub const WDB5_FLAG_OFFSET_TABLE: u16 = 0x01;
pub const WDB5_FLAG_SECOND_INDEX: u16 = 0x02;
pub const WDB5_FLAG_INDEX_TABLE: u16 = 0x04;

/// Variable-width records end on this boundary when no second index follows.
pub const RECORD_ALIGNMENT: usize = 4;

/// Stored byte width of a non-string column whose type the codec does not know.
pub const UNKNOWN_COLUMN_WIDTH: usize = 4;

/// Stored byte width of a string column in pool-backed layouts.
pub const STRING_REF_WIDTH: usize = 4;

/// Substituted for string references that point at no pool entry.
pub const UNRESOLVED_STRING: &str = "<unresolved string>";
