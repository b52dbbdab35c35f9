//! # Typed Rows Over Client Table Records
//!
//! This module turns the record area of a client database file into typed
//! rows and back. Nothing about a column is stored in the file itself: the
//! caller supplies a [`Schema`] (usually through a [`SchemaProvider`]) and
//! the schema alone decides how many bytes each column occupies and how they
//! are interpreted.
//!
//! ## Record Layouts
//!
//! ```text
//! fixed:         | rec 0 (record_size) | rec 1 (record_size) | ... | string block |
//! offset table:  | rec 0 (len 0) | rec 1 (len 1) | ... | pad | offset table |
//! ```
//!
//! | Layout | Record width | Strings |
//! |--------|--------------|---------|
//! | fixed | `record_size`, short rows padded | u32 offset into the string block |
//! | offset table | per record, from the offset table | inline, null-terminated |
//!
//! ## Column Storage
//!
//! | Type | Stored as |
//! |------|-----------|
//! | integers | little-endian, `ceil(bits / 8)` bytes when packed |
//! | `Bool` | 1 byte |
//! | `F32` | 4 bytes |
//! | `String` | see layout table |
//! | `Unknown` | 4 bytes, read as `Null`, never written |
//!
//! ## Module Structure
//!
//! - `types`: `ColumnType` and `ColumnDef`
//! - `schema`: `Schema`, `SchemaProvider` and the in-memory registry
//! - `value`: the `Value` cell type
//! - `table`: `Row` and `Table`
//! - `string_pool`: string block reader and builder
//! - `layout`: byte ranges of records and trailing tables
//! - `decoder`: records to rows
//! - `encoder`: rows to records

pub mod decoder;
pub mod encoder;
pub mod layout;
pub mod schema;
pub mod string_pool;
pub mod table;
pub mod types;
pub mod value;

pub use decoder::RowDecoder;
pub use encoder::{OffsetMap, RowEncoder};
pub use layout::RecordLayout;
pub use schema::{Schema, SchemaProvider, SchemaRegistry};
pub use string_pool::{StringPool, StringPoolBuilder};
pub use table::{Row, Table};
pub use types::{ColumnDef, ColumnType};
pub use value::Value;

#[cfg(test)]
mod tests;
