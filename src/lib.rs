//! # clientdb - Client Database Table Codec
//!
//! clientdb reads and writes the binary table files a game client ships its
//! static data in. A file is a header, a block of fixed- or variable-width
//! records, and a few trailing tables. Column types are not stored in the
//! file; the caller supplies them as a schema.
//!
//! - **Three header generations**: WDBC, WDB2 and WDB5, including byte-reversed
//!   signatures
//! - **Schema-driven decoding**: packed integers, pooled or inline strings,
//!   auto-generated columns
//! - **Faithful writing**: string pool dedup, offset tables, index tables and
//!   copy tables are regenerated from the rows
//!
//! ## Quick Start
//!
//! ```ignore
//! use clientdb::codec::{read_file, write_file, ReadOptions, WriteOptions};
//! use clientdb::records::{ColumnDef, ColumnType, Schema, SchemaRegistry};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(
//!     "AreaTable",
//!     Schema::new(vec![
//!         ColumnDef::new("id", ColumnType::U32),
//!         ColumnDef::new("name", ColumnType::String),
//!     ]),
//! );
//!
//! let outcome = read_file("AreaTable.dbc", &registry, "AreaTable", &ReadOptions::new())?;
//! for warning in &outcome.warnings {
//!     eprintln!("{warning}");
//! }
//! write_file("AreaTable.out.dbc", &outcome.table, &WriteOptions::new())?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   codec (read_table / write_table)   │
//! ├──────────────────┬──────────────────┤
//! │  header variants │  record layout   │
//! ├──────────────────┴──────────────────┤
//! │  row decoder / encoder, string pool  │
//! ├─────────────────────────────────────┤
//! │  encoding (byte cursor, bit fields)  │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Errors and Logging
//!
//! Every fallible call returns `eyre::Result`. Conditions a caller may want
//! to match on are [`error::CodecError`] values, reachable with
//! `report.downcast_ref::<CodecError>()`. Progress is reported through
//! `tracing`; the library never installs a subscriber.
//!
//! ## Module Overview
//!
//! - [`codec`]: read/write entry points and options
//! - [`header`]: header variants and signature resolution
//! - [`records`]: schemas, values, rows, layout, row codecs
//! - [`encoding`]: little-endian cursor and bit-field codec
//! - [`config`]: format constants
//! - [`error`]: typed codec errors and warnings

#[macro_use]
mod macros;

pub mod codec;
pub mod config;
pub mod encoding;
pub mod error;
pub mod header;
pub mod records;

pub use codec::{
    read_file, read_table, write_file, write_table, ReadOptions, ReadOutcome, WriteOptions,
};
pub use error::{CodecError, StringResolutionWarning};
pub use header::{FormatVariant, Header};
pub use records::{
    ColumnDef, ColumnType, Row, Schema, SchemaProvider, SchemaRegistry, Table, Value,
};
