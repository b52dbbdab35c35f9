//! # Read and Write Options
//!
//! Both option types use the builder pattern: start from `new()` (or
//! `Default`) and chain setters.
//!
//! ```ignore
//! let bytes = write_table(&table, &WriteOptions::new().allow_duplicate_strings(true))?;
//! let outcome = read_table(&bytes, &registry, "Map", &ReadOptions::new().strict_strings(true))?;
//! ```
//!
//! ## Write Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | allow_duplicate_strings | false | store every string occurrence instead of one per value |
//! | copy_table | source header | collapse duplicate rows into copy-table entries |
//!
//! `copy_table` only has an effect for WDB5 tables with a fixed layout.
//! Left unset, it is on exactly when the table was read from a file that
//! carried a copy table.
//!
//! ## Read Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | strict_strings | false | fail on the first unresolved string reference |

use crate::header::Header;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    allow_duplicate_strings: bool,
    copy_table: Option<bool>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_duplicate_strings(mut self, allow: bool) -> Self {
        self.allow_duplicate_strings = allow;
        self
    }

    pub fn copy_table(mut self, enabled: bool) -> Self {
        self.copy_table = Some(enabled);
        self
    }

    pub fn allows_duplicate_strings(&self) -> bool {
        self.allow_duplicate_strings
    }

    /// Whether duplicate rows are collapsed for a table with `header`.
    pub fn uses_copy_table(&self, header: &Header) -> bool {
        if !header.supports_copy_table() || header.has_offset_table() {
            return false;
        }
        self.copy_table
            .unwrap_or_else(|| header.copy_table_size() > 0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    strict_strings: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_strings(mut self, strict: bool) -> Self {
        self.strict_strings = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict_strings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WDB5_FLAG_OFFSET_TABLE;
    use crate::header::FormatVariant;

    #[test]
    fn copy_table_defaults_to_source_header() {
        let mut header = Header::wdb5(0);
        assert!(!WriteOptions::new().uses_copy_table(&header));

        if let Header::Wdb5(h) = &mut header {
            h.fields.set_copy_table_size(16);
        }
        assert!(WriteOptions::new().uses_copy_table(&header));
        assert!(!WriteOptions::new().copy_table(false).uses_copy_table(&header));
    }

    #[test]
    fn copy_table_needs_fixed_wdb5_layout() {
        let enabled = WriteOptions::new().copy_table(true);

        assert!(!enabled.uses_copy_table(&Header::new(FormatVariant::Wdbc)));
        assert!(!enabled.uses_copy_table(&Header::new(FormatVariant::Wdb2)));
        assert!(!enabled.uses_copy_table(&Header::wdb5(WDB5_FLAG_OFFSET_TABLE)));
        assert!(enabled.uses_copy_table(&Header::wdb5(0)));
    }

    #[test]
    fn read_options_default_to_lenient() {
        assert!(!ReadOptions::default().is_strict());
        assert!(ReadOptions::new().strict_strings(true).is_strict());
    }
}
