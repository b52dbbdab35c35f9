//! # String Pool
//!
//! Pool-backed layouts store each string column as a u32 byte offset into a
//! block of null-terminated strings that follows the records.
//!
//! ```text
//! offset:  0    1                 11            20
//!          +----+-----------------+-------------+
//!          | \0 | Stormwind\0     | Ironforge\0 |
//!          +----+-----------------+-------------+
//! ```
//!
//! ## Read Side
//!
//! [`StringPool::parse`] scans the block once. Every run that starts at
//! offset `o` becomes one entry keyed by `o`; offsets pointing into the
//! middle of a run have no entry. Offset 0 always resolves to the empty
//! string.
//!
//! ## Write Side
//!
//! [`StringPoolBuilder`] reserves a leading `\0` so that offset 0 is the
//! empty string, then appends strings in first-seen order. Equal strings
//! share one offset unless duplicates are allowed, in which case each
//! insertion is stored again. [`StringPoolBuilder::size`] is the exact
//! number of bytes the block will occupy, which the writer patches into the
//! header before appending the block.

use hashbrown::HashMap;

#[derive(Debug, Default, Clone)]
pub struct StringPool {
    entries: HashMap<u32, String>,
}

impl StringPool {
    pub fn parse(block: &[u8]) -> Self {
        let mut entries = HashMap::new();
        let mut pos = 0usize;
        while pos < block.len() {
            let end = block[pos..]
                .iter()
                .position(|&b| b == 0)
                .map_or(block.len(), |rel| pos + rel);
            let text = String::from_utf8_lossy(&block[pos..end]).into_owned();
            entries.insert(pos as u32, text);
            pos = end + 1;
        }
        Self { entries }
    }

    pub fn get(&self, offset: u32) -> Option<&str> {
        if offset == 0 {
            return Some("");
        }
        self.entries.get(&offset).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct StringPoolBuilder {
    bytes: Vec<u8>,
    offsets: HashMap<String, u32>,
    allow_duplicates: bool,
    stored: usize,
}

impl StringPoolBuilder {
    pub fn new(allow_duplicates: bool) -> Self {
        Self {
            bytes: vec![0],
            offsets: HashMap::new(),
            allow_duplicates,
            stored: 1,
        }
    }

    /// Stores `value` (or finds an earlier copy) and returns its offset.
    pub fn insert(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }
        if !self.allow_duplicates {
            if let Some(&offset) = self.offsets.get(value) {
                return offset;
            }
        }

        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        self.stored += 1;
        if !self.allow_duplicates {
            self.offsets.insert(value.to_owned(), offset);
        }
        offset
    }

    /// Total block size in bytes, the leading `\0` included.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Number of stored strings, counting the reserved empty entry.
    pub fn stored(&self) -> usize {
        self.stored
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keys_each_run_by_its_start() {
        let pool = StringPool::parse(b"\0Stormwind\0Ironforge\0");

        assert_eq!(pool.get(0), Some(""));
        assert_eq!(pool.get(1), Some("Stormwind"));
        assert_eq!(pool.get(11), Some("Ironforge"));
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn offsets_inside_a_run_are_missing() {
        let pool = StringPool::parse(b"\0Stormwind\0");
        assert_eq!(pool.get(6), None);
        assert_eq!(pool.get(400), None);
    }

    #[test]
    fn empty_block_still_resolves_offset_zero() {
        let pool = StringPool::parse(&[]);
        assert!(pool.is_empty());
        assert_eq!(pool.get(0), Some(""));
    }

    #[test]
    fn unterminated_tail_is_kept() {
        let pool = StringPool::parse(b"\0Undercity");
        assert_eq!(pool.get(1), Some("Undercity"));
    }

    #[test]
    fn builder_reserves_empty_string_at_zero() {
        let mut builder = StringPoolBuilder::new(false);
        assert_eq!(builder.insert(""), 0);
        assert_eq!(builder.size(), 1);
        assert_eq!(builder.as_bytes(), b"\0");
    }

    #[test]
    fn builder_deduplicates_by_value() {
        let mut builder = StringPoolBuilder::new(false);
        let first = builder.insert("Stormwind");
        let second = builder.insert("Stormwind");

        assert_eq!(first, 1);
        assert_eq!(second, first);
        assert_eq!(builder.size(), 1 + "Stormwind".len() + 1);
        assert_eq!(builder.stored(), 2);
    }

    #[test]
    fn builder_with_duplicates_stores_every_insertion() {
        let mut builder = StringPoolBuilder::new(true);
        let first = builder.insert("Stormwind");
        let second = builder.insert("Stormwind");

        assert_eq!(first, 1);
        assert_eq!(second, 11);
        assert_eq!(builder.size(), 21);
    }

    #[test]
    fn built_block_parses_back_to_same_offsets() {
        let mut builder = StringPoolBuilder::new(false);
        let names = ["Darnassus", "Exodar", "Silvermoon", "Exodar"];
        let offsets: Vec<u32> = names.iter().map(|n| builder.insert(n)).collect();

        let pool = StringPool::parse(builder.as_bytes());
        for (name, offset) in names.iter().zip(offsets) {
            assert_eq!(pool.get(offset), Some(*name));
        }
    }
}
