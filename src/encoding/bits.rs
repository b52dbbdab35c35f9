//! # Bit-Packed Integers
//!
//! Integer columns may be stored in fewer bits than their native width. A
//! packed column with `b` bits occupies `ceil(b / 8)` bytes on disk; the
//! bytes are read little-endian into a 64-bit scratch value and then:
//!
//! | Direction | Signed column | Unsigned column |
//! |-----------|---------------|-----------------|
//! | decode | sign-extend from bit `b - 1` | mask to low `b` bits |
//! | encode | mask to low `b` bits | mask to low `b` bits |
//!
//! Sign extension is the classic shift pair: shift left so bit `b - 1` lands
//! in the sign position, then arithmetic-shift right by the same amount.
//! Doing it in 64 bits and narrowing afterwards gives the same result as
//! shifting by `n - b` in the native `n`-bit type.
//!
//! Encoding never rejects a value: anything outside the `b`-bit range is
//! truncated. Range checks belong to whoever produced the value.
//!
//! ## Unpacked Columns
//!
//! When no width is declared, or the declared width equals the native width,
//! `BitField` is a pass-through: decode only sign-extends from the native
//! width so that narrowing back to the native type is lossless.

/// Storage width of one integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    bits: u8,
    native: u8,
}

impl BitField {
    /// `bits` is clamped to `1..=native`; `None` means unpacked.
    pub fn new(bits: Option<u8>, native: u8) -> Self {
        debug_assert!(native > 0 && native <= 64);
        let bits = bits.map_or(native, |b| b.clamp(1, native));
        Self { bits, native }
    }

    pub fn unpacked(native: u8) -> Self {
        Self::new(None, native)
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn native(&self) -> u8 {
        self.native
    }

    pub fn is_packed(&self) -> bool {
        self.bits < self.native
    }

    pub fn byte_len(&self) -> usize {
        usize::from(self.bits).div_ceil(8)
    }

    #[inline]
    pub fn decode_unsigned(&self, raw: u64) -> u64 {
        raw & self.mask()
    }

    #[inline]
    pub fn decode_signed(&self, raw: u64) -> i64 {
        let shift = 64 - u32::from(self.bits);
        ((raw << shift) as i64) >> shift
    }

    #[inline]
    pub fn encode(&self, value: u64) -> u64 {
        value & self.mask()
    }

    fn mask(&self) -> u64 {
        if self.bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }
}
