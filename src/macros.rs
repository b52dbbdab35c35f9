//! # Internal Macros
//!
//! ## le_accessors!
//!
//! Header structs store every multi-byte field as a zerocopy little-endian
//! wrapper (`U16`, `U32`, `I16`). This macro generates the native getter and
//! the `set_` counterpart for each listed field so header code reads like
//! plain integer access.
//!
//! ```ignore
//! impl CommonFields {
//!     le_accessors! {
//!         record_count: u32,
//!         record_size: u32,
//!     }
//! }
//!
//! // Generates:
//! // pub fn record_count(&self) -> u32 { self.record_count.get() }
//! // pub fn set_record_count(&mut self, val: u32) { self.record_count = U32::new(val); }
//! ```

/// Generates getter and setter methods for little-endian header fields.
#[macro_export]
macro_rules! le_accessors {
    (@impl $field:ident, $native:ty, $wrapper:ident) => {
        ::paste::paste! {
            #[inline]
            pub fn $field(&self) -> $native {
                self.$field.get()
            }

            #[inline]
            pub fn [<set_ $field>](&mut self, val: $native) {
                self.$field = ::zerocopy::little_endian::$wrapper::new(val);
            }
        }
    };
    (@field $field:ident, u16) => {
        $crate::le_accessors!(@impl $field, u16, U16);
    };
    (@field $field:ident, u32) => {
        $crate::le_accessors!(@impl $field, u32, U32);
    };
    (@field $field:ident, i16) => {
        $crate::le_accessors!(@impl $field, i16, I16);
    };
    ($($field:ident : $ty:tt),* $(,)?) => {
        $(
            $crate::le_accessors!(@field $field, $ty);
        )*
    };
}
