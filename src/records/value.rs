//! # Row Values
//!
//! `Value` is the owned cell type stored in a [`Row`](super::Row). Each
//! variant corresponds to exactly one [`ColumnType`]; `Null` only appears for
//! columns of unknown type, whose bytes are skipped on read.
//!
//! Integer cells convert to and from a raw 64-bit pattern so the row codecs
//! can run every integer width through the same [`BitField`] logic.
//!
//! [`BitField`]: crate::encoding::BitField

use crate::records::types::ColumnType;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    Str(String),
}

impl Value {
    /// Builds an integer cell of type `ty` from a decoded bit pattern.
    /// Signed patterns are expected to be sign-extended already.
    pub fn from_raw(ty: ColumnType, raw: u64) -> Option<Self> {
        let value = match ty {
            ColumnType::I8 => Value::I8(raw as i8),
            ColumnType::U8 => Value::U8(raw as u8),
            ColumnType::I16 => Value::I16(raw as i16),
            ColumnType::U16 => Value::U16(raw as u16),
            ColumnType::I32 => Value::I32(raw as i32),
            ColumnType::U32 => Value::U32(raw as u32),
            ColumnType::I64 => Value::I64(raw as i64),
            ColumnType::U64 => Value::U64(raw),
            _ => return None,
        };
        Some(value)
    }

    /// Two's-complement bit pattern of an integer cell, widened to 64 bits.
    pub fn raw_bits(&self) -> Option<u64> {
        let raw = match *self {
            Value::I8(v) => v as i64 as u64,
            Value::U8(v) => u64::from(v),
            Value::I16(v) => v as i64 as u64,
            Value::U16(v) => u64::from(v),
            Value::I32(v) => v as i64 as u64,
            Value::U32(v) => u64::from(v),
            Value::I64(v) => v as u64,
            Value::U64(v) => v,
            _ => return None,
        };
        Some(raw)
    }

    pub fn matches(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (Value::Bool(_), ColumnType::Bool)
                | (Value::I8(_), ColumnType::I8)
                | (Value::U8(_), ColumnType::U8)
                | (Value::I16(_), ColumnType::I16)
                | (Value::U16(_), ColumnType::U16)
                | (Value::I32(_), ColumnType::I32)
                | (Value::U32(_), ColumnType::U32)
                | (Value::I64(_), ColumnType::I64)
                | (Value::U64(_), ColumnType::U64)
                | (Value::F32(_), ColumnType::F32)
                | (Value::Str(_), ColumnType::String)
                | (Value::Null, ColumnType::Unknown(_))
        )
    }

    /// Interprets an integer cell as a record id. Index and copy tables store
    /// ids as u32, so wider values are truncated.
    pub fn as_id(&self) -> Option<u32> {
        self.raw_bits().map(|raw| raw as u32)
    }

    /// Builds the id cell for a column of type `ty`. Non-integer id columns
    /// fall back to `U32`.
    pub fn from_id(ty: ColumnType, id: u32) -> Self {
        let raw = if ty.is_signed() {
            id as i32 as i64 as u64
        } else {
            u64::from(id)
        };
        Value::from_raw(ty, raw).unwrap_or(Value::U32(id))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Appends a type-tagged byte image of the cell, used as a hash key when
    /// collapsing duplicate rows.
    pub(crate) fn write_key(&self, key: &mut Vec<u8>) {
        match self {
            Value::Null => key.push(0),
            Value::Bool(b) => key.extend_from_slice(&[1, u8::from(*b)]),
            Value::F32(f) => {
                key.push(2);
                key.extend_from_slice(&f.to_bits().to_le_bytes());
            }
            Value::Str(s) => {
                key.push(3);
                key.extend_from_slice(&(s.len() as u32).to_le_bytes());
                key.extend_from_slice(s.as_bytes());
            }
            other => {
                key.push(4);
                key.extend_from_slice(&other.raw_bits().unwrap_or_default().to_le_bytes());
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

macro_rules! value_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

value_from_primitive! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_bits_widen_with_sign() {
        assert_eq!(Value::I8(-1).raw_bits(), Some(u64::MAX));
        assert_eq!(Value::U8(0xFF).raw_bits(), Some(0xFF));
        assert_eq!(Value::Str("x".into()).raw_bits(), None);
    }

    #[test]
    fn from_raw_narrows_to_column_type() {
        assert_eq!(Value::from_raw(ColumnType::I16, u64::MAX), Some(Value::I16(-1)));
        assert_eq!(Value::from_raw(ColumnType::U16, 0x1_FFFF), Some(Value::U16(0xFFFF)));
        assert_eq!(Value::from_raw(ColumnType::F32, 0), None);
    }

    #[test]
    fn ids_convert_for_signed_and_unsigned_columns() {
        assert_eq!(Value::from_id(ColumnType::U32, 77), Value::U32(77));
        assert_eq!(Value::from_id(ColumnType::I32, 77), Value::I32(77));
        assert_eq!(Value::from_id(ColumnType::String, 5), Value::U32(5));
        assert_eq!(Value::I32(1234).as_id(), Some(1234));
    }

    #[test]
    fn matches_checks_variant_against_type() {
        assert!(Value::Str("Ironforge".into()).matches(ColumnType::String));
        assert!(!Value::U32(1).matches(ColumnType::I32));
        assert!(Value::Null.matches(ColumnType::Unknown(3)));
        assert!(!Value::Null.matches(ColumnType::U8));
    }

    #[test]
    fn key_distinguishes_types_with_equal_bits() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        Value::F32(0.0).write_key(&mut a);
        Value::U32(0).write_key(&mut b);
        assert_ne!(a, b);
    }
}
