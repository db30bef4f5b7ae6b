//! Tag data types and typed value conversion.
//!
//! A tag is declared with a [`DataType`] when it is created; the type is
//! encoded into the transport address (`elem_size=`) so the transport knows
//! how many bytes each element occupies on the wire. The [`TagValue`] trait
//! is the typed seam on top of the raw byte cache: it maps a Rust type to
//! its controller data type and converts values to and from the CIP
//! little-endian byte representation.
//!
//! # Example
//!
//! ```
//! use logix_tags::{DataType, TagValue};
//!
//! assert_eq!(DataType::Dint.elem_size(), 4);
//! assert_eq!(<i32 as TagValue>::data_type(), DataType::Dint);
//!
//! let bytes = 1234i32.encode();
//! assert_eq!(i32::decode(&bytes).unwrap(), 1234);
//! ```

use crate::error::{Result, TagError};

/// Controller data types a tag can be declared with.
///
/// The names follow the Logix type system (SINT/INT/DINT/LINT for the
/// integer widths, REAL/LREAL for floats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// BOOL - single boolean.
    Bool,
    /// SINT - signed 8-bit integer.
    Sint,
    /// INT - signed 16-bit integer.
    Int,
    /// DINT - signed 32-bit integer.
    Dint,
    /// LINT - signed 64-bit integer.
    Lint,
    /// REAL - 32-bit IEEE float.
    Real,
    /// LREAL - 64-bit IEEE float.
    Lreal,
    /// STRING - Logix string structure.
    String,
}

impl DataType {
    /// Returns the element size in bytes as the transport expects it.
    ///
    /// # Example
    ///
    /// ```
    /// use logix_tags::DataType;
    ///
    /// assert_eq!(DataType::Int.elem_size(), 2);
    /// assert_eq!(DataType::Lreal.elem_size(), 8);
    /// ```
    pub fn elem_size(self) -> usize {
        match self {
            DataType::Bool | DataType::Sint => 1,
            DataType::Int => 2,
            DataType::Dint | DataType::Real => 4,
            DataType::Lint | DataType::Lreal => 8,
            // Logix STRING: 4-byte length + 82 chars + 2 pad bytes.
            DataType::String => 88,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Bool => write!(f, "BOOL"),
            DataType::Sint => write!(f, "SINT"),
            DataType::Int => write!(f, "INT"),
            DataType::Dint => write!(f, "DINT"),
            DataType::Lint => write!(f, "LINT"),
            DataType::Real => write!(f, "REAL"),
            DataType::Lreal => write!(f, "LREAL"),
            DataType::String => write!(f, "STRING"),
        }
    }
}

/// Conversion between a Rust type and a tag's raw byte representation.
///
/// Implemented for `bool`, the signed integer widths, `f32`/`f64` and
/// `String`. Used by [`Tag::get`](crate::Tag::get) and
/// [`Tag::set`](crate::Tag::set) to route typed access through the byte
/// cache; a [`TypeMismatch`](crate::TagError::TypeMismatch) is returned
/// when the Rust type does not match the tag's declared [`DataType`].
pub trait TagValue: Sized {
    /// The controller data type this Rust type maps to.
    fn data_type() -> DataType;

    /// Decodes a value from its little-endian byte representation.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the buffer length does not match the type.
    fn decode(raw: &[u8]) -> Result<Self>;

    /// Encodes the value into its little-endian byte representation.
    fn encode(&self) -> Vec<u8>;
}

/// Builds the buffer-shape mismatch error decode impls share.
fn bad_buffer(expected: DataType, len: usize) -> TagError {
    TagError::type_mismatch(expected.to_string(), format!("{len}-byte buffer"))
}

impl TagValue for bool {
    fn data_type() -> DataType {
        DataType::Bool
    }

    fn decode(raw: &[u8]) -> Result<Self> {
        match raw {
            [b] => Ok(*b != 0),
            _ => Err(bad_buffer(DataType::Bool, raw.len())),
        }
    }

    fn encode(&self) -> Vec<u8> {
        vec![u8::from(*self)]
    }
}

macro_rules! int_tag_value {
    ($ty:ty, $dt:expr, $size:expr) => {
        impl TagValue for $ty {
            fn data_type() -> DataType {
                $dt
            }

            fn decode(raw: &[u8]) -> Result<Self> {
                let bytes: [u8; $size] = raw
                    .try_into()
                    .map_err(|_| bad_buffer($dt, raw.len()))?;
                Ok(<$ty>::from_le_bytes(bytes))
            }

            fn encode(&self) -> Vec<u8> {
                self.to_le_bytes().to_vec()
            }
        }
    };
}

int_tag_value!(i8, DataType::Sint, 1);
int_tag_value!(i16, DataType::Int, 2);
int_tag_value!(i32, DataType::Dint, 4);
int_tag_value!(i64, DataType::Lint, 8);
int_tag_value!(f32, DataType::Real, 4);
int_tag_value!(f64, DataType::Lreal, 8);

impl TagValue for String {
    fn data_type() -> DataType {
        DataType::String
    }

    fn decode(raw: &[u8]) -> Result<Self> {
        // Trailing NULs pad short strings up to the structure size.
        let trimmed: Vec<u8> = raw
            .iter()
            .copied()
            .take_while(|b| *b != 0)
            .collect();
        String::from_utf8(trimmed)
            .map_err(|_| TagError::type_mismatch(DataType::String.to_string(), "non-UTF-8 buffer"))
    }

    fn encode(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elem_sizes() {
        assert_eq!(DataType::Bool.elem_size(), 1);
        assert_eq!(DataType::Sint.elem_size(), 1);
        assert_eq!(DataType::Int.elem_size(), 2);
        assert_eq!(DataType::Dint.elem_size(), 4);
        assert_eq!(DataType::Lint.elem_size(), 8);
        assert_eq!(DataType::Real.elem_size(), 4);
        assert_eq!(DataType::Lreal.elem_size(), 8);
        assert_eq!(DataType::String.elem_size(), 88);
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Dint.to_string(), "DINT");
        assert_eq!(DataType::Lreal.to_string(), "LREAL");
        assert_eq!(DataType::String.to_string(), "STRING");
    }

    #[test]
    fn test_dint_round_trip() {
        let bytes = (-123_456i32).encode();
        assert_eq!(bytes, vec![0xC0, 0x1D, 0xFE, 0xFF]);
        assert_eq!(i32::decode(&bytes).unwrap(), -123_456);
    }

    #[test]
    fn test_real_little_endian() {
        let bytes = 1.0f32.encode();
        assert_eq!(bytes, vec![0x00, 0x00, 0x80, 0x3F]);
        assert_eq!(f32::decode(&bytes).unwrap(), 1.0);
    }

    #[test]
    fn test_bool_decode() {
        assert!(bool::decode(&[1]).unwrap());
        assert!(!bool::decode(&[0]).unwrap());
        assert!(bool::decode(&[]).is_err());
    }

    #[test]
    fn test_wrong_buffer_size() {
        let err = i16::decode(&[0x01]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type mismatch: tag holds INT, requested 1-byte buffer"
        );
    }

    #[test]
    fn test_string_trims_padding() {
        let mut raw = b"PRODUCT-001".to_vec();
        raw.resize(32, 0);
        assert_eq!(String::decode(&raw).unwrap(), "PRODUCT-001");
    }
}
