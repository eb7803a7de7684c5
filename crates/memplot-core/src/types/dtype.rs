//! Numeric element types.

use std::fmt;
use std::str::FromStr;

/// Numeric family of an element type, before the width is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind
{
    /// Integer, signed or unsigned
    Int
    {
        /// Whether the integer is signed
        signed: bool,
    },
    /// IEEE floating point
    Float,
    /// Pair of IEEE floats (real, imaginary)
    Complex,
}

/// Element type used to reinterpret raw bytes
///
/// There is no "unsupported" variant: a type without a numeric mapping never
/// produces a `DType` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType
{
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
}

impl DType
{
    pub const ALL: [DType; 12] = [
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::UInt8,
        DType::UInt16,
        DType::UInt32,
        DType::UInt64,
        DType::Float32,
        DType::Float64,
        DType::Complex64,
        DType::Complex128,
    ];

    /// Map a numeric kind and byte width to a dtype
    ///
    /// Returns `None` when no matching dtype exists, e.g. for 16-byte
    /// `long double` or a 2-byte half float.
    ///
    /// ```rust
    /// use memplot_core::types::{DType, NumericKind};
    ///
    /// assert_eq!(DType::from_kind(NumericKind::Int { signed: false }, 2), Some(DType::UInt16));
    /// assert_eq!(DType::from_kind(NumericKind::Float, 16), None);
    /// ```
    pub fn from_kind(kind: NumericKind, byte_width: u64) -> Option<Self>
    {
        let dtype = match (kind, byte_width) {
            (NumericKind::Int { signed: true }, 1) => DType::Int8,
            (NumericKind::Int { signed: true }, 2) => DType::Int16,
            (NumericKind::Int { signed: true }, 4) => DType::Int32,
            (NumericKind::Int { signed: true }, 8) => DType::Int64,
            (NumericKind::Int { signed: false }, 1) => DType::UInt8,
            (NumericKind::Int { signed: false }, 2) => DType::UInt16,
            (NumericKind::Int { signed: false }, 4) => DType::UInt32,
            (NumericKind::Int { signed: false }, 8) => DType::UInt64,
            (NumericKind::Float, 4) => DType::Float32,
            (NumericKind::Float, 8) => DType::Float64,
            (NumericKind::Complex, 8) => DType::Complex64,
            (NumericKind::Complex, 16) => DType::Complex128,
            _ => return None,
        };
        Some(dtype)
    }

    /// Element width in bytes
    pub const fn width(self) -> usize
    {
        match self {
            DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64 | DType::UInt64 | DType::Float64 | DType::Complex64 => 8,
            DType::Complex128 => 16,
        }
    }

    /// The numeric family of this dtype
    pub const fn kind(self) -> NumericKind
    {
        match self {
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64 => NumericKind::Int { signed: true },
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64 => NumericKind::Int { signed: false },
            DType::Float32 | DType::Float64 => NumericKind::Float,
            DType::Complex64 | DType::Complex128 => NumericKind::Complex,
        }
    }

    /// Conventional name: optional `u` prefix, family, then bit width
    pub const fn name(self) -> &'static str
    {
        match self {
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
        }
    }
}

impl fmt::Display for DType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

impl FromStr for DType
{
    type Err = String;

    /// Accepts the names printed by `Display`, e.g. `uint16` or `complex64`
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let wanted = s.trim().to_lowercase();
        DType::ALL
            .into_iter()
            .find(|dtype| dtype.name() == wanted)
            .ok_or_else(|| format!("Unknown dtype: {s}"))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_width_matches_name()
    {
        for dtype in DType::ALL {
            let bits: usize = dtype
                .name()
                .trim_start_matches(|c: char| c.is_ascii_alphabetic())
                .parse()
                .unwrap();
            assert_eq!(bits, dtype.width() * 8, "{dtype}");
            assert_eq!(DType::from_kind(dtype.kind(), dtype.width() as u64), Some(dtype));
        }
    }

    #[test]
    fn test_unmapped_widths()
    {
        assert_eq!(DType::from_kind(NumericKind::Int { signed: true }, 16), None);
        assert_eq!(DType::from_kind(NumericKind::Float, 2), None);
        assert_eq!(DType::from_kind(NumericKind::Complex, 32), None);
    }

    #[test]
    fn test_parse_names()
    {
        assert_eq!("uint16".parse::<DType>(), Ok(DType::UInt16));
        assert_eq!(" Float32 ".parse::<DType>(), Ok(DType::Float32));
        assert!("float16".parse::<DType>().is_err());
    }
}
