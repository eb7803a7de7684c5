//! Array shapes and layouts.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use super::DType;
use crate::error::{MemplotError, Result};

/// Array extents, outermost first
///
/// C arrays rarely nest more than a few levels, so the extents live inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(SmallVec<[usize; 4]>);

impl Shape
{
    pub fn new(dims: &[usize]) -> Self
    {
        Shape(SmallVec::from_slice(dims))
    }

    pub fn dims(&self) -> &[usize]
    {
        &self.0
    }

    pub fn ndim(&self) -> usize
    {
        self.0.len()
    }

    /// Total number of elements, `None` if the product overflows
    pub fn num_elements(&self) -> Option<usize>
    {
        self.0.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }

    pub(crate) fn push(&mut self, extent: usize)
    {
        self.0.push(extent);
    }
}

impl From<Vec<usize>> for Shape
{
    fn from(dims: Vec<usize>) -> Self
    {
        Shape(SmallVec::from_vec(dims))
    }
}

/// Parses `4x4`, `4,4`, `(4, 4)` or `8`
impl FromStr for Shape
{
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        let inner = s.trim().trim_start_matches('(').trim_end_matches(')');
        let dims = inner
            .split(|c: char| c == 'x' || c == ',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<usize>().map_err(|_| format!("Invalid extent '{part}' in shape {s}")))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if dims.is_empty() {
            return Err(format!("Empty shape: {s}"));
        }
        Ok(Shape::from(dims))
    }
}

/// Renders like a tuple: `(8,)`, `(4, 4)`
impl fmt::Display for Shape
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.0.as_slice() {
            [single] => write!(f, "({single},)"),
            dims => {
                f.write_str("(")?;
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{dim}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Shape and element type recovered for one array value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLayout
{
    pub shape: Shape,
    pub dtype: DType,
}

impl ArrayLayout
{
    pub fn new(shape: Shape, dtype: DType) -> Self
    {
        ArrayLayout { shape, dtype }
    }

    /// Number of bytes spanned in memory
    ///
    /// ## Errors
    ///
    /// - `LayoutOverflow` if the size does not fit in a `usize`
    pub fn byte_len(&self) -> Result<usize>
    {
        self.shape
            .num_elements()
            .and_then(|count| count.checked_mul(self.dtype.width()))
            .ok_or_else(|| MemplotError::LayoutOverflow {
                dtype: self.dtype,
                shape: self.shape.to_string(),
            })
    }
}

impl fmt::Display for ArrayLayout
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{} {}", self.dtype, self.shape)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_shape_display()
    {
        assert_eq!(Shape::new(&[8]).to_string(), "(8,)");
        assert_eq!(Shape::new(&[4, 4]).to_string(), "(4, 4)");
        assert_eq!(Shape::new(&[]).to_string(), "()");
    }

    #[test]
    fn test_shape_parse()
    {
        assert_eq!("4x4".parse::<Shape>(), Ok(Shape::new(&[4, 4])));
        assert_eq!("(2, 3, 4)".parse::<Shape>(), Ok(Shape::new(&[2, 3, 4])));
        assert_eq!("(8,)".parse::<Shape>(), Ok(Shape::new(&[8])));
        assert!("4xa".parse::<Shape>().is_err());
        assert!("()".parse::<Shape>().is_err());
    }

    #[test]
    fn test_layout_byte_len()
    {
        let layout = ArrayLayout::new(Shape::new(&[4, 4]), DType::Float32);
        assert_eq!(layout.byte_len().unwrap(), 64);
        assert_eq!(layout.to_string(), "float32 (4, 4)");
    }

    #[test]
    fn test_oversized_layout_is_an_error()
    {
        let shape = Shape::new(&[1 << 40, 1 << 40]);
        assert_eq!(shape.num_elements(), None);

        let layout = ArrayLayout::new(shape, DType::Float64);
        assert!(matches!(layout.byte_len(), Err(MemplotError::LayoutOverflow { .. })));

        // Element count fits, byte count does not.
        let layout = ArrayLayout::new(Shape::new(&[usize::MAX / 4]), DType::Float64);
        assert!(layout.shape.num_elements().is_some());
        assert!(layout.byte_len().is_err());
    }
}
