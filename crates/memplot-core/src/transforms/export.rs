//! Built-in export transforms: `Numpy`, `Raw` and `Text`.

use std::io::Write;

use crate::array::TypedArray;
use crate::error::Result;

/// `.npy` file carrying dtype and shape, readable by any NumPy
pub fn numpy(array: &TypedArray, out: &mut dyn Write) -> Result<()>
{
    array.write_npy(out)
}

/// Headerless element bytes in native order
pub fn raw(array: &TypedArray, out: &mut dyn Write) -> Result<()>
{
    out.write_all(&array.to_ne_bytes())?;
    Ok(())
}

/// Whitespace-separated text, one row per line
///
/// 1-D arrays get one value per line. Arrays with more than two dimensions
/// are written as `shape[0]` rows of everything else.
pub fn text(array: &TypedArray, out: &mut dyn Write) -> Result<()>
{
    let values = array.to_text_values();
    let row_len = match array.shape() {
        [] | [_] => 1,
        [rows, ..] => values.len() / (*rows).max(1),
    };

    for row in values.chunks(row_len.max(1)) {
        writeln!(out, "{}", row.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::{ArrayLayout, DType, Shape};

    fn u16_array(dims: &[usize], values: &[u16]) -> TypedArray
    {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        TypedArray::from_bytes(&bytes, &ArrayLayout::new(Shape::new(dims), DType::UInt16)).unwrap()
    }

    #[test]
    fn test_text_rows()
    {
        let mut out = Vec::new();
        text(&u16_array(&[2, 3], &[1, 2, 3, 4, 5, 6]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 2 3\n4 5 6\n");
    }

    #[test]
    fn test_text_one_dimensional()
    {
        let mut out = Vec::new();
        text(&u16_array(&[3], &[7, 8, 9]), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "7\n8\n9\n");
    }

    #[test]
    fn test_text_flattens_trailing_dimensions()
    {
        let mut out = Vec::new();
        let values: Vec<u16> = (0..8).collect();
        text(&u16_array(&[2, 2, 2], &values), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0 1 2 3\n4 5 6 7\n");
    }

    #[test]
    fn test_raw_is_native_bytes()
    {
        let mut out = Vec::new();
        raw(&u16_array(&[2], &[0x0102, 0x0304]), &mut out).unwrap();
        let expected: Vec<u8> = [0x0102u16, 0x0304].iter().flat_map(|v| v.to_ne_bytes()).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_numpy_header_magic()
    {
        let mut out = Vec::new();
        numpy(&u16_array(&[2], &[1, 2]), &mut out).unwrap();
        assert!(out.starts_with(b"\x93NUMPY"));
    }
}
