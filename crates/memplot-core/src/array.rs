//! # Array Reconstruction
//!
//! Turns snapshot bytes into a shaped, typed [`ndarray`] array.
//!
//! Bytes are decoded in native order: snapshots are taken from a process
//! running on the same machine, so its element layout is ours.

use std::io::Write;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use ndarray_npy::WriteNpyExt;
use num_complex::{Complex32, Complex64};

use crate::error::{MemplotError, Result};
use crate::snapshot::MemorySnapshot;
use crate::types::{ArrayLayout, DType, Shape};

/// Element types a [`TypedArray`] can hold
pub trait Element: Copy
{
    const DTYPE: DType;

    /// Decode one element from exactly `DTYPE.width()` native-order bytes
    fn from_ne_slice(bytes: &[u8]) -> Self;

    /// Append the native-order bytes of this element
    fn extend_ne_bytes(self, out: &mut Vec<u8>);

    /// Real value used when plotting; complex numbers plot their magnitude
    fn to_f64(self) -> f64;

    /// Text form used by the `Text` export
    fn to_text(self) -> String;
}

macro_rules! int_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty
            {
                const DTYPE: DType = DType::$dtype;

                fn from_ne_slice(bytes: &[u8]) -> Self
                {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_ne_bytes(raw)
                }

                fn extend_ne_bytes(self, out: &mut Vec<u8>)
                {
                    out.extend_from_slice(&self.to_ne_bytes());
                }

                fn to_f64(self) -> f64
                {
                    self as f64
                }

                fn to_text(self) -> String
                {
                    self.to_string()
                }
            }
        )*
    };
}

int_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);

impl Element for f32
{
    const DTYPE: DType = DType::Float32;

    fn from_ne_slice(bytes: &[u8]) -> Self
    {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        f32::from_ne_bytes(raw)
    }

    fn extend_ne_bytes(self, out: &mut Vec<u8>)
    {
        out.extend_from_slice(&self.to_ne_bytes());
    }

    fn to_f64(self) -> f64
    {
        f64::from(self)
    }

    fn to_text(self) -> String
    {
        format!("{self:e}")
    }
}

impl Element for f64
{
    const DTYPE: DType = DType::Float64;

    fn from_ne_slice(bytes: &[u8]) -> Self
    {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        f64::from_ne_bytes(raw)
    }

    fn extend_ne_bytes(self, out: &mut Vec<u8>)
    {
        out.extend_from_slice(&self.to_ne_bytes());
    }

    fn to_f64(self) -> f64
    {
        self
    }

    fn to_text(self) -> String
    {
        format!("{self:e}")
    }
}

impl Element for Complex32
{
    const DTYPE: DType = DType::Complex64;

    fn from_ne_slice(bytes: &[u8]) -> Self
    {
        Complex32::new(f32::from_ne_slice(&bytes[..4]), f32::from_ne_slice(&bytes[4..]))
    }

    fn extend_ne_bytes(self, out: &mut Vec<u8>)
    {
        self.re.extend_ne_bytes(out);
        self.im.extend_ne_bytes(out);
    }

    fn to_f64(self) -> f64
    {
        f64::from(self.norm())
    }

    fn to_text(self) -> String
    {
        format!("({:e}{:+e}j)", self.re, self.im)
    }
}

impl Element for Complex64
{
    const DTYPE: DType = DType::Complex128;

    fn from_ne_slice(bytes: &[u8]) -> Self
    {
        Complex64::new(f64::from_ne_slice(&bytes[..8]), f64::from_ne_slice(&bytes[8..]))
    }

    fn extend_ne_bytes(self, out: &mut Vec<u8>)
    {
        self.re.extend_ne_bytes(out);
        self.im.extend_ne_bytes(out);
    }

    fn to_f64(self) -> f64
    {
        self.norm()
    }

    fn to_text(self) -> String
    {
        format!("({:e}{:+e}j)", self.re, self.im)
    }
}

/// A reconstructed array, one variant per dtype
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray
{
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    UInt8(ArrayD<u8>),
    UInt16(ArrayD<u16>),
    UInt32(ArrayD<u32>),
    UInt64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Complex64(ArrayD<Complex32>),
    Complex128(ArrayD<Complex64>),
}

/// Run `$body` with `$arr` bound to the inner `ArrayD<T>` of any variant
macro_rules! with_array {
    ($value:expr, $arr:ident => $body:expr) => {
        match $value {
            TypedArray::Int8($arr) => $body,
            TypedArray::Int16($arr) => $body,
            TypedArray::Int32($arr) => $body,
            TypedArray::Int64($arr) => $body,
            TypedArray::UInt8($arr) => $body,
            TypedArray::UInt16($arr) => $body,
            TypedArray::UInt32($arr) => $body,
            TypedArray::UInt64($arr) => $body,
            TypedArray::Float32($arr) => $body,
            TypedArray::Float64($arr) => $body,
            TypedArray::Complex64($arr) => $body,
            TypedArray::Complex128($arr) => $body,
        }
    };
}

fn decode<T: Element>(bytes: &[u8], shape: &Shape) -> Result<ArrayD<T>>
{
    let values: Vec<T> = bytes.chunks_exact(T::DTYPE.width()).map(T::from_ne_slice).collect();
    Ok(ArrayD::from_shape_vec(IxDyn(shape.dims()), values)?)
}

impl TypedArray
{
    /// Decode raw bytes according to `layout`
    ///
    /// ## Errors
    ///
    /// - `SizeMismatch` if `bytes.len()` differs from `layout.byte_len()`
    ///
    /// ```rust
    /// use memplot_core::array::TypedArray;
    /// use memplot_core::types::{ArrayLayout, DType, Shape};
    ///
    /// let bytes: Vec<u8> = [1u16, 2, 3, 4].iter().flat_map(|v| v.to_ne_bytes()).collect();
    /// let layout = ArrayLayout::new(Shape::new(&[2, 2]), DType::UInt16);
    /// let array = TypedArray::from_bytes(&bytes, &layout)?;
    /// assert_eq!(array.shape(), &[2, 2]);
    /// # Ok::<(), memplot_core::error::MemplotError>(())
    /// ```
    pub fn from_bytes(bytes: &[u8], layout: &ArrayLayout) -> Result<Self>
    {
        let expected = layout.byte_len()?;
        if bytes.len() != expected {
            return Err(MemplotError::SizeMismatch {
                dtype: layout.dtype,
                shape: layout.shape.to_string(),
                expected,
                actual: bytes.len(),
            });
        }

        let shape = &layout.shape;
        let array = match layout.dtype {
            DType::Int8 => TypedArray::Int8(decode(bytes, shape)?),
            DType::Int16 => TypedArray::Int16(decode(bytes, shape)?),
            DType::Int32 => TypedArray::Int32(decode(bytes, shape)?),
            DType::Int64 => TypedArray::Int64(decode(bytes, shape)?),
            DType::UInt8 => TypedArray::UInt8(decode(bytes, shape)?),
            DType::UInt16 => TypedArray::UInt16(decode(bytes, shape)?),
            DType::UInt32 => TypedArray::UInt32(decode(bytes, shape)?),
            DType::UInt64 => TypedArray::UInt64(decode(bytes, shape)?),
            DType::Float32 => TypedArray::Float32(decode(bytes, shape)?),
            DType::Float64 => TypedArray::Float64(decode(bytes, shape)?),
            DType::Complex64 => TypedArray::Complex64(decode(bytes, shape)?),
            DType::Complex128 => TypedArray::Complex128(decode(bytes, shape)?),
        };
        Ok(array)
    }

    /// Load a snapshot file and decode it according to `layout`
    pub fn from_file(path: &Path, layout: &ArrayLayout) -> Result<Self>
    {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, layout)
    }

    pub fn from_snapshot(snapshot: &MemorySnapshot, layout: &ArrayLayout) -> Result<Self>
    {
        Self::from_file(snapshot.path(), layout)
    }

    pub fn dtype(&self) -> DType
    {
        match self {
            TypedArray::Int8(_) => DType::Int8,
            TypedArray::Int16(_) => DType::Int16,
            TypedArray::Int32(_) => DType::Int32,
            TypedArray::Int64(_) => DType::Int64,
            TypedArray::UInt8(_) => DType::UInt8,
            TypedArray::UInt16(_) => DType::UInt16,
            TypedArray::UInt32(_) => DType::UInt32,
            TypedArray::UInt64(_) => DType::UInt64,
            TypedArray::Float32(_) => DType::Float32,
            TypedArray::Float64(_) => DType::Float64,
            TypedArray::Complex64(_) => DType::Complex64,
            TypedArray::Complex128(_) => DType::Complex128,
        }
    }

    pub fn shape(&self) -> &[usize]
    {
        with_array!(self, arr => arr.shape())
    }

    pub fn ndim(&self) -> usize
    {
        self.shape().len()
    }

    pub fn len(&self) -> usize
    {
        with_array!(self, arr => arr.len())
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// Shape rendered as a tuple, for messages
    pub fn shape_string(&self) -> String
    {
        Shape::new(self.shape()).to_string()
    }

    /// Plottable copy of the data
    pub fn to_f64(&self) -> ArrayD<f64>
    {
        with_array!(self, arr => arr.mapv(Element::to_f64))
    }

    /// Elements in row-major order as text
    pub fn to_text_values(&self) -> Vec<String>
    {
        with_array!(self, arr => arr.iter().map(|v| v.to_text()).collect())
    }

    /// Elements in row-major order as native bytes
    pub fn to_ne_bytes(&self) -> Vec<u8>
    {
        let mut out = Vec::with_capacity(self.len() * self.dtype().width());
        with_array!(self, arr => arr.iter().for_each(|v| v.extend_ne_bytes(&mut out)));
        out
    }

    /// Serialise the array in `.npy` format
    pub fn write_npy(&self, out: &mut dyn Write) -> Result<()>
    {
        with_array!(self, arr => arr.write_npy(&mut *out)?);
        Ok(())
    }
}
