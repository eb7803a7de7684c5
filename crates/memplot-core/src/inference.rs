//! # Shape and dtype inference
//!
//! Recovers the `(Shape, DType)` of a C array from its type descriptor.
//!
//! Each array layer contributes one extent computed from byte sizes, the
//! same way a debugger's `sizeof` arithmetic would: `outer / inner`. The
//! first non-array type is the element; its kind and width pick the dtype.
//!
//! Inference never fails. Anything that cannot be represented as a typed
//! numeric array comes back as [`Inference::Unsupported`], and the caller
//! is expected to check before taking a snapshot.

use std::fmt;

use crate::types::{ArrayLayout, DType, Shape, TypeDescriptor, TypeKind};

/// Why a descriptor has no array representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedReason
{
    /// The descriptor is not an array at all
    NotAnArray,
    /// The innermost element is not int/float/complex
    NonNumericElement(String),
    /// Numeric element whose width has no dtype (e.g. `long double`)
    UnmappedWidth
    {
        element: String,
        byte_size: u64,
    },
    /// A layer has zero extent or a zero-sized element
    Empty,
    /// `outer / inner` left a remainder
    InexactExtent
    {
        outer: u64,
        inner: u64,
    },
}

impl fmt::Display for UnsupportedReason
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            UnsupportedReason::NotAnArray => f.write_str("value is not an array"),
            UnsupportedReason::NonNumericElement(name) => write!(f, "element type '{name}' is not numeric"),
            UnsupportedReason::UnmappedWidth { element, byte_size } => {
                write!(f, "no dtype for {byte_size}-byte '{element}'")
            }
            UnsupportedReason::Empty => f.write_str("array has no elements"),
            UnsupportedReason::InexactExtent { outer, inner } => {
                write!(f, "{outer} bytes is not a multiple of the {inner}-byte element")
            }
        }
    }
}

/// Outcome of inference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inference
{
    Array(ArrayLayout),
    Unsupported(UnsupportedReason),
}

impl Inference
{
    pub fn layout(&self) -> Option<&ArrayLayout>
    {
        match self {
            Inference::Array(layout) => Some(layout),
            Inference::Unsupported(_) => None,
        }
    }

    pub fn into_layout(self) -> Option<ArrayLayout>
    {
        match self {
            Inference::Array(layout) => Some(layout),
            Inference::Unsupported(_) => None,
        }
    }
}

/// Infer the layout of an array-typed value
///
/// ```rust
/// use memplot_core::inference::infer_layout;
/// use memplot_core::types::{DType, TypeDescriptor};
///
/// let row = TypeDescriptor::array(TypeDescriptor::float("float", 4), 4);
/// let grid = TypeDescriptor::array(row, 4);
/// let layout = infer_layout(&grid).into_layout().unwrap();
/// assert_eq!(layout.shape.dims(), &[4, 4]);
/// assert_eq!(layout.dtype, DType::Float32);
/// ```
pub fn infer_layout(ty: &TypeDescriptor) -> Inference
{
    if !ty.is_array() {
        return Inference::Unsupported(UnsupportedReason::NotAnArray);
    }

    let mut shape = Shape::default();
    let mut current = ty;
    while let TypeKind::Array { element, .. } = &current.kind {
        let (outer, inner) = (current.byte_size, element.byte_size);
        if outer == 0 || inner == 0 {
            return Inference::Unsupported(UnsupportedReason::Empty);
        }
        if outer % inner != 0 {
            return Inference::Unsupported(UnsupportedReason::InexactExtent { outer, inner });
        }
        let Ok(extent) = usize::try_from(outer / inner) else {
            return Inference::Unsupported(UnsupportedReason::Empty);
        };
        shape.push(extent);
        current = element;
    }

    match dtype_of(current) {
        Ok(dtype) => Inference::Array(ArrayLayout::new(shape, dtype)),
        Err(reason) => Inference::Unsupported(reason),
    }
}

/// Map a scalar element type to a dtype
pub fn dtype_of(element: &TypeDescriptor) -> Result<DType, UnsupportedReason>
{
    let kind = element
        .numeric_kind()
        .ok_or_else(|| UnsupportedReason::NonNumericElement(element.name.clone()))?;
    DType::from_kind(kind, element.byte_size).ok_or_else(|| UnsupportedReason::UnmappedWidth {
        element: element.name.clone(),
        byte_size: element.byte_size,
    })
}

/// Whether the dumper should offer a plot for this array
///
/// Only looks one level down: the direct target must be another array or a
/// numeric scalar. Deeper problems surface later as `Unsupported`.
pub fn is_plottable_target(ty: &TypeDescriptor) -> bool
{
    ty.target().is_some_and(|target| {
        matches!(
            target.kind,
            TypeKind::Array { .. } | TypeKind::Int { .. } | TypeKind::Float | TypeKind::Complex
        )
    })
}
