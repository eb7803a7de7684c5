//! Native type descriptions as reported by a debugger.

use std::fmt;

use super::{Address, NumericKind};

/// What kind of native type a descriptor describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind
{
    /// Signed or unsigned integer (including `char` types)
    Int
    {
        signed: bool,
    },
    Float,
    /// C99 `_Complex` / `std::complex` layout
    Complex,
    Bool,
    /// Fixed-extent array of `element`
    Array
    {
        element: Box<TypeDescriptor>,
        extent: u64,
    },
    Struct,
    Pointer,
    /// Anything else (enums, unions, functions, unsized arrays)
    Other,
}

/// Recursive description of a native type
///
/// `byte_size` follows the debugger's `sizeof`: for arrays it is the size of
/// the whole array, not of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor
{
    pub name: String,
    pub byte_size: u64,
    pub kind: TypeKind,
}

impl TypeDescriptor
{
    pub fn new(name: impl Into<String>, byte_size: u64, kind: TypeKind) -> Self
    {
        TypeDescriptor {
            name: name.into(),
            byte_size,
            kind,
        }
    }

    pub fn int(name: impl Into<String>, byte_size: u64, signed: bool) -> Self
    {
        Self::new(name, byte_size, TypeKind::Int { signed })
    }

    pub fn float(name: impl Into<String>, byte_size: u64) -> Self
    {
        Self::new(name, byte_size, TypeKind::Float)
    }

    pub fn complex(name: impl Into<String>, byte_size: u64) -> Self
    {
        Self::new(name, byte_size, TypeKind::Complex)
    }

    pub fn structure(name: impl Into<String>, byte_size: u64) -> Self
    {
        Self::new(name, byte_size, TypeKind::Struct)
    }

    /// Array of `extent` elements; the name and size are derived C-style
    ///
    /// ```rust
    /// use memplot_core::types::TypeDescriptor;
    ///
    /// let row = TypeDescriptor::array(TypeDescriptor::float("float", 4), 4);
    /// let grid = TypeDescriptor::array(row, 3);
    /// assert_eq!(grid.name, "float [3][4]");
    /// assert_eq!(grid.byte_size, 48);
    /// ```
    pub fn array(element: TypeDescriptor, extent: u64) -> Self
    {
        let name = match element.name.find('[') {
            Some(pos) => format!("{}[{extent}]{}", &element.name[..pos], &element.name[pos..]),
            None => format!("{} [{extent}]", element.name),
        };
        let byte_size = element.byte_size.saturating_mul(extent);
        Self::new(
            name,
            byte_size,
            TypeKind::Array {
                element: Box::new(element),
                extent,
            },
        )
    }

    pub fn is_array(&self) -> bool
    {
        matches!(self.kind, TypeKind::Array { .. })
    }

    /// Element type of an array, `None` for anything else
    pub fn target(&self) -> Option<&TypeDescriptor>
    {
        match &self.kind {
            TypeKind::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Numeric family, if this is a scalar with one
    pub fn numeric_kind(&self) -> Option<NumericKind>
    {
        match self.kind {
            TypeKind::Int { signed } => Some(NumericKind::Int { signed }),
            TypeKind::Float => Some(NumericKind::Float),
            TypeKind::Complex => Some(NumericKind::Complex),
            _ => None,
        }
    }
}

impl fmt::Display for TypeDescriptor
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.name)
    }
}

/// One live value in the inspected process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugValue
{
    pub name: String,
    pub address: Address,
    pub ty: TypeDescriptor,
}

impl DebugValue
{
    pub fn new(name: impl Into<String>, address: Address, ty: TypeDescriptor) -> Self
    {
        DebugValue {
            name: name.into(),
            address,
            ty,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_array_naming_keeps_outer_extent_first()
    {
        let inner = TypeDescriptor::array(TypeDescriptor::int("unsigned short", 2, false), 8);
        assert_eq!(inner.name, "unsigned short [8]");
        let outer = TypeDescriptor::array(inner, 2);
        assert_eq!(outer.name, "unsigned short [2][8]");
        assert_eq!(outer.byte_size, 32);
    }

    #[test]
    fn test_target_of_scalar_is_none()
    {
        assert!(TypeDescriptor::float("double", 8).target().is_none());
    }
}
