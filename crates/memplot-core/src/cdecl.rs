//! # C Type Declarations
//!
//! Parses declarations such as `unsigned short[8]`, `float grid[4][4]` or
//! `double complex[3]` into a [`TypeDescriptor`], using LP64 widths.
//!
//! Only scalar element types are understood. Qualifiers (`const`,
//! `volatile`, `restrict`) are ignored, an optional declarator name before
//! the dimensions is skipped, and a trailing `*` makes the element a
//! pointer.

use crate::error::{MemplotError, Result};
use crate::types::{TypeDescriptor, TypeKind};

const POINTER_SIZE: u64 = 8;

/// Fixed-width typedefs from `<stdint.h>` and `<stddef.h>`
const TYPEDEFS: &[(&str, u64, Option<bool>)] = &[
    ("int8_t", 1, Some(true)),
    ("int16_t", 2, Some(true)),
    ("int32_t", 4, Some(true)),
    ("int64_t", 8, Some(true)),
    ("uint8_t", 1, Some(false)),
    ("uint16_t", 2, Some(false)),
    ("uint32_t", 4, Some(false)),
    ("uint64_t", 8, Some(false)),
    ("size_t", 8, Some(false)),
    ("uintptr_t", 8, Some(false)),
    ("ssize_t", 8, Some(true)),
    ("ptrdiff_t", 8, Some(true)),
    ("intptr_t", 8, Some(true)),
    ("float32_t", 4, None),
    ("float64_t", 8, None),
];

#[derive(Debug, Default)]
struct Specifiers
{
    signed: Option<bool>,
    longs: u8,
    complex: bool,
    base: Option<&'static str>,
    typedef: Option<TypeDescriptor>,
    declarator: Option<String>,
}

/// Parse a C declaration into a type descriptor
///
/// ```rust
/// use memplot_core::cdecl::parse_c_type;
///
/// let ty = parse_c_type("unsigned short[2][8]")?;
/// assert_eq!(ty.name, "unsigned short [2][8]");
/// assert_eq!(ty.byte_size, 32);
/// # Ok::<(), memplot_core::error::MemplotError>(())
/// ```
///
/// ## Errors
///
/// - `InvalidTypeDecl` for unknown words, conflicting specifiers or
///   malformed dimensions
pub fn parse_c_type(decl: &str) -> Result<TypeDescriptor>
{
    let invalid = |reason: &str| MemplotError::InvalidTypeDecl {
        decl: decl.to_string(),
        reason: reason.to_string(),
    };

    let (head, dims) = match decl.find('[') {
        Some(pos) => (&decl[..pos], &decl[pos..]),
        None => (decl, ""),
    };

    let pointer_depth = head.matches('*').count();
    let words = head.replace('*', " ");
    let mut element = scalar(&words).map_err(|reason| invalid(&reason))?;
    for _ in 0..pointer_depth {
        element = TypeDescriptor::new(format!("{} *", element.name), POINTER_SIZE, TypeKind::Pointer);
    }

    let extents = parse_dims(dims).map_err(|reason| invalid(&reason))?;
    Ok(extents
        .iter()
        .rev()
        .fold(element, |inner, &extent| TypeDescriptor::array(inner, extent)))
}

fn scalar(words: &str) -> std::result::Result<TypeDescriptor, String>
{
    let mut spec = Specifiers::default();

    for word in words.split_whitespace() {
        if spec.declarator.is_some() {
            return Err(format!("unexpected '{word}' after the declarator name"));
        }
        match word {
            "const" | "volatile" | "restrict" => {}
            "signed" | "unsigned" => {
                if spec.signed.is_some() {
                    return Err("signedness given twice".to_string());
                }
                spec.signed = Some(word == "signed");
            }
            "long" => spec.longs += 1,
            "complex" | "_Complex" => spec.complex = true,
            "char" | "short" | "int" | "float" | "double" | "bool" | "_Bool" => {
                spec.base = match (spec.base, word) {
                    (None, base) => Some(base_name(base)),
                    (Some("short"), "int") => spec.base,
                    (Some(existing), _) => return Err(format!("'{word}' conflicts with '{existing}'")),
                };
            }
            "struct" | "union" | "enum" => {
                return Err(format!("{word} element types are not supported"));
            }
            other => {
                if spec.typedef.is_none() && spec.base.is_none() && spec.longs == 0 && spec.signed.is_none() {
                    if let Some(&(name, size, signed)) = TYPEDEFS.iter().find(|(name, ..)| *name == other) {
                        spec.typedef = Some(match signed {
                            Some(signed) => TypeDescriptor::int(name, size, signed),
                            None => TypeDescriptor::float(name, size),
                        });
                        continue;
                    }
                }
                if !is_identifier(other) {
                    return Err(format!("unexpected '{other}'"));
                }
                if spec.typedef.is_none() && spec.base.is_none() && spec.longs == 0 && spec.signed.is_none() {
                    return Err(format!("unknown type '{other}'"));
                }
                spec.declarator = Some(other.to_string());
            }
        }
    }

    if let Some(typedef) = spec.typedef {
        if spec.complex {
            return Err("complex applies to float and double only".to_string());
        }
        return Ok(typedef);
    }
    build(&spec)
}

fn base_name(word: &str) -> &'static str
{
    match word {
        "char" => "char",
        "short" => "short",
        "int" => "int",
        "float" => "float",
        "double" => "double",
        _ => "bool",
    }
}

fn build(spec: &Specifiers) -> std::result::Result<TypeDescriptor, String>
{
    let signed = spec.signed.unwrap_or(true);
    let prefix = match spec.signed {
        Some(false) => "unsigned ",
        Some(true) if spec.base == Some("char") => "signed ",
        _ => "",
    };

    let ty = match (spec.base, spec.longs) {
        (None, 0) if spec.signed.is_some() => TypeDescriptor::int(format!("{prefix}int"), 4, signed),
        (None, 0) => return Err("missing type".to_string()),
        (None | Some("int"), 1) => TypeDescriptor::int(format!("{prefix}long"), 8, signed),
        (None | Some("int"), 2) => TypeDescriptor::int(format!("{prefix}long long"), 8, signed),
        (Some("char"), 0) => TypeDescriptor::int(format!("{prefix}char"), 1, signed),
        (Some("short"), 0) => TypeDescriptor::int(format!("{prefix}short"), 2, signed),
        (Some("int"), 0) => TypeDescriptor::int(format!("{prefix}int"), 4, signed),
        (Some("bool"), 0) if spec.signed.is_none() => TypeDescriptor::new("bool", 1, TypeKind::Bool),
        (Some("float"), 0) if spec.signed.is_none() => TypeDescriptor::float("float", 4),
        (Some("double"), 0) if spec.signed.is_none() => TypeDescriptor::float("double", 8),
        (Some("double"), 1) if spec.signed.is_none() => TypeDescriptor::float("long double", 16),
        (Some(base), longs) => {
            return Err(format!("invalid combination: {prefix}{}{base}", "long ".repeat(usize::from(longs))));
        }
        (None, _) => return Err("too many 'long' specifiers".to_string()),
    };

    if !spec.complex {
        return Ok(ty);
    }
    match ty.kind {
        TypeKind::Float => Ok(TypeDescriptor::complex(format!("{} complex", ty.name), ty.byte_size * 2)),
        _ => Err("complex applies to float and double only".to_string()),
    }
}

/// `[4][4]` → `[4, 4]`, outermost first
fn parse_dims(mut rest: &str) -> std::result::Result<Vec<u64>, String>
{
    let mut extents = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(extents);
        }
        let Some(inner) = rest.strip_prefix('[') else {
            return Err(format!("unexpected '{rest}' after the dimensions"));
        };
        let Some(close) = inner.find(']') else {
            return Err("unterminated '['".to_string());
        };
        let text = inner[..close].trim();
        let extent = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16)
        } else {
            text.parse()
        }
        .map_err(|_| format!("invalid extent '{text}'"))?;
        extents.push(extent);
        rest = &inner[close + 1..];
    }
}

fn is_identifier(word: &str) -> bool
{
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::inference::{infer_layout, Inference};
    use crate::types::{ArrayLayout, DType, Shape};

    fn layout(decl: &str) -> Option<ArrayLayout>
    {
        infer_layout(&parse_c_type(decl).unwrap()).into_layout()
    }

    #[test]
    fn test_scalar_widths()
    {
        let cases = [
            ("char", 1),
            ("unsigned char", 1),
            ("short", 2),
            ("unsigned short int", 2),
            ("int", 4),
            ("unsigned", 4),
            ("long", 8),
            ("unsigned long long", 8),
            ("float", 4),
            ("double", 8),
            ("long double", 16),
            ("float complex", 8),
            ("double _Complex", 16),
            ("uint16_t", 2),
            ("size_t", 8),
        ];
        for (decl, size) in cases {
            assert_eq!(parse_c_type(decl).unwrap().byte_size, size, "{decl}");
        }
    }

    #[test]
    fn test_arrays_with_declarator()
    {
        assert_eq!(
            layout("const float grid[4][4]"),
            Some(ArrayLayout::new(Shape::new(&[4, 4]), DType::Float32))
        );
        assert_eq!(
            layout("unsigned short[8]"),
            Some(ArrayLayout::new(Shape::new(&[8]), DType::UInt16))
        );
        assert_eq!(
            layout("double complex [3]"),
            Some(ArrayLayout::new(Shape::new(&[3]), DType::Complex128))
        );
        assert_eq!(
            layout("int8_t[2][0x3]"),
            Some(ArrayLayout::new(Shape::new(&[2, 3]), DType::Int8))
        );
    }

    #[test]
    fn test_pointer_elements_are_not_numeric()
    {
        let ty = parse_c_type("int *[4]").unwrap();
        assert_eq!(ty.name, "int * [4]");
        assert_eq!(ty.byte_size, 32);
        assert!(matches!(infer_layout(&ty), Inference::Unsupported(_)));
    }

    #[test]
    fn test_rejects_bad_declarations()
    {
        for decl in [
            "",
            "struct Point[3]",
            "unsigned float",
            "int complex",
            "float[4",
            "float[x]",
            "float[2] junk",
            "widget[2]",
            "signed unsigned int",
            "float a b",
        ] {
            assert!(
                matches!(parse_c_type(decl), Err(MemplotError::InvalidTypeDecl { .. })),
                "{decl:?} should be rejected"
            );
        }
    }
}
