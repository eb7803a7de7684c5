//! # Error Types
//!
//! General error handling for the array dumper.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Note that an array whose element type has no numeric mapping is *not* an
//! error: inference reports it through [`crate::inference::Inference::Unsupported`]
//! and the dumper falls back to the host's default display.

use thiserror::Error;

use crate::types::{Address, DType};

/// Main error type for dumper operations
///
/// ## Error Categories
///
/// 1. **Memory errors**: MemoryRead, Unsupported
/// 2. **Reconstruction errors**: SizeMismatch, LayoutOverflow, Shape
/// 3. **Transform errors**: InvalidShape, Render, NpyWrite
/// 4. **Registry errors**: FormatIndexOutOfRange, DuplicateFormat, UnknownTag
/// 5. **Symbol errors**: Dwarf, Object, SymbolNotFound, InvalidTypeDecl
/// 6. **Configuration errors**: Config
/// 7. **I/O errors**: Io
#[derive(Error, Debug)]
pub enum MemplotError
{
    /// Copying bytes out of the inspected process failed
    ///
    /// This happens when:
    /// - The address range is not mapped in the target
    /// - The process exited or is not traceable by us
    /// - Fewer bytes than requested could be copied
    #[error("Failed to read {len} bytes at {address}: {reason}")]
    MemoryRead
    {
        /// Start of the requested range
        address: Address,
        /// Number of bytes requested
        len: usize,
        /// Details from the memory source
        reason: String,
    },

    /// The operation is not available on this platform
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The snapshot does not hold exactly `shape × width` bytes
    #[error("Snapshot holds {actual} bytes but a {dtype} array of shape {shape} needs {expected}")]
    SizeMismatch
    {
        /// Element type of the requested array
        dtype: DType,
        /// Rendered shape tuple, e.g. `(4, 4)`
        shape: String,
        /// Bytes required by the layout
        expected: usize,
        /// Bytes present in the snapshot
        actual: usize,
    },

    /// The layout spans more bytes than the address space holds
    ///
    /// Only reachable with an explicit shape; inferred shapes are bounded
    /// by the type's byte size.
    #[error("A {dtype} array of shape {shape} does not fit in memory")]
    LayoutOverflow
    {
        /// Element type of the requested array
        dtype: DType,
        /// Rendered shape tuple
        shape: String,
    },

    /// `ndarray` refused the requested shape
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// A transform received an array it cannot represent
    ///
    /// Examples:
    /// - `PPI` on a 1-D array
    /// - `Image` on a 3-D array
    #[error("{transform} cannot handle an array of shape {shape}")]
    InvalidShape
    {
        /// Name of the transform that rejected the array
        transform: String,
        /// Rendered shape tuple
        shape: String,
    },

    /// Drawing a figure through the plotting backend failed
    #[error("Render error: {0}")]
    Render(String),

    /// Writing an `.npy` file failed
    #[error("Failed to write npy file: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// The UI asked for a format index outside `1..=count`
    #[error("Format index {index} out of range for {tag} ({count} formats registered)")]
    FormatIndexOutOfRange
    {
        /// Tag of the registry that was queried
        tag: String,
        /// Requested 1-based index
        index: usize,
        /// Number of registered formats
        count: usize,
    },

    /// A format name was registered twice on the same tag
    #[error("Format {name} is already registered for {tag}")]
    DuplicateFormat
    {
        /// Tag of the registry
        tag: String,
        /// The offending format name
        name: String,
    },

    /// No registry is declared for the tag
    #[error("No format registry for tag {0}")]
    UnknownTag(String),

    /// Malformed or unsupported DWARF data
    #[error("DWARF error while {context}: {source}")]
    Dwarf
    {
        /// What we were doing when the error occurred
        context: String,
        /// The underlying gimli error
        source: gimli::Error,
    },

    /// The binary could not be parsed
    #[error("Object file error: {0}")]
    Object(#[from] object::Error),

    /// The requested variable has no static location in the binary
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// A C type declaration could not be parsed
    #[error("Invalid type declaration '{decl}': {reason}")]
    InvalidTypeDecl
    {
        /// The declaration as given
        decl: String,
        /// Why it was rejected
        reason: String,
    },

    /// The configuration file is malformed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error (snapshot files, artifacts, binaries)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MemplotError
{
    /// Wrap a gimli error with a description of the failing step.
    pub(crate) fn dwarf(context: &str, source: gimli::Error) -> Self
    {
        MemplotError::Dwarf {
            context: context.to_string(),
            source,
        }
    }
}

/// Convenience type alias for `Result<T, MemplotError>`
///
/// ```rust
/// use memplot_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, MemplotError>;
