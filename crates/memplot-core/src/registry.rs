//! # Format Registry
//!
//! Ordered, named output transforms grouped under a type tag that the host
//! shows in its format picker.
//!
//! The host lists a registry's formats as a comma-joined string and later
//! reports the user's choice as a 1-based index. Registries are built once
//! and only read afterwards; [`RegistryTable::builtin`] holds the two that
//! ship with the crate.
//!
//! ## Example
//!
//! ```rust
//! use memplot_core::registry::{RegistryTable, ARRAY_EXPORT_TAG, IMAGE_PLOT_TAG};
//!
//! let table = RegistryTable::builtin();
//! assert_eq!(table.formats_for(IMAGE_PLOT_TAG)?, "Image,PPI,Plot");
//! assert_eq!(table.formats_for(ARRAY_EXPORT_TAG)?, "Numpy,Raw,Text");
//! # Ok::<(), memplot_core::error::MemplotError>(())
//! ```

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

use crate::array::TypedArray;
use crate::config::{Config, ImageConfig, PlotOptions, SnapshotConfig};
use crate::error::{MemplotError, Result};
use crate::snapshot::new_temp;
use crate::transforms::{export, plot, Figure, RAW_IMAGE_FORMAT};

/// Tag of the built-in plot registry
pub const IMAGE_PLOT_TAG: &str = "debug::ImagePlot";

/// Tag of the built-in file export registry
pub const ARRAY_EXPORT_TAG: &str = "debug::ArrayExport";

/// Draws an array into a figure
pub type PlotFn = fn(&mut Figure, &TypedArray, &PlotOptions) -> Result<()>;

/// Serialises an array
pub type ExportFn = fn(&TypedArray, &mut dyn Write) -> Result<()>;

/// A registered output transform
#[derive(Clone, Copy)]
pub enum Transform
{
    /// Rendered into a fresh figure saved as raw RGBA
    Plot(PlotFn),
    /// Written into a fresh file with the given extension
    Export
    {
        extension: &'static str,
        write: ExportFn,
    },
}

impl fmt::Debug for Transform
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Transform::Plot(_) => f.write_str("Transform::Plot"),
            Transform::Export { extension, .. } => write!(f, "Transform::Export({extension})"),
        }
    }
}

/// Everything a transform invocation needs besides the array
#[derive(Debug, Clone)]
pub struct TransformRequest
{
    pub image: ImageConfig,
    pub plot: PlotOptions,
    pub output: SnapshotConfig,
}

impl TransformRequest
{
    pub fn from_config(config: &Config) -> Self
    {
        TransformRequest {
            image: config.image,
            plot: config.plot,
            output: config.snapshot.clone(),
        }
    }
}

impl Default for TransformRequest
{
    fn default() -> Self
    {
        Self::from_config(&Config::default())
    }
}

/// What one transform produced, referenced by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputArtifact
{
    /// Headerless raster, `width × height` pixels in `pixel_format`
    Image
    {
        path: PathBuf,
        width: u32,
        height: u32,
        pixel_format: u32,
    },
    /// Serialised array
    File
    {
        path: PathBuf,
        format: String,
    },
}

impl OutputArtifact
{
    pub fn path(&self) -> &Path
    {
        match self {
            OutputArtifact::Image { path, .. } | OutputArtifact::File { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry
{
    name: String,
    transform: Transform,
}

/// Named transforms under one tag, addressed by 1-based index
#[derive(Debug, Clone)]
pub struct FormatRegistry
{
    tag: String,
    entries: Vec<Entry>,
}

impl FormatRegistry
{
    pub fn new(tag: impl Into<String>) -> Self
    {
        FormatRegistry {
            tag: tag.into(),
            entries: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str
    {
        &self.tag
    }

    /// Append a transform
    ///
    /// ## Errors
    ///
    /// - `DuplicateFormat` if `name` is already registered here
    pub fn register(&mut self, name: impl Into<String>, transform: Transform) -> Result<()>
    {
        let name = name.into();
        if self.entries.iter().any(|entry| entry.name == name) {
            return Err(MemplotError::DuplicateFormat {
                tag: self.tag.clone(),
                name,
            });
        }
        self.entries.push(Entry { name, transform });
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, transform: Transform) -> Result<Self>
    {
        self.register(name, transform)?;
        Ok(self)
    }

    /// Comma-joined names in registration order, as the host expects
    pub fn formats(&self) -> String
    {
        self.entries
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn names(&self) -> impl Iterator<Item = &str>
    {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    /// Name and transform at a 1-based index
    ///
    /// ## Errors
    ///
    /// - `FormatIndexOutOfRange` for 0 or anything past the last entry
    pub fn get(&self, index: usize) -> Result<(&str, Transform)>
    {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|entry| (entry.name.as_str(), entry.transform))
            .ok_or_else(|| MemplotError::FormatIndexOutOfRange {
                tag: self.tag.clone(),
                index,
                count: self.entries.len(),
            })
    }

    /// Run the transform at `index` on `array`
    ///
    /// Plot transforms get a fresh figure sized from the request, saved as
    /// raw RGBA to a new temp file. Export transforms get a new temp file.
    pub fn select(&self, index: usize, array: &TypedArray, request: &TransformRequest) -> Result<OutputArtifact>
    {
        let (name, transform) = self.get(index)?;
        tracing::debug!(tag = %self.tag, index, format = name, dtype = %array.dtype(), "running transform");

        match transform {
            Transform::Plot(draw) => {
                let mut figure = Figure::new(request.image.size, request.image.dpi);
                draw(&mut figure, array, &request.plot)?;

                let (file, path) = new_temp(&request.output, ".rgba")?;
                figure.write_raw(BufWriter::new(file))?;
                Ok(OutputArtifact::Image {
                    path,
                    width: figure.width(),
                    height: figure.height(),
                    pixel_format: RAW_IMAGE_FORMAT,
                })
            }
            Transform::Export { extension, write } => {
                let (file, path) = new_temp(&request.output, extension)?;
                let mut out = BufWriter::new(file);
                write(array, &mut out)?;
                out.flush()?;
                Ok(OutputArtifact::File {
                    path,
                    format: name.to_string(),
                })
            }
        }
    }
}

/// Tag → registry lookup table
#[derive(Debug, Clone, Default)]
pub struct RegistryTable
{
    registries: Vec<FormatRegistry>,
}

static BUILTIN: Lazy<RegistryTable> = Lazy::new(RegistryTable::with_builtins);

impl RegistryTable
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// The shared table with the built-in plot and export registries
    pub fn builtin() -> &'static RegistryTable
    {
        &BUILTIN
    }

    fn with_builtins() -> Self
    {
        let entry = |name: &str, transform| Entry {
            name: name.to_string(),
            transform,
        };

        let plots = FormatRegistry {
            tag: IMAGE_PLOT_TAG.to_string(),
            entries: vec![
                entry("Image", Transform::Plot(plot::image)),
                entry("PPI", Transform::Plot(plot::ppi)),
                entry("Plot", Transform::Plot(plot::plot)),
            ],
        };
        let exports = FormatRegistry {
            tag: ARRAY_EXPORT_TAG.to_string(),
            entries: vec![
                entry(
                    "Numpy",
                    Transform::Export {
                        extension: ".npy",
                        write: export::numpy,
                    },
                ),
                entry(
                    "Raw",
                    Transform::Export {
                        extension: ".bin",
                        write: export::raw,
                    },
                ),
                entry(
                    "Text",
                    Transform::Export {
                        extension: ".txt",
                        write: export::text,
                    },
                ),
            ],
        };

        RegistryTable {
            registries: vec![plots, exports],
        }
    }

    /// Add a registry under its own tag
    ///
    /// ## Errors
    ///
    /// - `DuplicateFormat` if the tag is already declared (the name field
    ///   carries the tag)
    pub fn insert(&mut self, registry: FormatRegistry) -> Result<()>
    {
        if self.registries.iter().any(|existing| existing.tag == registry.tag) {
            return Err(MemplotError::DuplicateFormat {
                tag: registry.tag.clone(),
                name: registry.tag,
            });
        }
        self.registries.push(registry);
        Ok(())
    }

    pub fn lookup(&self, tag: &str) -> Result<&FormatRegistry>
    {
        self.registries
            .iter()
            .find(|registry| registry.tag == tag)
            .ok_or_else(|| MemplotError::UnknownTag(tag.to_string()))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str>
    {
        self.registries.iter().map(|registry| registry.tag.as_str())
    }

    pub fn formats_for(&self, tag: &str) -> Result<String>
    {
        Ok(self.lookup(tag)?.formats())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatRegistry>
    {
        self.registries.iter()
    }
}
