//! # Array Dumper
//!
//! Host-facing entry points that turn a C array value into a tree node with
//! its raw data, a rendered image and an exportable file.
//!
//! ```text
//! float [4][4]
//! ├── Data     host's default array display
//! ├── Image    debug::ImagePlot   (Image, PPI, Plot)
//! └── Export   debug::ArrayExport (Numpy, Raw, Text)
//! ```
//!
//! Every entry point runs under [`catch_errors`], so a failure in inference,
//! snapshotting, reconstruction or a transform is reported to the host and
//! never propagates into it.

use crate::array::TypedArray;
use crate::config::Config;
use crate::error::Result;
use crate::host::{catch_errors, DumperHost, SubItem};
use crate::inference::{infer_layout, is_plottable_target, Inference};
use crate::registry::{OutputArtifact, RegistryTable, TransformRequest, ARRAY_EXPORT_TAG, IMAGE_PLOT_TAG};
use crate::snapshot::MemorySnapshot;
use crate::types::{ArrayLayout, DType, DebugValue, Shape};

/// Category label used when reporting failures to the host
pub const ERROR_CATEGORY: &str = "array";

/// Explicit shape and/or dtype that win over inference
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutOverrides
{
    pub shape: Option<Shape>,
    pub dtype: Option<DType>,
}

impl LayoutOverrides
{
    /// Combine with an inference result; `None` if a piece is still missing
    pub fn resolve(&self, inferred: &Inference) -> Option<ArrayLayout>
    {
        let layout = inferred.layout();
        let shape = self.shape.clone().or_else(|| layout.map(|l| l.shape.clone()))?;
        let dtype = self.dtype.or_else(|| layout.map(|l| l.dtype))?;
        Some(ArrayLayout::new(shape, dtype))
    }
}

/// Builds array nodes for a host
#[derive(Debug, Clone)]
pub struct ArrayDumper<'t>
{
    table: &'t RegistryTable,
    request: TransformRequest,
    plot_tag: String,
    export_tag: Option<String>,
}

impl ArrayDumper<'static>
{
    /// Dumper over the built-in registries
    pub fn builtin(config: &Config) -> Self
    {
        ArrayDumper::new(RegistryTable::builtin(), config)
    }
}

impl<'t> ArrayDumper<'t>
{
    pub fn new(table: &'t RegistryTable, config: &Config) -> Self
    {
        ArrayDumper {
            table,
            request: TransformRequest::from_config(config),
            plot_tag: IMAGE_PLOT_TAG.to_string(),
            export_tag: Some(ARRAY_EXPORT_TAG.to_string()),
        }
    }

    /// Use another registry for the `Image` child
    pub fn with_plot_tag(mut self, tag: impl Into<String>) -> Self
    {
        self.plot_tag = tag.into();
        self
    }

    /// Use another registry for the `Export` child, or drop the child
    pub fn with_export_tag(mut self, tag: Option<String>) -> Self
    {
        self.export_tag = tag;
        self
    }

    pub fn plot_tag(&self) -> &str
    {
        &self.plot_tag
    }

    pub fn export_tag(&self) -> Option<&str>
    {
        self.export_tag.as_deref()
    }

    /// Dump a C-style array value
    ///
    /// Arrays whose target is not numeric (or another array) go straight to
    /// the host's default display. Everything else gets a `Data` child with
    /// the default display plus one child per configured registry.
    pub fn dump_c_style_array<H: DumperHost + ?Sized>(&self, host: &mut H, value: &DebugValue)
    {
        catch_errors(host, ERROR_CATEGORY, |host| {
            if !is_plottable_target(&value.ty) {
                tracing::debug!(name = %value.name, ty = %value.ty, "not plottable, using default display");
                return host.put_default_array(value);
            }

            host.put_type(&value.ty.name);
            host.put_value("");
            host.put_num_child(if self.export_tag.is_some() { 3 } else { 2 });
            if !host.is_expanded() {
                return Ok(());
            }

            {
                let mut item = SubItem::new(&mut *host, "Data");
                item.put_default_array(value)?;
            }
            {
                let mut item = SubItem::new(&mut *host, "Image");
                item.put_address(value.address);
                self.put_info(&mut *item, value, &self.plot_tag);
            }
            if let Some(tag) = &self.export_tag {
                let mut item = SubItem::new(&mut *host, "Export");
                item.put_address(value.address);
                self.put_info(&mut *item, value, tag);
            }
            Ok(())
        });
    }

    /// Fill the current node with the artifact of registry `tag`
    pub fn put_info<H: DumperHost + ?Sized>(&self, host: &mut H, value: &DebugValue, tag: &str)
    {
        catch_errors(host, ERROR_CATEGORY, |host| {
            host.put_value("");
            host.put_type(tag);
            host.put_num_child(0);
            self.plot_memory(host, value, tag, &LayoutOverrides::default())?;
            Ok(())
        });
    }

    /// Snapshot, rebuild and transform `value`, then display the artifact
    ///
    /// Returns `Ok(None)` when the value has no numeric array layout; nothing
    /// is read from memory in that case. The transform is the one at the
    /// host's current item format, or the first one.
    pub fn plot_memory<H: DumperHost + ?Sized>(
        &self,
        host: &mut H,
        value: &DebugValue,
        tag: &str,
        overrides: &LayoutOverrides,
    ) -> Result<Option<OutputArtifact>>
    {
        let registry = self.table.lookup(tag)?;
        let inferred = infer_layout(&value.ty);
        let Some(layout) = overrides.resolve(&inferred) else {
            if let Inference::Unsupported(reason) = &inferred {
                tracing::debug!(name = %value.name, %reason, "no array layout");
            }
            return Ok(None);
        };

        let format = host.current_item_format().unwrap_or(1);
        tracing::debug!(name = %value.name, %layout, tag, format, "array conversion");

        let snapshot = MemorySnapshot::capture(host.memory(), value.address, layout.byte_len()?, &self.request.output)?;
        let array = TypedArray::from_snapshot(&snapshot, &layout)?;
        let artifact = registry.select(format, &array, &self.request)?;

        tracing::info!(name = %value.name, path = %artifact.path().display(), "artifact ready");
        host.put_display(artifact.clone().into());
        Ok(Some(artifact))
    }
}
