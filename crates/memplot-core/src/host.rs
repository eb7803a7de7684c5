//! # Dumper Host
//!
//! The interface a debugger front end offers to the array dumper.
//!
//! A host owns the UI tree being built for the value under inspection and
//! the connection to the inspected process. The dumper only ever talks to
//! it through this trait, so the same pipeline runs inside a debugger
//! plugin, in the `memplot` command-line tool, or against a recording host
//! in tests.
//!
//! ## Tree model
//!
//! Calls describe the current node (`put_type`, `put_value`,
//! `put_num_child`, `put_display`). Children are opened with
//! [`SubItem`], which closes the node again when dropped.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use crate::error::{MemplotError, Result};
use crate::memory::MemorySource;
use crate::registry::OutputArtifact;
use crate::types::{Address, DebugValue};

/// How the host should present an artifact in the current node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Display
{
    /// A headerless raster image
    ImageFile
    {
        width: u32,
        height: u32,
        format: u32,
        path: PathBuf,
    },
    /// A file the user can open or save elsewhere
    File
    {
        path: PathBuf,
    },
}

impl From<OutputArtifact> for Display
{
    fn from(artifact: OutputArtifact) -> Self
    {
        match artifact {
            OutputArtifact::Image {
                path,
                width,
                height,
                pixel_format,
            } => Display::ImageFile {
                width,
                height,
                format: pixel_format,
                path,
            },
            OutputArtifact::File { path, .. } => Display::File { path },
        }
    }
}

/// Debugger-side services used by the dumper
pub trait DumperHost
{
    /// Memory of the inspected process
    fn memory(&self) -> &dyn MemorySource;

    /// Type string shown for the current node
    fn put_type(&mut self, ty: &str);

    /// Value string shown for the current node
    fn put_value(&mut self, value: &str);

    /// Number of children the current node will have
    fn put_num_child(&mut self, count: usize);

    fn put_address(&mut self, address: Address);

    /// Whether the user expanded the current node
    fn is_expanded(&self) -> bool;

    /// Open a named child of the current node
    fn begin_sub_item(&mut self, name: &str);

    /// Close the child opened last
    fn end_sub_item(&mut self);

    /// 1-based format the user picked for the current node, if any
    fn current_item_format(&self) -> Option<usize>;

    fn put_display(&mut self, display: Display);

    /// Report a failure to the user under a category label
    fn show_exception(&mut self, category: &str, error: &MemplotError);

    /// The host's own rendering of an array value
    fn put_default_array(&mut self, value: &DebugValue) -> Result<()>;
}

/// A child node that is closed when the guard is dropped
///
/// ```rust,ignore
/// let mut item = SubItem::new(host, "Data");
/// item.put_value("...");
/// // `end_sub_item` runs here
/// ```
pub struct SubItem<'h, H: DumperHost + ?Sized>
{
    host: &'h mut H,
}

impl<'h, H: DumperHost + ?Sized> SubItem<'h, H>
{
    pub fn new(host: &'h mut H, name: &str) -> Self
    {
        host.begin_sub_item(name);
        SubItem { host }
    }
}

impl<H: DumperHost + ?Sized> Deref for SubItem<'_, H>
{
    type Target = H;

    fn deref(&self) -> &Self::Target
    {
        self.host
    }
}

impl<H: DumperHost + ?Sized> DerefMut for SubItem<'_, H>
{
    fn deref_mut(&mut self) -> &mut Self::Target
    {
        self.host
    }
}

impl<H: DumperHost + ?Sized> Drop for SubItem<'_, H>
{
    fn drop(&mut self)
    {
        self.host.end_sub_item();
    }
}

/// Run `body`, routing any error to the host instead of the caller
///
/// The error is logged, shown under `category`, and turned into `None`, so
/// a failing dumper leaves the node empty rather than breaking the
/// inspector.
pub fn catch_errors<H, T>(host: &mut H, category: &str, body: impl FnOnce(&mut H) -> Result<T>) -> Option<T>
where
    H: DumperHost + ?Sized,
{
    match body(host) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::error!(category, error = %err, "dumper failed");
            host.show_exception(category, &err);
            None
        }
    }
}
