//! Terminal implementation of [`DumperHost`].
//!
//! The node tree built by the dumper is collected as indented lines, which
//! `main` prints once the dumper returns.

use memplot_core::array::TypedArray;
use memplot_core::error::{MemplotError, Result};
use memplot_core::host::{Display, DumperHost};
use memplot_core::inference::infer_layout;
use memplot_core::memory::MemorySource;
use memplot_core::types::{Address, DebugValue};

/// Values shown by the default array display before eliding the rest
const PREVIEW_LEN: usize = 8;

pub struct ConsoleHost
{
    memory: Box<dyn MemorySource>,
    expanded: bool,
    format: Option<usize>,
    depth: usize,
    lines: Vec<String>,
    failures: usize,
}

impl ConsoleHost
{
    pub fn new(memory: Box<dyn MemorySource>, expanded: bool, format: Option<usize>) -> Self
    {
        ConsoleHost {
            memory,
            expanded,
            format,
            depth: 0,
            lines: Vec::new(),
            failures: 0,
        }
    }

    /// Start the output with the value's own header line
    pub fn put_header(&mut self, value: &DebugValue)
    {
        self.line(format!("{} @ {}", value.name, value.address));
        self.depth = 1;
    }

    pub fn lines(&self) -> &[String]
    {
        &self.lines
    }

    /// Number of errors passed to `show_exception`
    pub fn failures(&self) -> usize
    {
        self.failures
    }

    fn line(&mut self, text: String)
    {
        self.lines.push(format!("{}{text}", "  ".repeat(self.depth)));
    }
}

impl DumperHost for ConsoleHost
{
    fn memory(&self) -> &dyn MemorySource
    {
        self.memory.as_ref()
    }

    fn put_type(&mut self, ty: &str)
    {
        self.line(format!("type: {ty}"));
    }

    fn put_value(&mut self, value: &str)
    {
        if !value.is_empty() {
            self.line(format!("value: {value}"));
        }
    }

    fn put_num_child(&mut self, count: usize)
    {
        if count > 0 && !self.expanded {
            self.line(format!("children: {count} (use --expand)"));
        }
    }

    fn put_address(&mut self, address: Address)
    {
        self.line(format!("address: {address}"));
    }

    fn is_expanded(&self) -> bool
    {
        self.expanded
    }

    fn begin_sub_item(&mut self, name: &str)
    {
        self.line(format!("{name}:"));
        self.depth += 1;
    }

    fn end_sub_item(&mut self)
    {
        self.depth = self.depth.saturating_sub(1);
    }

    fn current_item_format(&self) -> Option<usize>
    {
        self.format
    }

    fn put_display(&mut self, display: Display)
    {
        match display {
            Display::ImageFile {
                width,
                height,
                format,
                path,
            } => self.line(format!("image: {width}x{height} (format {format}) {}", path.display())),
            Display::File { path } => self.line(format!("file: {}", path.display())),
        }
    }

    fn show_exception(&mut self, category: &str, error: &MemplotError)
    {
        self.failures += 1;
        self.line(format!("error ({category}): {error}"));
    }

    fn put_default_array(&mut self, value: &DebugValue) -> Result<()>
    {
        let Some(layout) = infer_layout(&value.ty).into_layout() else {
            self.line(format!("type: {}", value.ty));
            self.line(format!("value: <{} bytes>", value.ty.byte_size));
            return Ok(());
        };

        let bytes = self.memory.read_memory(value.address, layout.byte_len()?)?;
        let values = TypedArray::from_bytes(&bytes, &layout)?.to_text_values();
        let shown = values.iter().take(PREVIEW_LEN).cloned().collect::<Vec<_>>().join(", ");
        let preview = if values.len() > PREVIEW_LEN {
            format!("[{shown}, ... {} more]", values.len() - PREVIEW_LEN)
        } else {
            format!("[{shown}]")
        };
        self.line(format!("value: {preview}"));
        Ok(())
    }
}
