//! Raster figure used by the plot transforms.
//!
//! A figure owns a square RGB buffer that plot transforms draw into
//! through a `plotters` bitmap backend, and dumps it as headerless RGBA.
//!
//! Every figure is split the same way: the main axes on the left and a
//! colorbar strip on the right. [`Figure::frame`] computes where the
//! plotting area of a chart ends up, so transforms and tests agree on the
//! geometry.

use std::io::Write;

use plotters::backend::BitMapBackend;
use plotters::chart::ChartBuilder;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle, WHITE};

use super::fonts;
use crate::error::{MemplotError, Result};

/// One RGBA pixel
pub type Rgba = [u8; 4];

/// Display code the host's raw image loader uses for 32-bit RGBA pixels
pub const RAW_IMAGE_FORMAT: u32 = 5;

/// Share of the figure width given to the main axes; the rest holds the colorbar
const MAIN_PERCENT: u32 = 85;

/// Axis-aligned rectangle in pixel space, y growing downwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect
{
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl PixelRect
{
    pub fn width(&self) -> f64
    {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64
    {
        self.y1 - self.y0
    }

    pub fn centre(&self) -> (f64, f64)
    {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Largest centred sub-rectangle with the data's aspect ratio
    pub fn fit_aspect(&self, data_width: f64, data_height: f64) -> PixelRect
    {
        if data_width <= 0.0 || data_height <= 0.0 {
            return *self;
        }
        let scale = (self.width() / data_width).min(self.height() / data_height);
        let (w, h) = (data_width * scale, data_height * scale);
        let x0 = self.x0 + (self.width() - w) / 2.0;
        let y0 = self.y0 + (self.height() - h) / 2.0;
        PixelRect {
            x0,
            y0,
            x1: x0 + w,
            y1: y0 + h,
        }
    }
}

/// Margins and label areas of one chart, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame
{
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
    /// Margin before aspect fitting
    pub pad: u32,
    /// Height of the x label area below the plot
    pub x_labels: u32,
    /// Width of the y label area beside the plot
    pub y_labels: u32,
}

impl Frame
{
    /// Plotting area inside a drawing area of `width × height` at `x_offset`
    pub fn plot_rect(&self, x_offset: u32, width: u32, height: u32) -> PixelRect
    {
        PixelRect {
            x0: f64::from(x_offset + self.left + self.y_labels),
            y0: f64::from(self.top),
            x1: f64::from((x_offset + width).saturating_sub(self.right)),
            y1: f64::from(height.saturating_sub(self.bottom + self.x_labels)),
        }
    }

    /// Chart builder on `area` with these margins and a left y label area
    pub fn builder<'a, 'b, 'c>(
        &self,
        area: &'a DrawingArea<BitMapBackend<'c>, Shift>,
    ) -> ChartBuilder<'a, 'b, BitMapBackend<'c>>
    {
        let mut builder = ChartBuilder::on(area);
        builder
            .margin_top(self.top)
            .margin_bottom(self.bottom)
            .margin_left(self.left)
            .margin_right(self.right)
            .x_label_area_size(self.x_labels)
            .y_label_area_size(self.y_labels);
        builder
    }
}

/// A square canvas with a white background
#[derive(Debug, Clone)]
pub struct Figure
{
    size: u32,
    dpi: u32,
    rgb: Vec<u8>,
}

impl Figure
{
    /// A white `size` × `size` figure
    pub fn new(size: u32, dpi: u32) -> Self
    {
        Figure {
            size,
            dpi,
            rgb: vec![255; size as usize * size as usize * 3],
        }
    }

    pub fn width(&self) -> u32
    {
        self.size
    }

    pub fn height(&self) -> u32
    {
        self.size
    }

    pub fn dpi(&self) -> u32
    {
        self.dpi
    }

    /// Width of the main axes area; the colorbar starts here
    pub fn main_width(&self) -> u32
    {
        self.size * MAIN_PERCENT / 100
    }

    /// Drawing area over the whole buffer, cleared to white
    pub fn area(&mut self) -> Result<DrawingArea<BitMapBackend<'_>, Shift>>
    {
        let root = BitMapBackend::with_buffer(&mut self.rgb, (self.size, self.size)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        Ok(root)
    }

    /// Pixels per typographic point
    pub fn points_to_pixels(&self, points: f64) -> f64
    {
        points * f64::from(self.dpi) / 72.0
    }

    /// Style for tick labels
    pub fn label_style(&self) -> TextStyle<'static>
    {
        FontDesc::new(FontFamily::Name(fonts::FAMILY), self.points_to_pixels(9.0), FontStyle::Normal).into()
    }

    /// Frame of a chart `width` pixels wide, optionally shrunk to a data aspect
    ///
    /// Label areas are only reserved when a label font is available.
    pub fn frame(&self, width: u32, aspect: Option<(f64, f64)>) -> Frame
    {
        let pad = (self.size / 40).max(2);
        let labels = if fonts::labels_available() {
            self.points_to_pixels(9.0 * 3.2).round() as u32
        } else {
            0
        };
        let mut frame = Frame {
            top: pad,
            bottom: pad,
            left: pad,
            right: pad,
            pad,
            x_labels: labels,
            y_labels: labels,
        };

        if let Some((data_width, data_height)) = aspect {
            let full = frame.plot_rect(0, width, self.size);
            let fitted = full.fit_aspect(data_width, data_height);
            let extra_x = ((full.width() - fitted.width()) / 2.0).max(0.0) as u32;
            let extra_y = ((full.height() - fitted.height()) / 2.0).max(0.0) as u32;
            frame.left += extra_x;
            frame.right += extra_x;
            frame.top += extra_y;
            frame.bottom += extra_y;
        }
        frame
    }

    /// RGBA of one pixel, `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba>
    {
        if x >= self.size || y >= self.size {
            return None;
        }
        let i = (y as usize * self.size as usize + x as usize) * 3;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2], 255])
    }

    /// Raw RGBA8888 bytes, row-major from the top-left corner
    pub fn to_rgba(&self) -> Vec<u8>
    {
        let mut out = Vec::with_capacity(self.rgb.len() / 3 * 4);
        for px in self.rgb.chunks_exact(3) {
            out.extend_from_slice(px);
            out.push(255);
        }
        out
    }

    /// Write the headerless RGBA bytes
    pub fn write_raw(&self, mut out: impl Write) -> Result<()>
    {
        out.write_all(&self.to_rgba())?;
        out.flush()?;
        Ok(())
    }
}

/// Wrap a drawing backend failure
pub(crate) fn render_error(err: impl std::fmt::Display) -> MemplotError
{
    MemplotError::Render(err.to_string())
}
