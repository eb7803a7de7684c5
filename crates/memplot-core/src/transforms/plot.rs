//! Built-in plot transforms: `Image`, `PPI` and `Plot`.
//!
//! Each one draws into a figure it is handed, through `plotters`. Saving
//! the figure is the registry's job.

use std::f64::consts::TAU;
use std::ops::Range;

use ndarray::{Array2, ArrayD, Ix2};
use plotters::backend::BitMapBackend;
use plotters::chart::ChartBuilder;
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::element::{Circle, Polygon, Rectangle};
use plotters::series::LineSeries;
use plotters::style::{Color, TextStyle, BLACK};

use super::colormap::{heat, series_color, Normalize};
use super::figure::{render_error, Figure, Frame};
use super::fonts;
use crate::array::TypedArray;
use crate::config::{Interpolation, Origin, PlotOptions};
use crate::error::{MemplotError, Result};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Tick count per axis when labels are drawn
const TICKS: usize = 6;

/// Steps in the colorbar gradient
const COLORBAR_STEPS: usize = 128;

/// Heat map of a 2-D array (a 1-D array is shown as a single row)
///
/// Honours `origin` and `interpolation` from the options and adds a colorbar.
pub fn image(figure: &mut Figure, array: &TypedArray, options: &PlotOptions) -> Result<()>
{
    let data = as_2d(array.to_f64(), "Image", array)?;
    let (rows, cols) = data.dim();
    let norm = normalize(&data);
    let origin = options.origin;

    let main_width = figure.main_width();
    let frame = figure.frame(main_width, Some((cols as f64, rows as f64)));
    let plot_px = frame.plot_rect(0, main_width, figure.height());
    let style = label_style(figure);

    let root = figure.area()?;
    let (main, bar) = root.split_horizontally(main_width);

    let mut chart = frame
        .builder(&main)
        .build_cartesian_2d(0.0..cols as f64, 0.0..rows as f64)
        .map_err(render_error)?;

    // Row labels count downwards when row 0 is at the top.
    let row_label = |y: &f64| match origin {
        Origin::Lower => tick(*y),
        Origin::Upper => tick(rows as f64 - y),
    };
    let col_label = |x: &f64| tick(*x);
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    match &style {
        Some(style) => mesh
            .x_labels(TICKS)
            .y_labels(TICKS)
            .label_style(style.clone())
            .x_label_formatter(&col_label)
            .y_label_formatter(&row_label),
        None => mesh.x_labels(0).y_labels(0),
    };
    mesh.draw().map_err(render_error)?;

    // Bottom edge (in chart units) of the cells of data row `row`
    let row_y = |row: usize| match origin {
        Origin::Lower => row as f64,
        Origin::Upper => (rows - 1 - row) as f64,
    };

    match options.interpolation {
        Interpolation::Nearest => {
            let cells = (0..rows).flat_map(|row| (0..cols).map(move |col| (row, col)));
            chart
                .draw_series(cells.filter_map(|(row, col)| {
                    let color = norm.color(data[[row, col]])?;
                    let (x, y) = (col as f64, row_y(row));
                    Some(Rectangle::new([(x, y), (x + 1.0, y + 1.0)], color.filled()))
                }))
                .map_err(render_error)?;
        }
        Interpolation::Bilinear => {
            // Sub-cells of roughly one pixel each
            let sub_x = (plot_px.width() / cols as f64).ceil().clamp(1.0, 32.0) as usize;
            let sub_y = (plot_px.height() / rows as f64).ceil().clamp(1.0, 32.0) as usize;
            let (dx, dy) = (1.0 / sub_x as f64, 1.0 / sub_y as f64);
            let cells = (0..rows * sub_y).flat_map(|sy| (0..cols * sub_x).map(move |sx| (sy, sx)));
            chart
                .draw_series(cells.filter_map(|(sy, sx)| {
                    let (x, y) = (sx as f64 * dx, sy as f64 * dy);
                    let (xc, yc) = (x + dx / 2.0, y + dy / 2.0);
                    let row_f = match origin {
                        Origin::Lower => yc - 0.5,
                        Origin::Upper => rows as f64 - yc - 0.5,
                    };
                    let color = norm.color(bilinear(&data, row_f, xc - 0.5))?;
                    Some(Rectangle::new([(x, y), (x + dx, y + dy)], color.filled()))
                }))
                .map_err(render_error)?;
        }
    }
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.0, 0.0), (cols as f64, rows as f64)],
            BLACK.stroke_width(1),
        )))
        .map_err(render_error)?;

    draw_colorbar(&bar, &frame, norm, style.as_ref())?;
    root.present().map_err(render_error)?;
    Ok(())
}

/// Plan-position indicator of an `(azimuth, range)` array
///
/// Azimuth bins evenly cover a full turn clockwise from north; range bin
/// `r` covers the ring between radius `r` and `r + 1`.
pub fn ppi(figure: &mut Figure, array: &TypedArray, _options: &PlotOptions) -> Result<()>
{
    if array.ndim() != 2 {
        return Err(invalid_shape("PPI", array));
    }
    let data = as_2d(array.to_f64(), "PPI", array)?;
    let (naz, nrng) = data.dim();
    let norm = normalize(&data);
    let extent = nrng as f64;

    let main_width = figure.main_width();
    let frame = figure.frame(main_width, Some((1.0, 1.0)));
    let style = label_style(figure);

    let root = figure.area()?;
    let (main, bar) = root.split_horizontally(main_width);

    let mut chart = frame
        .builder(&main)
        .build_cartesian_2d(-extent..extent, -extent..extent)
        .map_err(render_error)?;
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    match &style {
        Some(style) => mesh.x_labels(TICKS).y_labels(TICKS).label_style(style.clone()),
        None => mesh.x_labels(0).y_labels(0),
    };
    mesh.draw().map_err(render_error)?;

    let bins = (0..naz).flat_map(|az| (0..nrng).map(move |rng| (az, rng)));
    chart
        .draw_series(bins.filter_map(|(az, rng)| {
            let color = norm.color(data[[az, rng]])?;
            Some(Polygon::new(sector(az, naz, rng), color.filled()))
        }))
        .map_err(render_error)?;
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(-extent, -extent), (extent, extent)],
            BLACK.stroke_width(1),
        )))
        .map_err(render_error)?;

    draw_colorbar(&bar, &frame, norm, style.as_ref())?;
    root.present().map_err(render_error)?;
    Ok(())
}

/// Line plot: a 1-D array is one series, each column of a 2-D array is one
pub fn plot(figure: &mut Figure, array: &TypedArray, _options: &PlotOptions) -> Result<()>
{
    let data = as_2d_columns(array.to_f64(), "Plot", array)?;
    let (rows, cols) = data.dim();

    let x_range = padded_range(0.0, (rows - 1) as f64);
    let y_range = match Normalize::from_values(data.iter()) {
        Some(Normalize { vmin, vmax }) => padded_range(vmin, vmax),
        None => -1.0..1.0,
    };

    let frame = figure.frame(figure.width(), None);
    let style = label_style(figure);
    let width = figure.points_to_pixels(1.5).round().max(1.0) as u32;

    let root = figure.area()?;
    let mut chart = frame
        .builder(&root)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(render_error)?;
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    match &style {
        Some(style) => mesh.x_labels(TICKS).y_labels(TICKS).label_style(style.clone()),
        None => mesh.x_labels(0).y_labels(0),
    };
    mesh.draw().map_err(render_error)?;

    for col in 0..cols {
        let color = series_color(col);
        for run in finite_runs(data.column(col).iter().copied()) {
            if let [(x, y)] = run.as_slice() {
                chart
                    .draw_series(std::iter::once(Circle::new((*x, *y), width, color.filled())))
                    .map_err(render_error)?;
            } else {
                chart
                    .draw_series(LineSeries::new(run, color.stroke_width(width)))
                    .map_err(render_error)?;
            }
        }
    }
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(x_range.start, y_range.start), (x_range.end, y_range.end)],
            BLACK.stroke_width(1),
        )))
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    Ok(())
}

fn invalid_shape(transform: &str, array: &TypedArray) -> MemplotError
{
    MemplotError::InvalidShape {
        transform: transform.to_string(),
        shape: array.shape_string(),
    }
}

/// View as `(rows, cols)`, promoting 1-D to a single row
fn as_2d(data: ArrayD<f64>, transform: &str, array: &TypedArray) -> Result<Array2<f64>>
{
    let data = match data.ndim() {
        1 => {
            let len = data.len();
            data.into_shape_with_order((1, len))?.into_dyn()
        }
        2 => data,
        _ => return Err(invalid_shape(transform, array)),
    };
    if data.is_empty() {
        return Err(invalid_shape(transform, array));
    }
    Ok(data.into_dimensionality::<Ix2>()?)
}

/// View as `(samples, series)`, promoting 1-D to a single column
fn as_2d_columns(data: ArrayD<f64>, transform: &str, array: &TypedArray) -> Result<Array2<f64>>
{
    let data = match data.ndim() {
        1 => {
            let len = data.len();
            data.into_shape_with_order((len, 1))?.into_dyn()
        }
        2 => data,
        _ => return Err(invalid_shape(transform, array)),
    };
    if data.is_empty() {
        return Err(invalid_shape(transform, array));
    }
    Ok(data.into_dimensionality::<Ix2>()?)
}

fn normalize(data: &Array2<f64>) -> Normalize
{
    Normalize::from_values(data.iter()).unwrap_or(Normalize { vmin: 0.0, vmax: 1.0 })
}

fn label_style(figure: &Figure) -> Option<TextStyle<'static>>
{
    fonts::labels_available().then(|| figure.label_style())
}

/// Tick text without trailing zeros
fn tick(value: f64) -> String
{
    let text = format!("{value:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn bilinear(data: &Array2<f64>, row: f64, col: f64) -> f64
{
    let (rows, cols) = data.dim();
    let row = row.clamp(0.0, (rows - 1) as f64);
    let col = col.clamp(0.0, (cols - 1) as f64);
    let (r0, c0) = (row.floor() as usize, col.floor() as usize);
    let (r1, c1) = ((r0 + 1).min(rows - 1), (c0 + 1).min(cols - 1));
    let (fr, fc) = (row - r0 as f64, col - c0 as f64);

    let top = data[[r0, c0]] * (1.0 - fc) + data[[r0, c1]] * fc;
    let bottom = data[[r1, c0]] * (1.0 - fc) + data[[r1, c1]] * fc;
    top * (1.0 - fr) + bottom * fr
}

/// Outline of one azimuth/range bin, azimuth clockwise from +y
fn sector(az: usize, naz: usize, rng: usize) -> Vec<(f64, f64)>
{
    let steps = (96 / naz).clamp(1, 16);
    let width = TAU / naz as f64;
    let start = az as f64 * width;
    let (inner, outer) = (rng as f64, rng as f64 + 1.0);
    let at = |angle: f64, radius: f64| (radius * angle.sin(), radius * angle.cos());

    let mut points = Vec::with_capacity(2 * steps + 2);
    for step in 0..=steps {
        points.push(at(start + width * step as f64 / steps as f64, outer));
    }
    for step in (0..=steps).rev() {
        points.push(at(start + width * step as f64 / steps as f64, inner));
    }
    points
}

/// Consecutive finite samples as `(index, value)` runs
fn finite_runs(values: impl Iterator<Item = f64>) -> Vec<Vec<(f64, f64)>>
{
    let mut runs = vec![Vec::new()];
    for (index, value) in values.enumerate() {
        if value.is_finite() {
            if let Some(run) = runs.last_mut() {
                run.push((index as f64, value));
            }
        } else if runs.last().is_some_and(|run| !run.is_empty()) {
            runs.push(Vec::new());
        }
    }
    runs.retain(|run| !run.is_empty());
    runs
}

/// Vertical gradient beside the main axes, from the lowest (bottom) to the highest value
fn draw_colorbar(area: &Area<'_>, frame: &Frame, norm: Normalize, style: Option<&TextStyle<'static>>) -> Result<()>
{
    let range = padded_range(norm.vmin, norm.vmax);
    let range = if norm.vmax > norm.vmin { norm.vmin..norm.vmax } else { range };
    let span = range.end - range.start;
    // Labels get at most half of the strip.
    let (width, _) = area.dim_in_pixel();
    let labels = match style {
        Some(_) => frame.y_labels.min(width.saturating_sub(frame.pad + 2) / 2),
        None => 0,
    };

    let mut chart = ChartBuilder::on(area)
        .margin_top(frame.top)
        .margin_bottom(frame.bottom + frame.x_labels)
        .margin_left(frame.pad)
        .margin_right(2)
        .right_y_label_area_size(labels)
        .build_cartesian_2d(0.0..1.0, range.clone())
        .map_err(render_error)?;
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh().x_labels(0);
    match style {
        Some(style) => mesh.y_labels(TICKS).label_style(style.clone()),
        None => mesh.y_labels(0),
    };
    mesh.draw().map_err(render_error)?;

    let step = span / COLORBAR_STEPS as f64;
    chart
        .draw_series((0..COLORBAR_STEPS).map(|i| {
            let y = range.start + step * i as f64;
            let color = heat((i as f64 + 0.5) / COLORBAR_STEPS as f64);
            Rectangle::new([(0.0, y), (1.0, y + step)], color.filled())
        }))
        .map_err(render_error)?;
    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.0, range.start), (1.0, range.end)],
            BLACK.stroke_width(1),
        )))
        .map_err(render_error)?;
    Ok(())
}

/// Range with a 5% margin on each side; flat ranges are widened
fn padded_range(lo: f64, hi: f64) -> Range<f64>
{
    let margin = if hi > lo {
        (hi - lo) * 0.05
    } else if lo == 0.0 {
        0.5
    } else {
        lo.abs() * 0.05
    };
    (lo - margin)..(hi + margin)
}

#[cfg(test)]
mod tests
{
    use plotters::style::RGBColor;

    use super::*;
    use crate::types::{ArrayLayout, DType, Shape};

    fn f64_array(dims: &[usize], values: &[f64]) -> TypedArray
    {
        let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
        TypedArray::from_bytes(&bytes, &ArrayLayout::new(Shape::new(dims), DType::Float64)).unwrap()
    }

    fn rgba(color: RGBColor) -> [u8; 4]
    {
        [color.0, color.1, color.2, 255]
    }

    /// Mean row of the pixels left of `max_x` that have exactly `color`
    fn mean_row(figure: &Figure, max_x: u32, color: RGBColor) -> Option<f64>
    {
        let target = rgba(color);
        let rows: Vec<u32> = (0..figure.height())
            .flat_map(|y| (0..max_x).map(move |x| (x, y)))
            .filter(|&(x, y)| figure.pixel(x, y) == Some(target))
            .map(|(_, y)| y)
            .collect();
        (!rows.is_empty()).then(|| rows.iter().map(|&y| f64::from(y)).sum::<f64>() / rows.len() as f64)
    }

    #[test]
    fn test_image_origin_flips_rows()
    {
        let array = f64_array(&[2, 1], &[0.0, 1.0]);

        let mut lower = Figure::new(200, 100);
        image(&mut lower, &array, &PlotOptions::default()).unwrap();
        let mut upper = Figure::new(200, 100);
        let options = PlotOptions {
            origin: Origin::Upper,
            ..PlotOptions::default()
        };
        image(&mut upper, &array, &options).unwrap();

        // With origin=lower the last row (value 1.0) sits above the first.
        let main = lower.main_width();
        let (low_hi, low_lo) = (mean_row(&lower, main, heat(1.0)), mean_row(&lower, main, heat(0.0)));
        assert!(low_hi.unwrap() < low_lo.unwrap());
        let (up_hi, up_lo) = (mean_row(&upper, main, heat(1.0)), mean_row(&upper, main, heat(0.0)));
        assert!(up_hi.unwrap() > up_lo.unwrap());
    }

    #[test]
    fn test_bilinear_image_blends_between_cells()
    {
        let array = f64_array(&[1, 2], &[0.0, 1.0]);
        let mut figure = Figure::new(200, 100);
        let options = PlotOptions {
            interpolation: Interpolation::Bilinear,
            ..PlotOptions::default()
        };
        image(&mut figure, &array, &options).unwrap();

        let main = figure.main_width();
        let frame = figure.frame(main, Some((2.0, 1.0)));
        let (cx, cy) = frame.plot_rect(0, main, figure.height()).centre();
        let centre = figure.pixel(cx as u32, cy as u32).unwrap();
        assert_ne!(centre, rgba(heat(0.0)));
        assert_ne!(centre, rgba(heat(1.0)));
        assert_ne!(centre, [255, 255, 255, 255]);
    }

    #[test]
    fn test_image_rejects_three_dimensions()
    {
        let array = f64_array(&[2, 2, 2], &[0.0; 8]);
        let mut figure = Figure::new(64, 100);
        assert!(matches!(
            image(&mut figure, &array, &PlotOptions::default()),
            Err(MemplotError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_ppi_requires_two_dimensions()
    {
        let array = f64_array(&[4], &[0.0; 4]);
        let mut figure = Figure::new(64, 100);
        assert!(matches!(
            ppi(&mut figure, &array, &PlotOptions::default()),
            Err(MemplotError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_ppi_azimuth_runs_clockwise_from_north()
    {
        let values: Vec<f64> = (0..32).map(f64::from).collect();
        let array = f64_array(&[8, 4], &values);
        let mut figure = Figure::new(256, 100);
        ppi(&mut figure, &array, &PlotOptions::default()).unwrap();

        let main = figure.main_width();
        let rect = figure.frame(main, Some((1.0, 1.0))).plot_rect(0, main, figure.height());
        let (cx, cy) = rect.centre();
        let ring = rect.width() / 8.0;
        let norm = Normalize { vmin: 0.0, vmax: 31.0 };

        // Just east of north is azimuth bin 0, just west of north is bin 7.
        let east = figure.pixel((cx + ring * 0.25) as u32, (cy - ring * 0.5) as u32);
        let west = figure.pixel((cx - ring * 0.25) as u32, (cy - ring * 0.5) as u32);
        assert_eq!(east, Some(rgba(heat(norm.apply(0.0)))));
        assert_eq!(west, Some(rgba(heat(norm.apply(28.0)))));

        let corner = figure.pixel((rect.x0 + 3.0) as u32, (rect.y0 + 3.0) as u32);
        assert_eq!(corner, Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_plot_draws_one_colour_per_column()
    {
        let array = f64_array(&[3, 2], &[0.0, 5.0, 1.0, 4.0, 2.0, 3.0]);
        let mut figure = Figure::new(128, 100);
        plot(&mut figure, &array, &PlotOptions::default()).unwrap();

        let colors: Vec<[u8; 4]> = (0..128)
            .flat_map(|y| (0..128).map(move |x| (x, y)))
            .filter_map(|(x, y)| figure.pixel(x, y))
            .collect();
        assert!(colors.contains(&rgba(series_color(0))));
        assert!(colors.contains(&rgba(series_color(1))));
        assert!(!colors.contains(&rgba(series_color(2))));
    }

    #[test]
    fn test_colorbar_runs_low_to_high_beside_wide_image()
    {
        let array = f64_array(&[1, 8], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let mut figure = Figure::new(256, 100);
        image(&mut figure, &array, &PlotOptions::default()).unwrap();

        let frame = figure.frame(figure.main_width(), Some((8.0, 1.0)));
        let x = figure.main_width() + frame.pad + 2;
        let top = figure.pixel(x, frame.top + 2).unwrap();
        let bottom = figure.pixel(x, figure.height() - frame.bottom - frame.x_labels - 3).unwrap();

        assert_ne!(top, [255, 255, 255, 255]);
        assert_ne!(bottom, [255, 255, 255, 255]);
        // The high end of the colormap is the bright one.
        let brightness = |px: [u8; 4]| u32::from(px[0]) + u32::from(px[1]);
        assert!(brightness(top) > brightness(bottom), "{top:?} {bottom:?}");
    }

    #[test]
    fn test_tick_labels_drawn_when_a_font_is_available()
    {
        if !fonts::labels_available() {
            return;
        }
        let array = f64_array(&[4, 4], &[0.0; 16]);
        let mut figure = Figure::new(256, 100);
        image(&mut figure, &array, &PlotOptions::default()).unwrap();

        let main = figure.main_width();
        let frame = figure.frame(main, Some((1.0, 1.0)));
        let rect = frame.plot_rect(0, main, figure.height());
        let inked = (rect.y0 as u32..rect.y1 as u32)
            .flat_map(|y| (frame.left..rect.x0 as u32 - 2).map(move |x| (x, y)))
            .any(|(x, y)| figure.pixel(x, y) != Some([255, 255, 255, 255]));
        assert!(inked);
    }

    #[test]
    fn test_finite_runs_split_on_gaps()
    {
        let runs = finite_runs([1.0, f64::NAN, 2.0, 3.0, f64::INFINITY].into_iter());
        assert_eq!(runs, vec![vec![(0.0, 1.0)], vec![(2.0, 2.0), (3.0, 3.0)]]);
    }

    #[test]
    fn test_sector_starts_at_north()
    {
        let points = sector(0, 4, 1);
        let (x, y) = points[0];
        assert!(x.abs() < 1e-9);
        assert!((y - 2.0).abs() < 1e-9);
        let (x, y) = points[points.len() / 2 - 1];
        assert!((x - 2.0).abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_padded_range_widens_flat_data()
    {
        assert_eq!(padded_range(0.0, 0.0), -0.5..0.5);
        assert_eq!(padded_range(0.0, 10.0), -0.5..10.5);
        assert_eq!(tick(2.50), "2.5");
        assert_eq!(tick(3.0), "3");
    }
}
