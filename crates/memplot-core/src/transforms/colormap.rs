//! Colour scales for heat maps and line series.

use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use plotters::style::{Palette, Palette99, RGBColor};

/// Viridis colour for a value already normalised to `[0, 1]`
pub fn heat(t: f64) -> RGBColor
{
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    ViridisRGB {}.get_color(t)
}

/// Colour of the `index`-th line series
pub fn series_color(index: usize) -> RGBColor
{
    let (r, g, b) = Palette99::COLORS[index % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}

/// Linear normalisation between the finite minimum and maximum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize
{
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize
{
    /// Range of the finite values, `None` if there are none
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<Self>
    {
        values
            .into_iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some(Normalize { vmin: v, vmax: v }),
                Some(Normalize { vmin, vmax }) => Some(Normalize {
                    vmin: vmin.min(v),
                    vmax: vmax.max(v),
                }),
            })
    }

    /// Map into `[0, 1]`; a flat range maps everything to 0
    pub fn apply(&self, value: f64) -> f64
    {
        let span = self.vmax - self.vmin;
        if span <= 0.0 {
            0.0
        } else {
            ((value - self.vmin) / span).clamp(0.0, 1.0)
        }
    }

    /// Colour of `value`; non-finite values get none
    pub fn color(&self, value: f64) -> Option<RGBColor>
    {
        value.is_finite().then(|| heat(self.apply(value)))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_heat_clamps_out_of_range()
    {
        assert_eq!(heat(-3.0), heat(0.0));
        assert_eq!(heat(f64::NAN), heat(0.0));
        assert_eq!(heat(7.0), heat(1.0));
        assert_ne!(heat(0.0), heat(1.0));
    }

    #[test]
    fn test_normalize_skips_non_finite()
    {
        let values = [f64::NAN, 2.0, f64::INFINITY, -2.0];
        let norm = Normalize::from_values(&values).unwrap();
        assert_eq!(norm, Normalize { vmin: -2.0, vmax: 2.0 });
        assert_eq!(norm.apply(0.0), 0.5);
        assert_eq!(norm.color(f64::NAN), None);
        assert!(Normalize::from_values(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_series_cycle_wraps()
    {
        let len = Palette99::COLORS.len();
        assert_eq!(series_color(0), series_color(len));
        assert_ne!(series_color(0), series_color(1));
    }
}
