//! Font used for tick labels.
//!
//! Figures are rasterised without a system font service, so a TrueType
//! file is registered with `plotters` on first use. `MEMPLOT_FONT` names
//! one explicitly; otherwise a few common install locations are tried.
//! Without any font the figures are still drawn, just without labels.

use std::env;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use plotters::style::{register_font, FontStyle};

/// Environment variable naming a `.ttf` file for tick labels
pub const FONT_ENV: &str = "MEMPLOT_FONT";

/// Family name the label font is registered under
pub const FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static LABEL_FONT: Lazy<Option<PathBuf>> = Lazy::new(register_label_font);

/// Whether tick labels can be drawn
pub fn labels_available() -> bool
{
    LABEL_FONT.is_some()
}

fn register_label_font() -> Option<PathBuf>
{
    let candidates = env::var_os(FONT_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = fs::read(&path) else {
            continue;
        };
        // plotters keeps a reference to the font data for the whole process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if register_font(FAMILY, FontStyle::Normal, bytes).is_ok() {
            tracing::debug!(path = %path.display(), "registered label font");
            return Some(path);
        }
        tracing::warn!(path = %path.display(), "not a usable TrueType font");
    }

    tracing::warn!("no label font found, figures are drawn without tick labels (set {FONT_ENV})");
    None
}
