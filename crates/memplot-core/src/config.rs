//! # Configuration
//!
//! Settings for snapshots and rendered figures, loaded from TOML.
//!
//! ```toml
//! [image]
//! size = 512
//! dpi = 100
//!
//! [snapshot]
//! temp_dir = "/tmp/memplot"
//! prefix = "memplot_"
//!
//! [plot]
//! origin = "lower"
//! interpolation = "nearest"
//! ```
//!
//! Every key is optional. `MEMPLOT_CONFIG` points [`Config::from_env`] at a
//! file; without it the defaults apply.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "MEMPLOT_CONFIG";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config
{
    pub image: ImageConfig,
    pub snapshot: SnapshotConfig,
    pub plot: PlotOptions,
}

/// Canvas geometry of rendered figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig
{
    /// Width and height in pixels
    pub size: u32,
    /// Dots per inch; scales stroke widths
    pub dpi: u32,
}

impl Default for ImageConfig
{
    fn default() -> Self
    {
        ImageConfig { size: 512, dpi: 100 }
    }
}

/// Where snapshot and artifact files are created
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig
{
    /// Directory for temp files; the OS temp dir when unset
    pub temp_dir: Option<PathBuf>,
    pub prefix: String,
}

impl Default for SnapshotConfig
{
    fn default() -> Self
    {
        SnapshotConfig {
            temp_dir: None,
            prefix: "memplot_".to_string(),
        }
    }
}

impl SnapshotConfig
{
    pub fn dir(&self) -> PathBuf
    {
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }
}

/// Which way row 0 of an image faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin
{
    /// Row 0 at the bottom
    #[default]
    Lower,
    /// Row 0 at the top
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation
{
    /// One flat block per element
    #[default]
    Nearest,
    Bilinear,
}

/// Options passed to plot transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotOptions
{
    pub origin: Origin,
    pub interpolation: Interpolation,
}

impl Config
{
    /// Parse a TOML document
    pub fn from_toml(source: &str) -> Result<Self>
    {
        Ok(toml::from_str(source)?)
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self>
    {
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&source)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load the file named by `MEMPLOT_CONFIG`, or fall back to defaults
    pub fn from_env() -> Result<Self>
    {
        match env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_defaults()
    {
        let config = Config::default();
        assert_eq!(config.image.size, 512);
        assert_eq!(config.image.dpi, 100);
        assert_eq!(config.snapshot.prefix, "memplot_");
        assert_eq!(config.plot.origin, Origin::Lower);
        assert_eq!(config.plot.interpolation, Interpolation::Nearest);
    }

    #[test]
    fn test_partial_document_keeps_defaults()
    {
        let config = Config::from_toml("[image]\nsize = 256\n\n[plot]\norigin = \"upper\"\n").unwrap();
        assert_eq!(config.image.size, 256);
        assert_eq!(config.image.dpi, 100);
        assert_eq!(config.plot.origin, Origin::Upper);
        assert_eq!(config.snapshot, SnapshotConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected()
    {
        assert!(Config::from_toml("[image]\ncolour = \"red\"\n").is_err());
        assert!(Config::from_toml("[plot]\ninterpolation = \"cubic\"\n").is_err());
    }
}
