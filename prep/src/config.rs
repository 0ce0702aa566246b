//! Chip generation configuration format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// The chip generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChipConfig {
    /// Directory holding the source rasters.
    pub images_dir: PathBuf,
    /// Directory holding the matching label rasters.
    pub labels_dir: PathBuf,
    /// Directory receiving the generated chips.
    pub output_dir: PathBuf,
    /// Window origin advance in pixels, both axes.
    #[serde(default = "default_step")]
    pub step: usize,
    /// Chip extent in pixels, both axes.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Band count of the source imagery.
    #[serde(default = "default_channels")]
    pub channels: usize,
    /// Expand each chip into its 12 rotation/flip variants.
    #[serde(default)]
    pub augment: bool,
    /// Output raster extension.
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl ChipConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config = json5::from_str(&text)?;
        Ok(config)
    }
}

fn default_step() -> usize {
    256
}

fn default_window_size() -> usize {
    512
}

fn default_channels() -> usize {
    4
}

fn default_extension() -> String {
    "tif".into()
}
