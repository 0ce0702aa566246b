mod config;

use anyhow::{ensure, Context, Result};
use config::ChipConfig;
use geochip::{
    annotation, mask,
    pipeline::{ChipPipelineInit, ChipSource},
    raster::{self, FileChipSink},
};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
};
use structopt::StructOpt;

/// Prepare segmentation training data from raster imagery and annotations
#[derive(Debug, Clone, StructOpt)]
enum Opts {
    /// Rasterize an annotation export into binary mask rasters
    Rasterize {
        /// annotation export JSON file
        #[structopt(long)]
        annotations: PathBuf,
        /// output directory
        #[structopt(long)]
        output_dir: PathBuf,
        /// output raster extension
        #[structopt(long, default_value = "tif")]
        extension: String,
    },
    /// Cut image/label pairs into training chips
    Chip {
        /// configuration file
        #[structopt(long, default_value = "chip.json5")]
        config_file: PathBuf,
        /// override the images directory
        #[structopt(long)]
        images_dir: Option<PathBuf>,
        /// override the labels directory
        #[structopt(long)]
        labels_dir: Option<PathBuf>,
        /// override the output directory
        #[structopt(long)]
        output_dir: Option<PathBuf>,
        /// override the window step in pixels
        #[structopt(long)]
        step: Option<usize>,
        /// override the chip extent in pixels
        #[structopt(long)]
        window_size: Option<usize>,
        /// override the source band count
        #[structopt(long)]
        channels: Option<usize>,
        /// expand each chip into its 12 rotation/flip variants
        #[structopt(long)]
        augment: bool,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::from_args() {
        Opts::Rasterize {
            annotations,
            output_dir,
            extension,
        } => rasterize(annotations, output_dir, extension),
        Opts::Chip {
            config_file,
            images_dir,
            labels_dir,
            output_dir,
            step,
            window_size,
            channels,
            augment,
        } => {
            let mut config = ChipConfig::open(&config_file).with_context(|| {
                format!("failed to load config file '{}'", config_file.display())
            })?;
            if let Some(images_dir) = images_dir {
                config.images_dir = images_dir;
            }
            if let Some(labels_dir) = labels_dir {
                config.labels_dir = labels_dir;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            if let Some(step) = step {
                config.step = step;
            }
            if let Some(window_size) = window_size {
                config.window_size = window_size;
            }
            if let Some(channels) = channels {
                config.channels = channels;
            }
            config.augment |= augment;
            chip(config)
        }
    }
}

fn rasterize(annotations: PathBuf, output_dir: PathBuf, extension: String) -> Result<()> {
    let sets = annotation::open_export(&annotations)?;
    let masks = mask::rasterize_all(&sets)?;

    fs::create_dir_all(&output_dir)?;
    for (index, mask) in masks.iter().enumerate() {
        let path = output_dir.join(format!("mask_{index}.{extension}"));
        raster::save_mask(&mask.view(), &path)?;
    }
    info!("wrote {} masks to '{}'", masks.len(), output_dir.display());
    Ok(())
}

fn chip(config: ChipConfig) -> Result<()> {
    let images = list_sorted(&config.images_dir)?;
    let labels = list_sorted(&config.labels_dir)?;
    ensure!(
        images.len() == labels.len(),
        "'{}' has {} files but '{}' has {}",
        config.images_dir.display(),
        images.len(),
        config.labels_dir.display(),
        labels.len()
    );

    let sources: Vec<_> = images
        .iter()
        .zip(&labels)
        .map(|(image_path, label_path)| {
            let name = image_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            ChipSource {
                name,
                image_path: image_path.clone(),
                label_path: label_path.clone(),
            }
        })
        .collect();

    fs::create_dir_all(&config.output_dir)?;
    let pipeline = ChipPipelineInit {
        step: (config.step, config.step),
        window_size: (config.window_size, config.window_size),
        channels: config.channels,
        augment: config.augment,
    }
    .build()?;
    let mut sink = FileChipSink::new(&config.output_dir, config.extension.as_str());
    pipeline.run(&sources, &mut sink)?;
    Ok(())
}

/// Files of a directory in sorted order, so image/label pairing is stable.
fn list_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", dir.display());
    let mut files = glob::glob(&pattern)?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to list '{}'", dir.display()))?;
    files.sort();
    Ok(files)
}
