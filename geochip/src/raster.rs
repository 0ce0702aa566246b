//! Raster file loading and chip persistence.
//!
//! Loading signals an unreadable file with `None` instead of an error, so
//! the pipeline can skip the pair and keep going. Persistence follows the
//! `{dir}{name}_{x}_{y}_{variant}_mosaic.<ext>` / `..._labels.<ext>` naming
//! scheme.

use crate::{common::*, pipeline::ChipSink};
use image::{
    imageops::FilterType, DynamicImage, GenericImageView as _, GrayImage, Luma, Rgb, RgbImage,
    Rgba, RgbaImage,
};

/// Load a raster file into a `(rows, cols, bands)` array.
///
/// Returns `None` when the file is missing or cannot be decoded; callers
/// must check the sentinel. With `resize_to = Some((rows, cols))` every band
/// is resampled to that shape with a smoothing filter before stacking.
pub fn load(path: impl AsRef<Path>, resize_to: Option<(usize, usize)>) -> Option<Array3<f32>> {
    let img = image::open(path.as_ref()).ok()?;
    let img = match resize_to {
        Some((rows, cols)) => img.resize_exact(cols as u32, rows as u32, FilterType::CatmullRom),
        None => img,
    };

    let rows = img.height() as usize;
    let cols = img.width() as usize;
    let array = match img {
        DynamicImage::ImageLuma8(buf) => Array3::from_shape_fn((rows, cols, 1), |(r, c, _)| {
            buf.get_pixel(c as u32, r as u32)[0] as f32
        }),
        DynamicImage::ImageLuma16(buf) => Array3::from_shape_fn((rows, cols, 1), |(r, c, _)| {
            buf.get_pixel(c as u32, r as u32)[0] as f32
        }),
        DynamicImage::ImageRgb8(buf) => Array3::from_shape_fn((rows, cols, 3), |(r, c, b)| {
            buf.get_pixel(c as u32, r as u32)[b] as f32
        }),
        DynamicImage::ImageRgba8(buf) => Array3::from_shape_fn((rows, cols, 4), |(r, c, b)| {
            buf.get_pixel(c as u32, r as u32)[b] as f32
        }),
        other => {
            let buf = other.to_rgba8();
            Array3::from_shape_fn((rows, cols, 4), |(r, c, b)| {
                buf.get_pixel(c as u32, r as u32)[b] as f32
            })
        }
    };
    Some(array)
}

/// Write a binary {0, 1} mask as a {0, 255} single-band raster.
pub fn save_mask(mask: &ArrayView2<u8>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let (rows, cols) = mask.dim();
    let buf = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        Luma([if mask[(y as usize, x as usize)] > 0 { 255 } else { 0 }])
    });
    buf.save(path)
        .with_context(|| format!("failed to write mask '{}'", path.display()))?;
    Ok(())
}

/// File-backed chip persistence.
#[derive(Debug, Clone)]
pub struct FileChipSink {
    dir: PathBuf,
    extension: String,
}

impl FileChipSink {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    fn chip_path(&self, name: &str, x: usize, y: usize, variant: usize, kind: &str) -> PathBuf {
        self.dir
            .join(format!("{name}_{x}_{y}_{variant}_{kind}.{}", self.extension))
    }
}

impl ChipSink for FileChipSink {
    fn write_image(
        &mut self,
        data: &Array3<f32>,
        name: &str,
        x: usize,
        y: usize,
        variant: usize,
    ) -> Result<()> {
        let path = self.chip_path(name, x, y, variant, "mosaic");
        let (rows, cols, bands) = data.dim();
        let result = match bands {
            1 => GrayImage::from_fn(cols as u32, rows as u32, |px, py| {
                Luma([to_u8(data[(py as usize, px as usize, 0)])])
            })
            .save(&path),
            3 => RgbImage::from_fn(cols as u32, rows as u32, |px, py| {
                let at = |b| to_u8(data[(py as usize, px as usize, b)]);
                Rgb([at(0), at(1), at(2)])
            })
            .save(&path),
            4 => RgbaImage::from_fn(cols as u32, rows as u32, |px, py| {
                let at = |b| to_u8(data[(py as usize, px as usize, b)]);
                Rgba([at(0), at(1), at(2), at(3)])
            })
            .save(&path),
            _ => bail!("cannot encode a {}-band image chip", bands),
        };
        result.with_context(|| format!("failed to write image chip '{}'", path.display()))?;
        Ok(())
    }

    fn write_label(
        &mut self,
        data: &Array3<f32>,
        name: &str,
        x: usize,
        y: usize,
        variant: usize,
    ) -> Result<()> {
        let path = self.chip_path(name, x, y, variant, "labels");
        let (rows, cols, bands) = data.dim();
        ensure!(bands == 1, "label chip must have exactly one band");
        GrayImage::from_fn(cols as u32, rows as u32, |px, py| {
            Luma([to_u8(data[(py as usize, px as usize, 0)])])
        })
        .save(&path)
        .with_context(|| format!("failed to write label chip '{}'", path.display()))?;
        Ok(())
    }
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
