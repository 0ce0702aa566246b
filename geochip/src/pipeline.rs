//! Chip generation orchestration.
//!
//! For every image/label file pair the pipeline stacks both rasters along
//! the band axis, walks the combined array with a sliding window, drops
//! label-empty windows, expands the survivors through the augmenter, and
//! hands every variant to the persistence sink. Per-pair load failures skip
//! the pair with a warning; sink errors are fatal to the run.

use crate::{
    common::*,
    processor::{chip_is_empty, Augmenter, AugmenterInit, SlidingWindow, SlidingWindowInit},
    raster,
};

/// Persistence seam for generated chips.
pub trait ChipSink {
    fn write_image(
        &mut self,
        data: &Array3<f32>,
        name: &str,
        x: usize,
        y: usize,
        variant: usize,
    ) -> Result<()>;

    fn write_label(
        &mut self,
        data: &Array3<f32>,
        name: &str,
        x: usize,
        y: usize,
        variant: usize,
    ) -> Result<()>;
}

/// One image/label file pair fed to the pipeline.
#[derive(Debug, Clone)]
pub struct ChipSource {
    /// Stem used for output naming.
    pub name: String,
    pub image_path: PathBuf,
    pub label_path: PathBuf,
}

/// Totals reported by a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChipCounts {
    /// Non-empty chips, counted once regardless of augmentation.
    pub raw_chips: usize,
    /// Persisted (image, label) pairs, one per augmented variant.
    pub total_variants: usize,
}

/// Pipeline initializer.
#[derive(Debug, Clone)]
pub struct ChipPipelineInit {
    /// Window origin advance in (rows, cols).
    pub step: (usize, usize),
    /// Chip extent in (rows, cols).
    pub window_size: (usize, usize),
    /// Expected band count of the source imagery.
    pub channels: usize,
    /// Expand each chip into its 12 rotation/flip variants.
    pub augment: bool,
}

impl Default for ChipPipelineInit {
    fn default() -> Self {
        Self {
            step: (256, 256),
            window_size: (512, 512),
            channels: 4,
            augment: false,
        }
    }
}

impl ChipPipelineInit {
    pub fn build(self) -> Result<ChipPipeline> {
        let Self {
            step,
            window_size,
            channels,
            augment,
        } = self;
        ensure!(channels > 0, "channels must be positive");
        let window = SlidingWindowInit { step, window_size }.build()?;
        let augmenter = AugmenterInit { enabled: augment }.build();
        Ok(ChipPipeline {
            window,
            augmenter,
            channels,
        })
    }
}

/// Chip generation pipeline.
#[derive(Debug, Clone)]
pub struct ChipPipeline {
    window: SlidingWindow,
    augmenter: Augmenter,
    channels: usize,
}

impl ChipPipeline {
    /// Process every pair and report the totals.
    pub fn run(&self, sources: &[ChipSource], sink: &mut dyn ChipSink) -> Result<ChipCounts> {
        let mut counts = ChipCounts::default();
        for source in sources {
            self.run_pair(source, sink, &mut counts)?;
        }
        info!("raw total: {}", counts.raw_chips);
        info!("augmented total: {}", counts.total_variants);
        Ok(counts)
    }

    fn run_pair(
        &self,
        source: &ChipSource,
        sink: &mut dyn ChipSink,
        counts: &mut ChipCounts,
    ) -> Result<()> {
        let image = match raster::load(&source.image_path, None) {
            Some(image) => image,
            None => {
                warn!(
                    "cannot read image '{}', skipping pair",
                    source.image_path.display()
                );
                return Ok(());
            }
        };
        let labels = match raster::load(&source.label_path, None) {
            Some(labels) => labels,
            None => {
                warn!(
                    "cannot read labels '{}', skipping pair",
                    source.label_path.display()
                );
                return Ok(());
            }
        };

        let (rows, cols, bands) = image.dim();
        let (label_rows, label_cols, label_bands) = labels.dim();
        if (label_rows, label_cols) != (rows, cols) {
            warn!(
                "image/label shape mismatch for '{}' ({}x{} vs {}x{}), skipping pair",
                source.name, rows, cols, label_rows, label_cols
            );
            return Ok(());
        }
        if bands != self.channels || label_bands != 1 {
            warn!(
                "'{}' has {} image bands and {} label bands, expected {} and 1, skipping pair",
                source.name, bands, label_bands, self.channels
            );
            return Ok(());
        }

        // window the image and label jointly
        let combined = concatenate(Axis(2), &[image.view(), labels.view()])?;
        let chips = match self.window.sample(&combined) {
            Ok(chips) => chips,
            Err(err) => {
                warn!("skipping pair '{}': {}", source.name, err);
                return Ok(());
            }
        };

        for chip in chips {
            let label_window = chip.data.slice(s![.., .., self.channels..]);
            if chip_is_empty(&label_window) {
                continue;
            }
            info!("chipping: {} {} {}", source.name, chip.x, chip.y);

            for variant in self.augmenter.augment(&chip.data) {
                let image_out = variant.data.slice(s![.., .., ..self.channels]).to_owned();
                let mut label_out = variant.data.slice(s![.., .., self.channels..]).to_owned();
                // labels must stay valid class indices after the transform
                label_out.mapv_inplace(|value| value.round().max(0.0));

                sink.write_image(&image_out, &source.name, chip.x, chip.y, variant.index)?;
                sink.write_label(&label_out, &source.name, chip.x, chip.y, variant.index)?;
                counts.total_variants += 1;
            }
            counts.raw_chips += 1;
        }
        Ok(())
    }
}
