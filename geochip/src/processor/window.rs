//! Sliding-window chip sampling.

use crate::common::*;

/// Sliding window initializer.
#[derive(Debug, Clone)]
pub struct SlidingWindowInit {
    /// Origin advance in (rows, cols).
    pub step: (usize, usize),
    /// Window extent in (rows, cols).
    pub window_size: (usize, usize),
}

impl SlidingWindowInit {
    pub fn build(self) -> Result<SlidingWindow> {
        let Self { step, window_size } = self;
        ensure!(step.0 > 0 && step.1 > 0, "step must be positive");
        ensure!(
            window_size.0 > 0 && window_size.1 > 0,
            "window_size must be positive"
        );
        ensure!(
            step.0 <= window_size.0 && step.1 <= window_size.1,
            "step {:?} must not exceed window_size {:?}",
            step,
            window_size
        );
        Ok(SlidingWindow { step, window_size })
    }
}

/// Sliding window chip sampler.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    step: (usize, usize),
    window_size: (usize, usize),
}

/// One fixed-size window into a multi-band image.
#[derive(Debug, Clone)]
pub struct Chip {
    /// Column origin, after boundary relocation.
    pub x: usize,
    /// Row origin, after boundary relocation.
    pub y: usize,
    /// The windowed (rows, cols, bands) data, always exactly window-sized.
    pub data: Array3<f32>,
}

impl SlidingWindow {
    /// Walk `image` and yield one [`Chip`] per visited origin.
    ///
    /// The origin grid advances by `step` on both axes up to the last origin
    /// inside the image, so windows near the far edges would run short; those
    /// are relocated instead of padded. The relocation is priority-ordered:
    /// when both axes run short the window is pinned to the bottom-right
    /// corner of the image, otherwise only the short axis moves. Edge chips
    /// therefore sample at a non-uniform stride, and relocated origins can
    /// repeat; both are intentional so chip placement stays deterministic.
    ///
    /// The returned iterator is lazy and finite; calling `sample` again
    /// restarts the traversal. The input is never mutated.
    pub fn sample<'a>(
        &self,
        image: &'a Array3<f32>,
    ) -> Result<impl Iterator<Item = Chip> + 'a> {
        let (rows, cols, _bands) = image.dim();
        let (win_h, win_w) = self.window_size;
        ensure!(
            rows >= win_h && cols >= win_w,
            "image {}x{} is smaller than the {}x{} window",
            rows,
            cols,
            win_h,
            win_w
        );
        let (step_h, step_w) = self.step;

        let ys = (0..rows).step_by(step_h);
        let xs = (0..cols).step_by(step_w);
        let iter = iproduct!(ys, xs).map(move |(y, x)| {
            let height_short = y + win_h > rows;
            let width_short = x + win_w > cols;

            let (y, x) = if height_short && width_short {
                (rows - win_h, cols - win_w)
            } else if width_short {
                (y, cols - win_w)
            } else if height_short {
                (rows - win_h, x)
            } else {
                (y, x)
            };

            let data = image.slice(s![y..y + win_h, x..x + win_w, ..]).to_owned();
            Chip { x, y, data }
        });
        Ok(iter)
    }
}

/// Check whether a label chip contains no labeled pixel.
pub fn chip_is_empty(labels: &ArrayView3<f32>) -> bool {
    labels.iter().all(|&value| value == 0.0)
}
