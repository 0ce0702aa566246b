//! Geometric chip augmentation.
//!
//! All bands of a chip transform together, so the spatial correspondence
//! between image bands and the label band is preserved by every variant.

use crate::common::*;

/// Augmenter initializer.
#[derive(Debug, Clone)]
pub struct AugmenterInit {
    /// Expand each chip into its rotation and flip variants.
    pub enabled: bool,
}

impl AugmenterInit {
    pub fn build(self) -> Augmenter {
        Augmenter {
            enabled: self.enabled,
        }
    }
}

/// Chip augmenter.
#[derive(Debug, Clone)]
pub struct Augmenter {
    enabled: bool,
}

/// A geometrically transformed copy of a chip.
#[derive(Debug, Clone)]
pub struct AugmentedVariant {
    /// 0-based position in generation order, used for output naming only.
    pub index: usize,
    pub data: Array3<f32>,
}

impl Augmenter {
    /// Expand one chip into its variant set, eagerly and in a fixed order.
    ///
    /// Disabled, the set is the identity chip alone. Enabled, the base set
    /// is identity plus the 90/180/270 degree rotations, followed by a
    /// horizontal and a vertical flip of every base element: 12 variants in
    /// total.
    pub fn augment(&self, chip: &Array3<f32>) -> Vec<AugmentedVariant> {
        let mut variants = vec![chip.clone()];

        if self.enabled {
            variants.extend([rot90(chip), rot180(chip), rot270(chip)]);
            let flipped: Vec<_> = variants
                .iter()
                .flat_map(|data| [flip_horizontal(data), flip_vertical(data)])
                .collect();
            variants.extend(flipped);
        }

        variants
            .into_iter()
            .enumerate()
            .map(|(index, data)| AugmentedVariant { index, data })
            .collect()
    }
}

/// Rotate 90 degrees counter-clockwise in the image plane.
pub fn rot90(image: &Array3<f32>) -> Array3<f32> {
    let (rows, cols, bands) = image.dim();
    Array3::from_shape_fn((cols, rows, bands), |(r, c, b)| {
        image[(c, cols - 1 - r, b)]
    })
}

/// Rotate 180 degrees.
pub fn rot180(image: &Array3<f32>) -> Array3<f32> {
    let (rows, cols, bands) = image.dim();
    Array3::from_shape_fn((rows, cols, bands), |(r, c, b)| {
        image[(rows - 1 - r, cols - 1 - c, b)]
    })
}

/// Rotate 270 degrees counter-clockwise.
pub fn rot270(image: &Array3<f32>) -> Array3<f32> {
    let (rows, cols, bands) = image.dim();
    Array3::from_shape_fn((cols, rows, bands), |(r, c, b)| {
        image[(rows - 1 - c, r, b)]
    })
}

/// Reverse along the column axis.
pub fn flip_horizontal(image: &Array3<f32>) -> Array3<f32> {
    let (rows, cols, bands) = image.dim();
    Array3::from_shape_fn((rows, cols, bands), |(r, c, b)| {
        image[(r, cols - 1 - c, b)]
    })
}

/// Reverse along the row axis.
pub fn flip_vertical(image: &Array3<f32>) -> Array3<f32> {
    let (rows, cols, bands) = image.dim();
    Array3::from_shape_fn((rows, cols, bands), |(r, c, b)| {
        image[(rows - 1 - r, c, b)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Array3<f32> {
        // [[1, 2],
        //  [3, 4]]
        Array3::from_shape_vec((2, 2, 1), vec![1.0, 2.0, 3.0, 4.0]).unwrap()
    }

    #[test]
    fn rotations_are_counter_clockwise() {
        let image = quad();
        assert_eq!(
            rot90(&image).into_raw_vec(),
            vec![2.0, 4.0, 1.0, 3.0] // [[2, 4], [1, 3]]
        );
        assert_eq!(
            rot180(&image).into_raw_vec(),
            vec![4.0, 3.0, 2.0, 1.0] // [[4, 3], [2, 1]]
        );
        assert_eq!(
            rot270(&image).into_raw_vec(),
            vec![3.0, 1.0, 4.0, 2.0] // [[3, 1], [4, 2]]
        );
    }

    #[test]
    fn flips_reverse_one_axis() {
        let image = quad();
        assert_eq!(
            flip_horizontal(&image).into_raw_vec(),
            vec![2.0, 1.0, 4.0, 3.0]
        );
        assert_eq!(
            flip_vertical(&image).into_raw_vec(),
            vec![3.0, 4.0, 1.0, 2.0]
        );
    }

    #[test]
    fn disabled_yields_identity_only() {
        let augmenter = AugmenterInit { enabled: false }.build();
        let chip = quad();
        let variants = augmenter.augment(&chip);
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].index, 0);
        assert_eq!(variants[0].data, chip);
    }

    #[test]
    fn enabled_yields_twelve_in_generation_order() {
        let augmenter = AugmenterInit { enabled: true }.build();
        let chip = quad();
        let variants = augmenter.augment(&chip);
        assert_eq!(variants.len(), 12);
        assert_eq!(
            variants.iter().map(|v| v.index).collect::<Vec<_>>(),
            (0..12).collect::<Vec<_>>()
        );

        // base set: identity then the three rotations
        assert_eq!(variants[0].data, chip);
        assert_eq!(variants[1].data, rot90(&chip));
        assert_eq!(variants[2].data, rot180(&chip));
        assert_eq!(variants[3].data, rot270(&chip));
        // then per base element a horizontal and a vertical flip
        assert_eq!(variants[4].data, flip_horizontal(&chip));
        assert_eq!(variants[5].data, flip_vertical(&chip));
        assert_eq!(variants[6].data, flip_horizontal(&rot90(&chip)));
        assert_eq!(variants[7].data, flip_vertical(&rot90(&chip)));
        assert_eq!(variants[10].data, flip_horizontal(&rot270(&chip)));
        assert_eq!(variants[11].data, flip_vertical(&rot270(&chip)));
    }

    #[test]
    fn bands_transform_in_lock_step() {
        // band 1 mirrors band 0; that relation must survive every variant
        let chip = Array3::from_shape_fn((4, 4, 2), |(r, c, _)| (r * 4 + c) as f32);
        let augmenter = AugmenterInit { enabled: true }.build();
        for variant in augmenter.augment(&chip) {
            let (rows, cols, _) = variant.data.dim();
            for r in 0..rows {
                for c in 0..cols {
                    assert_eq!(variant.data[(r, c, 0)], variant.data[(r, c, 1)]);
                }
            }
        }
    }

    #[test]
    fn variant_values_come_from_the_input() {
        let chip = quad();
        let augmenter = AugmenterInit { enabled: true }.build();
        for variant in augmenter.augment(&chip) {
            let mut values: Vec<_> = variant.data.iter().copied().collect();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        }
    }
}
