//! Rasterization of vector annotations into binary label masks.
//!
//! Every shape of an [`AnnotationSet`](crate::annotation::AnnotationSet) is
//! OR-ed into a single zero-initialized H x W buffer, so the output is
//! strictly binary by construction and no per-annotation temporary is
//! allocated. Geometry falling outside the image bounds is clipped, never an
//! error.

use crate::{
    annotation::{AnnotationSet, EllipseAnnotation, PolygonAnnotation},
    common::*,
};

/// Rasterize one annotation set into a `(height, width)` mask of {0, 1}.
///
/// An entry without any ellipse or polygon annotation produces the all-zero
/// background mask.
pub fn rasterize(set: &AnnotationSet) -> Result<Array2<u8>> {
    let (height, width) = set.image_size()?;
    let mut mask = Array2::<u8>::zeros((height, width));

    for ellipse in &set.ellipse {
        fill_ellipse(&mut mask, ellipse);
    }
    for polygon in &set.polygon {
        fill_polygon(&mut mask, polygon);
    }

    Ok(mask)
}

/// Rasterize a whole export, one mask per entry in input order.
pub fn rasterize_all(sets: &[AnnotationSet]) -> Result<Vec<Array2<u8>>> {
    sets.iter().map(rasterize).collect()
}

/// Fill an axis-aligned ellipse. A pixel is covered when its center lies
/// strictly inside the ellipse. Rotation is not supported.
fn fill_ellipse(mask: &mut Array2<u8>, ellipse: &EllipseAnnotation) {
    let (height, width) = mask.dim();
    let cy = ellipse.y * height as f64 / 100.0;
    let cx = ellipse.x * width as f64 / 100.0;
    let ry = ellipse.radius_y * height as f64 / 100.0;
    let rx = ellipse.radius_x * width as f64 / 100.0;

    // degenerate radii rasterize to an empty region
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }

    let row_min = (cy - ry).floor().max(0.0) as usize;
    let row_max = (cy + ry).ceil().min(height as f64 - 1.0).max(0.0) as usize;
    let col_min = (cx - rx).floor().max(0.0) as usize;
    let col_max = (cx + rx).ceil().min(width as f64 - 1.0).max(0.0) as usize;

    for row in row_min..=row_max {
        for col in col_min..=col_max {
            let dr = (row as f64 - cy) / ry;
            let dc = (col as f64 - cx) / rx;
            if dr * dr + dc * dc < 1.0 {
                mask[(row, col)] = 1;
            }
        }
    }
}

/// Fill a polygon interior with an even-odd point-in-polygon test over its
/// bounding box. Fewer than 3 vertices rasterizes to an empty region.
fn fill_polygon(mask: &mut Array2<u8>, polygon: &PolygonAnnotation) {
    if polygon.points.len() < 3 {
        return;
    }
    let (height, width) = mask.dim();

    // percent units to (row, col) pixel coordinates
    let verts: Vec<(f64, f64)> = polygon
        .points
        .iter()
        .map(|&[x, y]| (y * height as f64 / 100.0, x * width as f64 / 100.0))
        .collect();

    let row_lo = verts.iter().map(|v| v.0).fold(f64::INFINITY, f64::min);
    let row_hi = verts.iter().map(|v| v.0).fold(f64::NEG_INFINITY, f64::max);
    let col_lo = verts.iter().map(|v| v.1).fold(f64::INFINITY, f64::min);
    let col_hi = verts.iter().map(|v| v.1).fold(f64::NEG_INFINITY, f64::max);

    let row_min = row_lo.floor().max(0.0) as usize;
    let row_max = row_hi.ceil().min(height as f64 - 1.0).max(0.0) as usize;
    let col_min = col_lo.floor().max(0.0) as usize;
    let col_max = col_hi.ceil().min(width as f64 - 1.0).max(0.0) as usize;

    for row in row_min..=row_max {
        for col in col_min..=col_max {
            if point_in_polygon(row as f64, col as f64, &verts) {
                mask[(row, col)] = 1;
            }
        }
    }
}

/// Even-odd ray casting. Vertices are (row, col) pairs.
fn point_in_polygon(row: f64, col: f64, verts: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = verts.len() - 1;
    for i in 0..verts.len() {
        let (ri, ci) = verts[i];
        let (rj, cj) = verts[j];
        if (ri > row) != (rj > row) && col < (cj - ci) * (row - ri) / (rj - ri) + ci {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::LabelMeta;

    fn set_with(
        height: usize,
        width: usize,
        ellipse: Vec<EllipseAnnotation>,
        polygon: Vec<PolygonAnnotation>,
    ) -> AnnotationSet {
        AnnotationSet {
            labels: vec![LabelMeta {
                original_height: height,
                original_width: width,
            }],
            ellipse,
            polygon,
        }
    }

    #[test]
    fn empty_set_is_background_only() {
        let mask = rasterize(&set_with(8, 6, vec![], vec![])).unwrap();
        assert_eq!(mask.dim(), (8, 6));
        assert!(mask.iter().all(|&v| v == 0));
    }

    #[test]
    fn mask_shape_follows_metadata() {
        let set = set_with(
            60,
            100,
            vec![EllipseAnnotation {
                x: 50.0,
                y: 50.0,
                radius_x: 20.0,
                radius_y: 20.0,
            }],
            vec![],
        );
        let mask = rasterize(&set).unwrap();
        assert_eq!(mask.dim(), (60, 100));
    }

    #[test]
    fn ellipse_covers_center_not_corners() {
        let set = set_with(
            100,
            100,
            vec![EllipseAnnotation {
                x: 50.0,
                y: 50.0,
                radius_x: 10.0,
                radius_y: 10.0,
            }],
            vec![],
        );
        let mask = rasterize(&set).unwrap();
        assert_eq!(mask[(50, 50)], 1);
        assert_eq!(mask[(0, 0)], 0);
        assert_eq!(mask[(99, 99)], 0);
        // strictly outside the 10px radius
        assert_eq!(mask[(50, 61)], 0);
    }

    #[test]
    fn ellipse_coverage_approximates_its_area() {
        // 20% x 10% radii of a 200x200 image: 40px x 20px
        let set = set_with(
            200,
            200,
            vec![EllipseAnnotation {
                x: 50.0,
                y: 50.0,
                radius_x: 20.0,
                radius_y: 10.0,
            }],
            vec![],
        );
        let mask = rasterize(&set).unwrap();
        let covered = mask.iter().filter(|&&v| v == 1).count() as f64;
        let expected = std::f64::consts::PI * 40.0 * 20.0;
        approx::assert_abs_diff_eq!(covered / expected, 1.0, epsilon = 0.08);
    }

    #[test]
    fn polygon_fills_interior() {
        // square from (10%, 10%) to (50%, 50%) of a 100x100 image
        let set = set_with(
            100,
            100,
            vec![],
            vec![PolygonAnnotation {
                points: vec![[10.0, 10.0], [50.0, 10.0], [50.0, 50.0], [10.0, 50.0]],
            }],
        );
        let mask = rasterize(&set).unwrap();
        assert_eq!(mask[(30, 30)], 1);
        assert_eq!(mask[(5, 5)], 0);
        assert_eq!(mask[(70, 70)], 0);
    }

    #[test]
    fn overlapping_shapes_stay_binary() {
        let set = set_with(
            100,
            100,
            vec![
                EllipseAnnotation {
                    x: 50.0,
                    y: 50.0,
                    radius_x: 20.0,
                    radius_y: 20.0,
                },
                EllipseAnnotation {
                    x: 55.0,
                    y: 50.0,
                    radius_x: 20.0,
                    radius_y: 20.0,
                },
            ],
            vec![PolygonAnnotation {
                points: vec![[40.0, 40.0], [60.0, 40.0], [60.0, 60.0], [40.0, 60.0]],
            }],
        );
        let mask = rasterize(&set).unwrap();
        assert!(mask.iter().all(|&v| v <= 1));
        assert!(mask.iter().any(|&v| v == 1));
    }

    #[test]
    fn degenerate_geometry_is_empty_not_an_error() {
        let set = set_with(
            50,
            50,
            vec![EllipseAnnotation {
                x: 25.0,
                y: 25.0,
                radius_x: 0.0,
                radius_y: 10.0,
            }],
            vec![PolygonAnnotation {
                points: vec![[10.0, 10.0], [20.0, 20.0]],
            }],
        );
        let mask = rasterize(&set).unwrap();
        assert!(mask.iter().all(|&v| v == 0));
    }

    #[test]
    fn out_of_range_geometry_clips_to_bounds() {
        // ellipse centered on the far corner with a radius reaching well
        // outside the image
        let set = set_with(
            50,
            50,
            vec![EllipseAnnotation {
                x: 100.0,
                y: 100.0,
                radius_x: 50.0,
                radius_y: 50.0,
            }],
            vec![PolygonAnnotation {
                points: vec![[80.0, 80.0], [150.0, 80.0], [150.0, 150.0], [80.0, 150.0]],
            }],
        );
        let mask = rasterize(&set).unwrap();
        assert_eq!(mask.dim(), (50, 50));
        assert!(mask.iter().all(|&v| v <= 1));
        assert_eq!(mask[(49, 49)], 1);
    }

    #[test]
    fn rasterize_all_preserves_input_order() {
        let sets = vec![
            set_with(4, 4, vec![], vec![]),
            set_with(6, 8, vec![], vec![]),
        ];
        let masks = rasterize_all(&sets).unwrap();
        assert_eq!(masks.len(), 2);
        assert_eq!(masks[0].dim(), (4, 4));
        assert_eq!(masks[1].dim(), (6, 8));
    }
}
