//! Data model for the annotation export format.
//!
//! The export is a JSON array with one entry per source image. Ellipse and
//! polygon coordinates are percentages (0-100) of the image width/height and
//! must be converted to pixel units before rasterization.

use crate::common::*;

/// The vector ground-truth description for one source image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationSet {
    /// Per-image metadata; the first entry carries the pixel dimensions.
    pub labels: Vec<LabelMeta>,
    /// Ellipse annotations; an absent key means none were drawn.
    #[serde(default)]
    pub ellipse: Vec<EllipseAnnotation>,
    /// Polygon annotations; an absent key means none were drawn.
    #[serde(default)]
    pub polygon: Vec<PolygonAnnotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMeta {
    pub original_height: usize,
    pub original_width: usize,
}

/// An axis-aligned ellipse in percent units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EllipseAnnotation {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "radiusX")]
    pub radius_x: f64,
    #[serde(rename = "radiusY")]
    pub radius_y: f64,
}

/// A closed polygon given by its vertices in percent units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonAnnotation {
    /// Ordered `[x, y]` vertex pairs.
    pub points: Vec<[f64; 2]>,
}

impl AnnotationSet {
    /// The pixel dimensions `(height, width)` of the annotated image.
    pub fn image_size(&self) -> Result<(usize, usize)> {
        let meta = self
            .labels
            .first()
            .ok_or_else(|| format_err!("annotation entry has no labels metadata"))?;
        ensure!(
            meta.original_height > 0 && meta.original_width > 0,
            "image dimensions must be positive, got {}x{}",
            meta.original_height,
            meta.original_width
        );
        Ok((meta.original_height, meta.original_width))
    }
}

/// Parse an annotation export file.
pub fn open_export(path: impl AsRef<Path>) -> Result<Vec<AnnotationSet>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read annotation export '{}'", path.display()))?;
    let sets = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse annotation export '{}'", path.display()))?;
    Ok(sets)
}
