//! Building blocks for preparing segmentation training chips from
//! geospatial raster imagery and vector annotations.

mod common;

pub mod annotation;
pub mod mask;
pub mod pipeline;
pub mod processor;
pub mod raster;
