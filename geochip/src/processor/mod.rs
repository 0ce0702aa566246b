//! Chip preprocessing building blocks.

pub mod augment;
pub mod window;

pub use augment::*;
pub use window::*;
