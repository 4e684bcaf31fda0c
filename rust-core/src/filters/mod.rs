//! Trapezoid window and the overlap-add spectral band filter

pub mod windows;
pub mod overlap_add;

pub use windows::{Window, generate_trapezoid};
pub use overlap_add::{OverlapAddFilter, CLIP_LEVEL};
