//! Anatomical label tables
//!
//! Maps the integer ids of a segmentation to structure names and colors,
//! and lists the structures present in a label volume.

pub mod lut;
pub mod segments;

pub use lut::{ColorLut, LutEntry};
pub use segments::{present_segments, region_mask};
