//! Core type definitions for the radiomics pipeline
//!
//! This module provides the fundamental types shared by both jobs:
//! - [`RegionRow`]: One labelled structure present in a segmentation
//! - [`Rgb`]: Display color of a structure
//! - [`FeatureValue`]: A single radiomics feature as reported by the extractor
//! - [`FeatureRecord`] / [`FeatureTable`]: The per-patient `features.csv` table
//! - [`CellValue`]: A normalized value in the consolidated cohort table

mod cell;
mod feature;
mod region;
mod rgb;

pub use cell::{classify, CellValue, Rejection, NOT_AVAILABLE};
pub use feature::{
    FeatureRecord, FeatureTable, FeatureValue, COLOR_ID_COLUMN, RGB_COLUMN, STRUCT_NAME_COLUMN,
};
pub use region::{RegionRow, BACKGROUND_ID};
pub use rgb::Rgb;
