pub mod cli;
pub mod consolidation;
pub mod error;
pub mod extraction;
pub mod labels;
pub mod types;
pub mod volume;

pub use cli::report::TextReport;
pub use consolidation::{
    run_consolidation, transform_features_file, ConsolidationSummary, Target, TransformConfig,
};
pub use error::{RadiomicsError, Result};
pub use extraction::{
    process_folder, run_extraction, ExtractionSummary, FeatureExtractor, PyRadiomicsCli,
};
pub use labels::{present_segments, region_mask, ColorLut};
pub use types::*;
pub use volume::{read_mgh, Volume};
