//! Consolidation of per-patient feature tables into one cohort table
//!
//! Runs in two passes over the patient folders: the first collects the
//! union of `Structure_Variable` columns, the second builds one row per
//! patient over that union, with missing cells marked not-available.

pub mod cohort;
pub mod config;
pub mod transform;

pub use cohort::{
    discover_columns, fill_rows, list_feature_files, run_consolidation, CohortRow, CohortTable,
    ConsolidationSummary, PatientFile, Target, COHORT_FILE, PATIENT_COLUMN, TARGET_COLUMN,
};
pub use config::TransformConfig;
pub use transform::{transform_features, transform_features_file, PatientRow};
