pub mod extractor;
pub mod folder;
pub mod job;
pub mod ledger;
pub mod pyradiomics;

pub use extractor::{retain_original, FeatureExtractor, FeatureMap, PreparedExtractor};
pub use folder::{features_path, process_folder, FolderOutcome, PatientInputs};
pub use job::{list_patient_folders, run_extraction, ExtractionSummary};
pub use ledger::{ProcessedLedger, LEDGER_FILE};
pub use pyradiomics::PyRadiomicsCli;
