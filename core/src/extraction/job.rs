use super::extractor::FeatureExtractor;
use super::folder::{features_path, process_folder, FolderOutcome};
use super::ledger::{ProcessedLedger, LEDGER_FILE};
use crate::error::{RadiomicsError, Result};
use crate::labels::ColorLut;
use log::{error, info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What an extraction run did with each patient folder
#[derive(Debug, Default, Serialize)]
pub struct ExtractionSummary {
    /// Folders whose feature table was written
    pub extracted: Vec<PathBuf>,

    /// Folders skipped because the ledger already lists them
    pub already_processed: Vec<PathBuf>,

    /// Folders lacking a required volume
    pub missing_inputs: Vec<PathBuf>,

    /// Folders that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl ExtractionSummary {
    /// Total folders visited
    pub fn total(&self) -> usize {
        self.extracted.len()
            + self.already_processed.len()
            + self.missing_inputs.len()
            + self.failed.len()
    }
}

/// Immediate subdirectories of the master directory, sorted by name
pub fn list_patient_folders(master: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(master)? {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// Ledger key of a folder
fn ledger_key(folder: &Path) -> String {
    folder.display().to_string()
}

/// Extracts features for every patient folder not yet in the ledger
///
/// Each folder is independent: missing volumes and per-folder failures are
/// logged and the batch continues. Successfully extracted folders are added
/// to the ledger in a single write at the end of the run.
///
/// # Errors
///
/// Returns an error if `master` is not a directory, or the ledger cannot
/// be read or written
pub fn run_extraction(
    master: &Path,
    lut: &ColorLut,
    extractor: &dyn FeatureExtractor,
) -> Result<ExtractionSummary> {
    if !master.is_dir() {
        return Err(RadiomicsError::NotADirectory(master.to_path_buf()));
    }

    let mut ledger = ProcessedLedger::load(master.join(LEDGER_FILE))?;
    let folders = list_patient_folders(master)?;
    info!(
        "Found {} patient folders, {} already processed",
        folders.len(),
        ledger.len()
    );

    let mut summary = ExtractionSummary::default();
    let mut newly_processed = Vec::new();

    for folder in folders {
        let key = ledger_key(&folder);
        if ledger.contains(&key) {
            info!("Skipping {}: already processed", key);
            summary.already_processed.push(folder);
            continue;
        }

        info!("Processing folder: {}", key);
        match process_folder(&folder, lut, extractor) {
            FolderOutcome::Extracted(table) => match table.save(features_path(&folder)) {
                Ok(()) => {
                    info!("Saved features for {} ({} regions)", key, table.len());
                    newly_processed.push(key);
                    summary.extracted.push(folder);
                }
                Err(e) => {
                    error!("Error saving features for {}: {}", key, e);
                    summary.failed.push((folder, e.to_string()));
                }
            },
            FolderOutcome::MissingInputs => {
                warn!("Skipping {}: required files not found", key);
                summary.missing_inputs.push(folder);
            }
            FolderOutcome::Failed(e) => {
                error!("Error processing {}: {}", key, e);
                summary.failed.push((folder, e.to_string()));
            }
        }
    }

    if !newly_processed.is_empty() {
        let added = ledger.append(newly_processed)?;
        info!("Recorded {} folders in {}", added, ledger.path().display());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::folder::fake::FakeExtractor;
    use crate::extraction::folder::{LABEL_VOLUME_FILE, MRI_DIR, STRUCTURAL_VOLUME_FILE};
    use crate::volume::mgh::fixtures::{header_bytes, write_int_mgz, write_mgz_bytes};
    use ndarray::Array3;
    use tempfile::TempDir;

    fn write_patient(folder: &Path, label: i32) {
        let mri = folder.join(MRI_DIR);
        fs::create_dir_all(&mri).unwrap();

        let mut labels = Array3::<i32>::zeros((3, 3, 3));
        labels[[0, 0, 0]] = label;
        labels[[0, 0, 1]] = label;
        write_int_mgz(&mri.join(LABEL_VOLUME_FILE), &labels);
        write_int_mgz(&mri.join(STRUCTURAL_VOLUME_FILE), &(labels.clone() * 2));
    }

    fn ledger_rows(master: &Path) -> Vec<String> {
        ProcessedLedger::load(master.join(LEDGER_FILE))
            .unwrap()
            .folders()
            .to_vec()
    }

    #[test]
    fn test_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let result = run_extraction(&file, &ColorLut::embedded(), &FakeExtractor::default());
        assert!(matches!(result, Err(RadiomicsError::NotADirectory(_))));
    }

    #[test]
    fn test_run_writes_features_and_ledger() {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path();
        write_patient(&master.join("p01"), 17);
        write_patient(&master.join("p02"), 53);
        fs::create_dir_all(master.join("p03").join(MRI_DIR)).unwrap();

        let summary =
            run_extraction(master, &ColorLut::embedded(), &FakeExtractor::default()).unwrap();

        assert_eq!(summary.extracted.len(), 2);
        assert_eq!(summary.missing_inputs, vec![master.join("p03")]);
        assert!(features_path(&master.join("p01")).is_file());
        assert!(!master.join("p03").join("stats").exists());

        let text = fs::read_to_string(features_path(&master.join("p02"))).unwrap();
        assert!(text.starts_with("ColorId,StructName,RGB,original_shape_VoxelVolume"));
        assert!(text.contains("53,Right-Hippocampus,[220 216 20],2.0,106.0"));

        assert_eq!(
            ledger_rows(master),
            vec![ledger_key(&master.join("p01")), ledger_key(&master.join("p02"))]
        );
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path();
        write_patient(&master.join("p01"), 17);

        run_extraction(master, &ColorLut::embedded(), &FakeExtractor::default()).unwrap();
        let features = features_path(&master.join("p01"));
        fs::write(&features, "sentinel").unwrap();

        let extractor = FakeExtractor::default();
        let summary = run_extraction(master, &ColorLut::embedded(), &extractor).unwrap();

        assert!(summary.extracted.is_empty());
        assert_eq!(summary.already_processed.len(), 1);
        assert!(extractor.calls.borrow().is_empty());
        assert_eq!(fs::read_to_string(&features).unwrap(), "sentinel");
        assert_eq!(ledger_rows(master).len(), 1);
    }

    #[test]
    fn test_corrupt_volume_fails_only_its_folder() {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path();
        write_patient(&master.join("p01"), 17);
        write_patient(&master.join("p02"), 53);
        write_mgz_bytes(
            &master.join("p01").join(MRI_DIR).join(STRUCTURAL_VOLUME_FILE),
            &header_bytes([100_000, 100_000, 100_000, 1], 1, [1.0; 3]),
        );

        let summary =
            run_extraction(master, &ColorLut::embedded(), &FakeExtractor::default()).unwrap();

        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, master.join("p01"));
        assert_eq!(summary.extracted, vec![master.join("p02")]);
        assert_eq!(ledger_rows(master), vec![ledger_key(&master.join("p02"))]);
    }

    #[test]
    fn test_failed_folders_are_retried_later() {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path();
        write_patient(&master.join("p01"), 17);
        write_patient(&master.join("p02"), 53);

        let failing = FakeExtractor {
            fail_on: Some(53),
            ..Default::default()
        };
        let summary = run_extraction(master, &ColorLut::embedded(), &failing).unwrap();
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(ledger_rows(master), vec![ledger_key(&master.join("p01"))]);

        let summary =
            run_extraction(master, &ColorLut::embedded(), &FakeExtractor::default()).unwrap();
        assert_eq!(summary.extracted, vec![master.join("p02")]);
        assert_eq!(ledger_rows(master).len(), 2);
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn test_no_ledger_without_successes() {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path();
        fs::create_dir_all(master.join("empty-patient")).unwrap();

        let summary =
            run_extraction(master, &ColorLut::embedded(), &FakeExtractor::default()).unwrap();
        assert_eq!(summary.missing_inputs.len(), 1);
        assert!(!master.join(LEDGER_FILE).exists());
    }
}
