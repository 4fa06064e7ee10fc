use super::config::TransformConfig;
use super::transform::transform_features_file;
use crate::error::{RadiomicsError, Result};
use crate::extraction::features_path;
use crate::types::CellValue;
use log::{info, warn};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output file name at the root of the master directory
pub const COHORT_FILE: &str = "features_consolidado.csv";
pub const PATIENT_COLUMN: &str = "Paciente";
pub const TARGET_COLUMN: &str = "Target";

/// Outcome label assigned to every patient of one consolidation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Target {
    Negative,
    Positive,
}

impl TryFrom<u8> for Target {
    type Error = RadiomicsError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Target::Negative),
            1 => Ok(Target::Positive),
            other => Err(RadiomicsError::InvalidConfig(format!(
                "target must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl From<Target> for u8 {
    fn from(target: Target) -> Self {
        match target {
            Target::Negative => 0,
            Target::Positive => 1,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// A patient's `features.csv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFile {
    /// Patient folder name
    pub patient: String,
    pub path: PathBuf,
}

/// Patient folders holding a `stats/features.csv`, sorted by name
pub fn list_feature_files(master: &Path) -> Result<Vec<PatientFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(master)? {
        let entry = entry?;
        let folder = entry.path();
        let path = features_path(&folder);
        if folder.is_dir() && path.is_file() {
            files.push(PatientFile {
                patient: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }
    }
    files.sort_by(|a, b| a.patient.cmp(&b.patient));
    Ok(files)
}

/// Pass 1: collects every column any patient contributes
///
/// Files that cannot be transformed are skipped with a warning.
pub fn discover_columns(files: &[PatientFile], config: &TransformConfig) -> BTreeSet<String> {
    let mut universe = BTreeSet::new();
    for file in files {
        match transform_features_file(&file.path, &file.patient, config) {
            Ok(row) => universe.extend(row.columns),
            Err(e) => warn!("Skipping {}: {}", file.path.display(), e),
        }
    }
    universe
}

/// One patient's row of the cohort table
#[derive(Debug, Clone, PartialEq)]
pub struct CohortRow {
    pub patient: String,
    /// Values aligned with [`CohortTable::columns`]
    pub values: Vec<CellValue>,
    pub target: Target,
}

/// The consolidated cohort table
#[derive(Debug, Clone, PartialEq)]
pub struct CohortTable {
    /// Region-variable columns, sorted
    pub columns: Vec<String>,
    pub rows: Vec<CohortRow>,
}

impl CohortTable {
    /// Full header: patient, region-variable columns, target
    pub fn header(&self) -> Vec<&str> {
        let mut header = Vec::with_capacity(self.columns.len() + 2);
        header.push(PATIENT_COLUMN);
        header.extend(self.columns.iter().map(String::as_str));
        header.push(TARGET_COLUMN);
        header
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(self.header())?;

        for row in &self.rows {
            let mut record = Vec::with_capacity(row.values.len() + 2);
            record.push(row.patient.clone());
            record.extend(row.values.iter().map(|v| v.to_string()));
            record.push(row.target.to_string());
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }
}

/// Pass 2: builds one row per patient over the discovered universe
///
/// Every row starts as all not-available and is overwritten with the
/// patient's own values. Columns outside the universe are ignored.
pub fn fill_rows(
    files: &[PatientFile],
    universe: &BTreeSet<String>,
    config: &TransformConfig,
    target: Target,
) -> CohortTable {
    let columns: Vec<String> = universe.iter().cloned().collect();
    let positions: HashMap<&str, usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut rows = Vec::new();
    for file in files {
        info!("Processing: {}", file.path.display());
        let patient_row = match transform_features_file(&file.path, &file.patient, config) {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping {}: {}", file.path.display(), e);
                continue;
            }
        };

        let mut values = vec![CellValue::NotAvailable; columns.len()];
        for (column, value) in patient_row.cells() {
            if let Some(&index) = positions.get(column) {
                values[index] = value;
            }
        }

        rows.push(CohortRow {
            patient: patient_row.patient,
            values,
            target,
        });
    }

    CohortTable { columns, rows }
}

/// What a consolidation run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidationSummary {
    pub output: PathBuf,
    pub patients: usize,
    /// Columns other than patient and target
    pub variables: usize,
    pub target: Target,
}

/// Consolidates every patient's features under `master` into one table
///
/// # Errors
///
/// Returns an error if `master` is not a directory, no patient file can be
/// transformed, or the output cannot be written. Nothing is written on
/// error.
pub fn run_consolidation(
    master: &Path,
    target: Target,
    config: &TransformConfig,
) -> Result<ConsolidationSummary> {
    if !master.is_dir() {
        return Err(RadiomicsError::NotADirectory(master.to_path_buf()));
    }

    info!("Scanning master folder: {}", master.display());
    let files = list_feature_files(master)?;

    info!("Phase 1: collecting column structure from {} files", files.len());
    let universe = discover_columns(&files, config);
    if universe.is_empty() {
        return Err(RadiomicsError::NoValidFiles(master.to_path_buf()));
    }

    info!("Phase 2: filling {} columns per patient", universe.len());
    let table = fill_rows(&files, &universe, config, target);
    if table.rows.is_empty() {
        return Err(RadiomicsError::NoValidFiles(master.to_path_buf()));
    }

    let output = master.join(COHORT_FILE);
    let mut buffer = Vec::new();
    table.write_csv(&mut buffer)?;
    fs::write(&output, buffer)?;

    Ok(ConsolidationSummary {
        output,
        patients: table.rows.len(),
        variables: table.columns.len(),
        target,
    })
}
