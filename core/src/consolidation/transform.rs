use super::config::TransformConfig;
use crate::error::{RadiomicsError, Result};
use crate::types::{CellValue, Rejection, STRUCT_NAME_COLUMN};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

/// One patient's feature table pivoted into a single row
///
/// `columns[i]` names `values[i]`; names are `StructName_Variable`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow {
    pub patient: String,
    pub columns: Vec<String>,
    pub values: Vec<CellValue>,
}

impl PatientRow {
    /// Column and value pairs, in table order
    pub fn cells(&self) -> impl Iterator<Item = (&str, CellValue)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Reads and pivots one `features.csv`
///
/// # Errors
///
/// Returns an error if the file cannot be read as CSV or has no
/// `StructName` column
pub fn transform_features_file(
    path: &Path,
    patient: &str,
    config: &TransformConfig,
) -> Result<PatientRow> {
    let file = std::fs::File::open(path)?;
    transform_features(file, path, patient, config)
}

/// Pivots a feature table from one row per structure to one wide row
///
/// Dropped columns and structures are removed first. Every remaining
/// `(structure, variable)` cell becomes a column named
/// `structure_variable`, holding the normalized value.
pub fn transform_features<R: Read>(
    input: R,
    path: &Path,
    patient: &str,
    config: &TransformConfig,
) -> Result<PatientRow> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);
    let headers = reader.headers()?.clone();

    let struct_index = headers
        .iter()
        .position(|h| h == STRUCT_NAME_COLUMN)
        .ok_or_else(|| RadiomicsError::MissingColumn {
            path: path.to_path_buf(),
            column: STRUCT_NAME_COLUMN.to_string(),
        })?;

    let variables: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(i, name)| *i != struct_index && !config.drops_column(name))
        .collect();

    let mut columns = Vec::new();
    let mut values = Vec::new();

    for result in reader.records() {
        let record = result?;
        let structure = record.get(struct_index).unwrap_or("");
        if config.drops_structure(structure) {
            continue;
        }

        for &(index, variable) in &variables {
            let raw = record.get(index).unwrap_or("");
            let (value, rejection) = CellValue::normalize(raw);
            match rejection {
                None | Some(Rejection::Empty) => {}
                Some(Rejection::Complex) => warn!(
                    "Complex value in {}, structure {}, variable {}: {}",
                    patient, structure, variable, raw
                ),
                Some(reason) => debug!(
                    "Unusable value in {}, structure {}, variable {}: {:?} ({:?})",
                    patient, structure, variable, raw, reason
                ),
            }

            columns.push(format!("{}_{}", structure, variable));
            values.push(value);
        }
    }

    Ok(PatientRow {
        patient: patient.to_string(),
        columns,
        values,
    })
}
