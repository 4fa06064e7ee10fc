use super::extractor::{FeatureExtractor, FeatureMap, PreparedExtractor};
use crate::error::{RadiomicsError, Result};
use crate::types::FeatureValue;
use crate::volume::nifti_export::{write_label_nifti, write_nifti};
use crate::volume::{Geometry, Volume};
use log::debug;
use ndarray::Array3;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tempfile::TempDir;

/// Default executable name of the pyradiomics command-line tool
pub const DEFAULT_PROGRAM: &str = "pyradiomics";

/// Feature extractor backed by the `pyradiomics` command-line tool
///
/// Volumes are exported to NIfTI in a scratch directory and the tool's
/// JSON output is parsed back into a [`FeatureMap`].
#[derive(Debug, Clone)]
pub struct PyRadiomicsCli {
    /// Executable to run
    pub program: PathBuf,

    /// Optional pyradiomics parameter file
    pub params: Option<PathBuf>,
}

impl Default for PyRadiomicsCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            params: None,
        }
    }
}

impl PyRadiomicsCli {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            params: None,
        }
    }

    /// Builder: Set the parameter file
    pub fn with_params<P: Into<PathBuf>>(mut self, params: P) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Builds the command for one image / mask pair
    fn command(&self, image: &Path, mask: &Path, label: i32) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(image)
            .arg(mask)
            .arg("--label")
            .arg(label.to_string())
            .arg("--format")
            .arg("json");
        if let Some(params) = &self.params {
            command.arg("--param").arg(params);
        }
        command
    }
}

impl FeatureExtractor for PyRadiomicsCli {
    fn prepare<'a>(&'a self, image: &'a Volume) -> Result<Box<dyn PreparedExtractor + 'a>> {
        let scratch = tempfile::Builder::new().prefix("radextract-").tempdir()?;
        let image_path = scratch.path().join("image.nii");
        write_nifti(&image_path, image)?;

        Ok(Box::new(PyRadiomicsSession {
            cli: self,
            geometry: &image.geometry,
            scratch,
            image_path,
        }))
    }
}

/// A structural image exported for repeated pyradiomics runs
///
/// The scratch directory is removed on drop.
struct PyRadiomicsSession<'a> {
    cli: &'a PyRadiomicsCli,
    geometry: &'a Geometry,
    scratch: TempDir,
    image_path: PathBuf,
}

impl PreparedExtractor for PyRadiomicsSession<'_> {
    fn execute(&mut self, mask: &Array3<i32>, label: i32) -> Result<FeatureMap> {
        let mask_path = self.scratch.path().join("mask.nii");
        write_label_nifti(&mask_path, self.geometry, mask)?;

        let mut command = self.cli.command(&self.image_path, &mask_path, label);
        debug!("Running {:?}", command);

        let output = command.output().map_err(|e| {
            RadiomicsError::ExtractorError(format!(
                "failed to run {}: {}",
                self.cli.program.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
            return Err(RadiomicsError::ExtractorError(format!(
                "{} exited with {} for label {}: {}",
                self.cli.program.display(),
                output.status,
                label,
                last_line.unwrap_or("no error output")
            )));
        }

        parse_json_output(&output.stdout)
    }
}

/// Quotes the bare `NaN`, `Infinity` and `-Infinity` tokens Python's
/// `json` module emits, leaving string literals untouched
fn quote_non_finite(text: &str) -> Cow<'_, str> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r#""(?:[^"\\]|\\.)*"|-?\bInfinity\b|\bNaN\b"#)
            .expect("Failed to compile regex")
    });
    re.replace_all(text, |caps: &Captures| {
        let token = &caps[0];
        if token.starts_with('"') {
            token.to_string()
        } else {
            format!("\"{}\"", token)
        }
    })
}

/// Parses the feature object printed by `pyradiomics --format json`
///
/// The last JSON object on stdout wins. Non-finite values are kept as
/// text features.
pub fn parse_json_output(stdout: &[u8]) -> Result<FeatureMap> {
    let text = String::from_utf8_lossy(stdout);
    let text = quote_non_finite(&text);

    let mut last = None;
    for item in serde_json::Deserializer::from_str(&text).into_iter::<Map<String, Value>>() {
        last = Some(item?);
    }

    let object = last.ok_or_else(|| {
        RadiomicsError::ExtractorError("extractor printed no JSON output".to_string())
    })?;

    Ok(object
        .into_iter()
        .map(|(name, value)| (name, FeatureValue::from(value)))
        .collect())
}
