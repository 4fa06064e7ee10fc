use super::extractor::{retain_original, FeatureExtractor};
use crate::error::{RadiomicsError, Result};
use crate::labels::{present_segments, region_mask, ColorLut};
use crate::types::{FeatureRecord, FeatureTable};
use crate::volume::read_mgh;
use log::debug;
use std::path::{Path, PathBuf};

pub const MRI_DIR: &str = "mri";
pub const LABEL_VOLUME_FILE: &str = "aparc+aseg.mgz";
pub const STRUCTURAL_VOLUME_FILE: &str = "brain.mgz";
pub const STATS_DIR: &str = "stats";
pub const FEATURES_FILE: &str = "features.csv";

/// Location of a patient's feature table
pub fn features_path(folder: &Path) -> PathBuf {
    folder.join(STATS_DIR).join(FEATURES_FILE)
}

/// Volumes required to extract features for one patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientInputs {
    /// Segmentation (`mri/aparc+aseg.mgz`)
    pub labels: PathBuf,

    /// Structural image (`mri/brain.mgz`)
    pub structural: PathBuf,
}

impl PatientInputs {
    /// Finds the required volumes, or `None` if either is missing
    pub fn locate(folder: &Path) -> Option<Self> {
        let mri = folder.join(MRI_DIR);
        let labels = mri.join(LABEL_VOLUME_FILE);
        let structural = mri.join(STRUCTURAL_VOLUME_FILE);

        if labels.is_file() && structural.is_file() {
            Some(Self { labels, structural })
        } else {
            None
        }
    }
}

/// Result of processing one patient folder
#[derive(Debug)]
pub enum FolderOutcome {
    /// Features were extracted
    Extracted(FeatureTable),

    /// A required volume is missing
    MissingInputs,

    /// Loading or extraction failed
    Failed(RadiomicsError),
}

impl FolderOutcome {
    /// The extracted table, or `None` for a skipped or failed folder
    pub fn into_table(self) -> Option<FeatureTable> {
        match self {
            FolderOutcome::Extracted(table) => Some(table),
            FolderOutcome::MissingInputs | FolderOutcome::Failed(_) => None,
        }
    }
}

/// Extracts region features for one patient folder
///
/// Never fails: missing volumes and errors are reported through the
/// returned [`FolderOutcome`] so one bad folder cannot stop a batch.
pub fn process_folder(
    folder: &Path,
    lut: &ColorLut,
    extractor: &dyn FeatureExtractor,
) -> FolderOutcome {
    let Some(inputs) = PatientInputs::locate(folder) else {
        return FolderOutcome::MissingInputs;
    };

    match extract_features(&inputs, lut, extractor) {
        Ok(table) => FolderOutcome::Extracted(table),
        Err(e) => FolderOutcome::Failed(e),
    }
}

/// Extracts features for every region with more than one voxel
///
/// # Errors
///
/// Returns an error if a volume cannot be read, the volumes differ in
/// shape, or the extractor fails for any region
pub fn extract_features(
    inputs: &PatientInputs,
    lut: &ColorLut,
    extractor: &dyn FeatureExtractor,
) -> Result<FeatureTable> {
    let structural = read_mgh(&inputs.structural)?;
    let segmentation = read_mgh(&inputs.labels)?;

    if segmentation.geometry.dims != structural.geometry.dims {
        return Err(RadiomicsError::InvalidVolume {
            path: inputs.labels.clone(),
            reason: format!(
                "segmentation shape {:?} does not match structural shape {:?}",
                segmentation.geometry.dims, structural.geometry.dims
            ),
        });
    }

    let labels = segmentation.labels();
    drop(segmentation);

    let regions: Vec<_> = present_segments(&labels, lut)
        .into_iter()
        .filter(|r| r.is_extractable())
        .collect();

    let mut session = extractor.prepare(&structural)?;
    let mut records = Vec::with_capacity(regions.len());

    for (index, region) in regions.iter().enumerate() {
        debug!(
            "Region {}/{}: {} (id {}, {} voxels)",
            index + 1,
            regions.len(),
            region.name,
            region.id,
            region.voxel_count
        );

        let mask = region_mask(&labels, region.id);
        let features = retain_original(session.execute(&mask, region.id)?);

        records.push(FeatureRecord {
            color_id: region.id,
            struct_name: region.name.clone(),
            rgb: region.color,
            features,
        });
    }

    Ok(FeatureTable::new(records))
}
