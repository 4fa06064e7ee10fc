use crate::error::Result;
use crate::types::FeatureValue;
use crate::volume::Volume;
use ndarray::Array3;

/// Substring marking features computed on the unfiltered image
pub const ORIGINAL_FEATURE_MARKER: &str = "original";

/// Named feature values in extractor order
pub type FeatureMap = Vec<(String, FeatureValue)>;

/// Radiomics feature extractor
///
/// Features are computed over one structural image for many region masks,
/// so the image is bound once with [`FeatureExtractor::prepare`].
pub trait FeatureExtractor {
    /// Binds the structural image features are computed over
    fn prepare<'a>(&'a self, image: &'a Volume) -> Result<Box<dyn PreparedExtractor + 'a>>;
}

/// An extractor bound to a structural image
pub trait PreparedExtractor {
    /// Computes features for the voxels of `mask` equal to `label`
    ///
    /// `mask` has the shape of the bound image.
    fn execute(&mut self, mask: &Array3<i32>, label: i32) -> Result<FeatureMap>;
}

/// Keeps only features of the unfiltered image
///
/// Drops extractor diagnostics that do not describe the original image
/// and every filtered or derived feature family.
pub fn retain_original(features: FeatureMap) -> FeatureMap {
    features
        .into_iter()
        .filter(|(name, _)| name.contains(ORIGINAL_FEATURE_MARKER))
        .collect()
}
