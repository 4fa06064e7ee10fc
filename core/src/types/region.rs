use super::Rgb;

/// Id reserved for background voxels
pub const BACKGROUND_ID: i32 = 0;

/// One anatomical structure present in a label volume
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRow {
    /// Label value of the structure's voxels
    pub id: i32,

    /// Structure name from the color lookup table
    pub name: String,

    /// Number of voxels carrying this label
    pub voxel_count: usize,

    /// Display color from the color lookup table
    pub color: Rgb,
}

impl RegionRow {
    /// Checks whether features should be extracted for this region
    ///
    /// Background is never extracted, and single-voxel regions are too
    /// small for texture features.
    pub fn is_extractable(&self) -> bool {
        self.id > BACKGROUND_ID && self.voxel_count > 1
    }
}
