//! Voxel volumes and their on-disk formats
//!
//! - [`Volume`]: a 3-D voxel array with its scanner geometry
//! - [`mgh`]: reading FreeSurfer MGH/MGZ files
//! - [`nifti_export`]: writing volumes as NIfTI for external tools

pub mod mgh;
pub mod nifti_export;

use crate::error::{RadiomicsError, Result};
use ndarray::Array3;
use std::path::PathBuf;

pub use mgh::read_mgh;
pub use nifti_export::write_nifti;

/// Identity voxel-to-world transform
pub const IDENTITY_AFFINE: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Spatial layout of a volume
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// Number of voxels along each axis
    pub dims: [usize; 3],

    /// Voxel size in millimetres
    pub voxel_size: [f32; 3],

    /// Voxel index to RAS world coordinates
    pub affine: [[f32; 4]; 4],
}

impl Geometry {
    /// Creates a unit-spaced geometry with an identity affine
    pub fn unit(dims: [usize; 3]) -> Self {
        Self {
            dims,
            voxel_size: [1.0; 3],
            affine: IDENTITY_AFFINE,
        }
    }

    /// Total voxel count
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A loaded voxel volume
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub geometry: Geometry,
    pub data: Array3<f32>,
}

impl Volume {
    /// Creates a volume, checking that the data matches the geometry
    pub fn new(geometry: Geometry, data: Array3<f32>) -> Result<Self> {
        if data.shape() != geometry.dims.as_slice() {
            return Err(RadiomicsError::InvalidVolume {
                path: PathBuf::new(),
                reason: format!(
                    "data shape {:?} does not match geometry {:?}",
                    data.shape(),
                    geometry.dims
                ),
            });
        }
        Ok(Self { geometry, data })
    }

    /// Voxel values rounded to integer labels
    pub fn labels(&self) -> Array3<i32> {
        self.data.mapv(|v| v.round() as i32)
    }
}
