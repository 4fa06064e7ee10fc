use super::{Geometry, Volume};
use crate::error::Result;
use ndarray::Array3;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;
use std::path::Path;

/// NIfTI code for scanner-anatomical coordinates
const NIFTI_XFORM_SCANNER_ANAT: i16 = 1;

/// Builds a NIfTI header carrying the geometry as its sform
pub fn header_for(geometry: &Geometry) -> NiftiHeader {
    let mut header = NiftiHeader::default();
    let [_, px, py, pz, ..] = &mut header.pixdim;
    let [sx, sy, sz] = geometry.voxel_size;
    (*px, *py, *pz) = (sx, sy, sz);

    header.sform_code = NIFTI_XFORM_SCANNER_ANAT;
    header.srow_x = geometry.affine[0];
    header.srow_y = geometry.affine[1];
    header.srow_z = geometry.affine[2];
    header
}

/// Writes an intensity volume as a NIfTI-1 file
///
/// A `.nii.gz` path is compressed by the writer.
pub fn write_nifti<P: AsRef<Path>>(path: P, volume: &Volume) -> Result<()> {
    let header = header_for(&volume.geometry);
    WriterOptions::new(path.as_ref())
        .reference_header(&header)
        .write_nifti(&volume.data)?;
    Ok(())
}

/// Writes an integer label image as a NIfTI-1 file
pub fn write_label_nifti<P: AsRef<Path>>(
    path: P,
    geometry: &Geometry,
    labels: &Array3<i32>,
) -> Result<()> {
    let header = header_for(geometry);
    WriterOptions::new(path.as_ref())
        .reference_header(&header)
        .write_nifti(labels)?;
    Ok(())
}
