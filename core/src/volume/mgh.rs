//! Loading FreeSurfer brain volumes stored in MGH / MGZ files.
//!
//! Decoding is done by `neuroformats`; this module bounds the claimed
//! volume size before any voxel buffer is allocated and converts the
//! result into a [`Volume`].

use super::{Geometry, Volume};
use crate::error::{RadiomicsError, Result};
use flate2::read::GzDecoder;
use ndarray::{Array3, ShapeBuilder};
use neuroformats::fs_mgh::{MRI_FLOAT, MRI_INT, MRI_SHORT, MRI_UCHAR};
use neuroformats::{FsMgh, FsMghHeader};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Upper bound on the voxels (all frames) one volume may claim
///
/// Conformed FreeSurfer volumes hold 256³ voxels.
pub const MAX_VOXELS: usize = 1 << 28;

fn invalid(path: &Path, reason: String) -> RadiomicsError {
    RadiomicsError::InvalidVolume {
        path: path.to_path_buf(),
        reason,
    }
}

/// Checks whether the file name ends with ".mgz" or ".gz"
pub fn is_compressed<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .map(|name| {
            let name = name.to_string_lossy();
            name.ends_with(".mgz") || name.ends_with(".gz")
        })
        .unwrap_or(false)
}

fn open_maybe_gz(path: &Path) -> Result<Box<dyn Read>> {
    let file = BufReader::new(File::open(path)?);
    if is_compressed(path) {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Reads only the header of an MGH or MGZ file and validates its size
///
/// # Errors
///
/// Returns an error if the header is unreadable, has a negative
/// dimension, an unsupported data type, or claims more than
/// [`MAX_VOXELS`] voxels
pub fn read_header(path: &Path) -> Result<FsMghHeader> {
    let mut reader = BufReader::new(open_maybe_gz(path)?);
    let header = FsMghHeader::from_reader(&mut reader)
        .map_err(|e| invalid(path, format!("unreadable header: {}", e)))?;
    checked_voxel_count(&header, path)?;
    Ok(header)
}

/// Total voxel count of all frames, bounded by [`MAX_VOXELS`]
fn checked_voxel_count(header: &FsMghHeader, path: &Path) -> Result<usize> {
    if ![MRI_UCHAR, MRI_INT, MRI_FLOAT, MRI_SHORT].contains(&header.dtype) {
        return Err(RadiomicsError::UnsupportedDataType(header.dtype));
    }

    let dims = [
        header.dim1len,
        header.dim2len,
        header.dim3len,
        header.dim4len,
    ];
    let mut total: usize = 1;
    for dim in dims {
        let dim = usize::try_from(dim)
            .map_err(|_| invalid(path, format!("negative dimension in {:?}", dims)))?;
        total = total
            .checked_mul(dim)
            .filter(|&n| n <= MAX_VOXELS)
            .ok_or_else(|| {
                invalid(
                    path,
                    format!("dimensions {:?} exceed {} voxels", dims, MAX_VOXELS),
                )
            })?;
    }
    Ok(total)
}

/// First `count` values in file order, converted to `f32`
fn first_frame<T: Copy>(
    values: Option<&[T]>,
    count: usize,
    convert: impl Fn(T) -> f32,
) -> Option<Vec<f32>> {
    values
        .filter(|v| v.len() >= count)
        .map(|v| v[..count].iter().map(|&x| convert(x)).collect())
}

fn geometry(mgh: &FsMgh, dims: [usize; 3], path: &Path) -> Result<Geometry> {
    if mgh.header.is_ras_good != 1 {
        return Ok(Geometry::unit(dims));
    }

    let vox2ras = mgh
        .vox2ras()
        .map_err(|e| invalid(path, format!("no voxel-to-RAS transform: {}", e)))?;
    let mut affine = [[0.0f32; 4]; 4];
    for (i, row) in affine.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = vox2ras[[i, j]];
        }
    }

    Ok(Geometry {
        dims,
        voxel_size: mgh.header.delta,
        affine,
    })
}

/// Reads an MGH or MGZ file
///
/// Only the first frame of multi-frame volumes is kept. Voxels are
/// converted to `f32` whatever their stored type.
pub fn read_mgh<P: AsRef<Path>>(path: P) -> Result<Volume> {
    let path = path.as_ref();
    let header = read_header(path)?;
    let dims = [
        header.dim1len as usize,
        header.dim2len as usize,
        header.dim3len as usize,
    ];
    let count: usize = dims.iter().product();

    let mgh = neuroformats::read_mgh(path)
        .map_err(|e| invalid(path, format!("unreadable voxel data: {}", e)))?;

    // Memory order is file order: first axis fastest, frames last
    let data = &mgh.data;
    let values = match header.dtype {
        MRI_UCHAR => first_frame(
            data.mri_uchar.as_ref().and_then(|a| a.as_slice_memory_order()),
            count,
            f32::from,
        ),
        MRI_SHORT => first_frame(
            data.mri_short.as_ref().and_then(|a| a.as_slice_memory_order()),
            count,
            f32::from,
        ),
        MRI_INT => first_frame(
            data.mri_int.as_ref().and_then(|a| a.as_slice_memory_order()),
            count,
            |v: i32| v as f32,
        ),
        MRI_FLOAT => first_frame(
            data.mri_float.as_ref().and_then(|a| a.as_slice_memory_order()),
            count,
            |v: f32| v,
        ),
        other => return Err(RadiomicsError::UnsupportedDataType(other)),
    }
    .ok_or_else(|| invalid(path, "voxel data missing".to_string()))?;

    let [d1, d2, d3] = dims;
    let array = Array3::from_shape_vec((d1, d2, d3).f(), values)
        .map_err(|e| invalid(path, e.to_string()))?;

    Volume::new(geometry(&mgh, dims, path)?, array)
}

/// Writes small MGH / MGZ fixtures for tests
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const HEADER_LEN: usize = 284;

    pub(crate) fn header_bytes(dims: [usize; 4], dtype: i32, delta: [f32; 3]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&1i32.to_be_bytes());
        for d in dims {
            bytes.extend_from_slice(&(d as i32).to_be_bytes());
        }
        bytes.extend_from_slice(&dtype.to_be_bytes());
        bytes.extend_from_slice(&0i32.to_be_bytes());
        bytes.extend_from_slice(&1i16.to_be_bytes());
        for v in delta {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        for v in [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        for v in [0.0f32; 3] {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        bytes.resize(HEADER_LEN, 0);
        bytes
    }

    /// Writes raw MGH bytes, gzipped
    pub(crate) fn write_mgz_bytes(path: &Path, bytes: &[u8]) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
        encoder.write_all(bytes).unwrap();
        encoder.finish().unwrap();
    }

    /// Writes `data` as a gzipped MGH volume of MRI_INT voxels
    pub(crate) fn write_int_mgz(path: &Path, data: &Array3<i32>) {
        let shape = data.shape();
        let mut bytes = header_bytes([shape[0], shape[1], shape[2], 1], MRI_INT, [1.0; 3]);
        // Reversed axes iterate the original first axis fastest
        for v in data.t().iter() {
            bytes.extend_from_slice(&v.to_be_bytes());
        }
        write_mgz_bytes(path, &bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{header_bytes, write_int_mgz, write_mgz_bytes};
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_mgz_round_trip_preserves_axis_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("aseg.mgz");

        let mut labels = Array3::<i32>::zeros((3, 2, 2));
        labels[[2, 0, 0]] = 17;
        labels[[0, 1, 1]] = 53;
        write_int_mgz(&path, &labels);

        let volume = read_mgh(&path).unwrap();
        assert_eq!(volume.geometry.dims, [3, 2, 2]);
        assert_eq!(volume.data[[2, 0, 0]], 17.0);
        assert_eq!(volume.data[[0, 1, 1]], 53.0);
        assert_eq!(volume.labels(), labels);
    }

    #[test]
    fn test_uncompressed_float_volume() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("brain.mgh");

        let mut bytes = header_bytes([2, 1, 1, 1], MRI_FLOAT, [0.5, 0.5, 2.0]);
        bytes.extend_from_slice(&1.5f32.to_be_bytes());
        bytes.extend_from_slice(&(-3.25f32).to_be_bytes());
        fs::write(&path, bytes).unwrap();

        let volume = read_mgh(&path).unwrap();
        assert_eq!(volume.geometry.voxel_size, [0.5, 0.5, 2.0]);
        assert_eq!(volume.data[[0, 0, 0]], 1.5);
        assert_eq!(volume.data[[1, 0, 0]], -3.25);
    }

    #[test]
    fn test_multi_frame_keeps_first_frame() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("frames.mgh");

        let mut bytes = header_bytes([2, 1, 1, 2], MRI_UCHAR, [1.0; 3]);
        bytes.extend_from_slice(&[7, 9, 100, 100]);
        fs::write(&path, bytes).unwrap();

        let volume = read_mgh(&path).unwrap();
        assert_eq!(volume.data.len(), 2);
        assert_eq!(volume.data[[1, 0, 0]], 9.0);
    }

    #[test]
    fn test_affine_has_voxel_size_and_homogeneous_row() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scaled.mgh");

        let mut bytes = header_bytes([4, 4, 4, 1], MRI_UCHAR, [2.0, 2.0, 2.0]);
        bytes.extend_from_slice(&[0; 64]);
        fs::write(&path, bytes).unwrap();

        let affine = read_mgh(&path).unwrap().geometry.affine;
        assert_eq!(affine[0][0], 2.0);
        assert_eq!(affine[3], [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.mgh");

        let mut bytes = header_bytes([1, 1, 1, 1], MRI_UCHAR, [1.0; 3]);
        bytes[3] = 2;
        bytes.push(0);
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            read_mgh(&path),
            Err(RadiomicsError::InvalidVolume { .. })
        ));
    }

    #[test]
    fn test_unknown_data_type_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("odd.mgh");

        let mut bytes = header_bytes([1, 1, 1, 1], 7, [1.0; 3]);
        bytes.extend_from_slice(&[0; 8]);
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            read_mgh(&path),
            Err(RadiomicsError::UnsupportedDataType(7))
        ));
    }

    #[test]
    fn test_truncated_data_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.mgh");

        let mut bytes = header_bytes([4, 4, 4, 1], MRI_INT, [1.0; 3]);
        bytes.extend_from_slice(&[0; 10]);
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            read_mgh(&path),
            Err(RadiomicsError::InvalidVolume { .. })
        ));
    }

    #[test]
    fn test_oversized_header_is_rejected_before_reading_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("huge.mgz");
        write_mgz_bytes(
            &path,
            &header_bytes([100_000, 100_000, 100_000, 1], MRI_INT, [1.0; 3]),
        );

        let result = read_mgh(&path);
        assert!(matches!(
            result,
            Err(RadiomicsError::InvalidVolume { ref reason, .. }) if reason.contains("exceed")
        ));
    }

    #[test]
    fn test_negative_dimension_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("negative.mgh");

        let mut bytes = header_bytes([1, 1, 1, 1], MRI_UCHAR, [1.0; 3]);
        bytes[4..8].copy_from_slice(&(-5i32).to_be_bytes());
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            read_header(&path),
            Err(RadiomicsError::InvalidVolume { .. })
        ));
    }

    #[test]
    fn test_is_compressed() {
        assert!(is_compressed("mri/aparc+aseg.mgz"));
        assert!(is_compressed("mri/brain.nii.gz"));
        assert!(!is_compressed("mri/brain.mgh"));
    }
}
