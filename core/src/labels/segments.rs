use super::ColorLut;
use crate::types::RegionRow;
use ndarray::Array3;
use std::collections::BTreeMap;

/// Lists every label present in a volume, in ascending id order
///
/// Background (id 0) is included; callers decide which regions to keep.
pub fn present_segments(labels: &Array3<i32>, lut: &ColorLut) -> Vec<RegionRow> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for &id in labels.iter() {
        *counts.entry(id).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(id, voxel_count)| RegionRow {
            id,
            name: lut.name(id),
            voxel_count,
            color: lut.color(id),
        })
        .collect()
}

/// Label image holding only one region
///
/// Voxels of the region keep their id, everything else becomes 0.
pub fn region_mask(labels: &Array3<i32>, id: i32) -> Array3<i32> {
    labels.mapv(|v| if v == id { id } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgb;

    fn sample_labels() -> Array3<i32> {
        let mut labels = Array3::zeros((3, 3, 2));
        labels[[0, 0, 0]] = 17;
        labels[[0, 1, 0]] = 17;
        labels[[1, 1, 1]] = 17;
        labels[[2, 2, 1]] = 53;
        labels[[2, 0, 1]] = 9999;
        labels
    }

    #[test]
    fn test_present_segments_counts_voxels() {
        let regions = present_segments(&sample_labels(), &ColorLut::embedded());

        let ids: Vec<i32> = regions.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 17, 53, 9999]);

        assert_eq!(regions[0].voxel_count, 13);
        assert_eq!(regions[1].voxel_count, 3);
        assert_eq!(regions[1].name, "Left-Hippocampus");
        assert_eq!(regions[1].color, Rgb::new(220, 216, 20));
        assert_eq!(regions[2].voxel_count, 1);
        assert_eq!(regions[3].name, "Unknown-9999");
    }

    #[test]
    fn test_region_mask_keeps_only_one_label() {
        let mask = region_mask(&sample_labels(), 17);

        assert_eq!(mask.iter().filter(|&&v| v == 17).count(), 3);
        assert_eq!(mask.iter().filter(|&&v| v != 0 && v != 17).count(), 0);
        assert_eq!(mask[[0, 0, 0]], 17);
        assert_eq!(mask[[2, 2, 1]], 0);
    }

    #[test]
    fn test_present_segments_of_empty_volume() {
        let labels = Array3::<i32>::zeros((0, 0, 0));
        assert!(present_segments(&labels, &ColorLut::default()).is_empty());
    }
}
