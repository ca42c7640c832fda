mod common;

use ndarray::{s, Array3};

use voxview_core::error::ViewerError;
use voxview_core::types::SliceAxis;
use voxview_core::volume::{HeaderElement, LoadError, Volume, VolumeLoader};

use dicom::core::Tag;

#[test]
fn test_slice_along_third_axis_matches_volume() {
    let volume = common::indexed_volume((10, 10, 3));
    let slice = volume.slice(SliceAxis::Third, 0).unwrap();
    assert_eq!(slice, volume.data().slice(s![.., .., 0]));
}

#[test]
fn test_slice_out_of_range_is_index_error() {
    let volume = common::indexed_volume((10, 10, 3));
    let err = volume.slice(SliceAxis::Third, 3).unwrap_err();
    assert!(matches!(
        err,
        ViewerError::IndexOutOfRange {
            axis: 2,
            index: 3,
            len: 3
        }
    ));
}

#[test]
fn test_length_per_axis() {
    let volume = common::indexed_volume((4, 5, 6));
    assert_eq!(volume.len(SliceAxis::First), 4);
    assert_eq!(volume.len(SliceAxis::Second), 5);
    assert_eq!(volume.len(SliceAxis::Third), 6);
}

#[test]
fn test_slice_shapes_per_axis() {
    let volume = common::indexed_volume((4, 5, 6));
    assert_eq!(volume.slice(SliceAxis::First, 1).unwrap().dim(), (5, 6));
    assert_eq!(volume.slice(SliceAxis::Second, 1).unwrap().dim(), (4, 6));
    assert_eq!(volume.slice(SliceAxis::Third, 1).unwrap().dim(), (4, 5));
}

#[test]
fn test_voxel_and_min_max() {
    let volume = common::indexed_volume((3, 4, 5));
    assert_eq!(volume.voxel(SliceAxis::First, 2, 3, 4).unwrap(), 234.0);
    assert_eq!(volume.voxel(SliceAxis::Second, 1, 2, 3).unwrap(), 213.0);
    assert!(volume.voxel(SliceAxis::First, 0, 4, 0).is_err());
    assert_eq!(volume.min_value(), 0.0);
    assert_eq!(volume.max_value(), 234.0);
    assert_eq!(volume.slice_min_max(SliceAxis::First, 1).unwrap(), (100.0, 134.0));
}

#[test]
fn test_in_plane_spacing_follows_axis() {
    let volume = Volume::new(Array3::zeros((2, 2, 2))).with_spacing([3.0, 0.5, 0.7]);
    assert_eq!(volume.in_plane_spacing(SliceAxis::First), Some((0.5, 0.7)));
    assert_eq!(volume.in_plane_spacing(SliceAxis::Second), Some((3.0, 0.7)));
    assert_eq!(volume.in_plane_spacing(SliceAxis::Third), Some((3.0, 0.5)));
}

#[test]
fn test_header_entries_skip_unprintable_and_restart() {
    let volume = Volume::new(Array3::zeros((1, 1, 1))).with_header(vec![
        HeaderElement::new(Tag(0x0010, 0x0010), "Doe^John", Some(8)),
        HeaderElement::unprintable(Tag(0x0008, 0x1140), None),
        HeaderElement::new(Tag(0x0008, 0x0060), "CT", Some(2)),
    ]);

    let first: Vec<_> = volume.header_entries().map(|e| e.value).collect();
    let second: Vec<_> = volume.header_entries().map(|e| e.key()).collect();
    assert_eq!(first, vec!["Doe^John", "CT"]);
    assert_eq!(second, vec!["(0010,0010)", "(0008,0060)"]);
}

#[test]
fn test_directory_series_sorted_numerically() {
    let dir = tempfile::tempdir().unwrap();
    for key in [10u16, 2, 1] {
        let path = dir.path().join(format!("slice_{key}.png"));
        common::write_png_slice(&path, 4, 3, |_, _| key);
    }
    std::fs::write(dir.path().join(".hidden"), b"ignored").unwrap();

    let volume = VolumeLoader::load(dir.path()).unwrap();
    assert_eq!(volume.shape(), [3, 3, 4]);
    let firsts: Vec<f32> = (0..3)
        .map(|i| volume.voxel(SliceAxis::First, i, 0, 0).unwrap())
        .collect();
    assert_eq!(firsts, vec![1.0, 2.0, 10.0]);
    assert_eq!(volume.source(), Some(dir.path()));
}

#[test]
fn test_directory_series_rejects_mismatched_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    common::write_png_slice(&dir.path().join("1.png"), 4, 4, |_, _| 1);
    common::write_png_slice(&dir.path().join("2.png"), 5, 4, |_, _| 2);

    let err = VolumeLoader::load(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::InconsistentDimensions {
            expected: (4, 4),
            found: (4, 5),
            ..
        }
    ));
}

#[test]
fn test_directory_series_requires_numeric_names() {
    let dir = tempfile::tempdir().unwrap();
    common::write_png_slice(&dir.path().join("1.png"), 2, 2, |_, _| 1);
    common::write_png_slice(&dir.path().join("scout.png"), 2, 2, |_, _| 1);

    let err = VolumeLoader::load(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::MissingNumericKey(_)));
}

#[test]
fn test_empty_directory_has_no_slices() {
    let dir = tempfile::tempdir().unwrap();
    let err = VolumeLoader::load(dir.path()).unwrap_err();
    assert!(matches!(err, LoadError::NoValidImages(_)));
}

#[test]
fn test_missing_source() {
    let err = VolumeLoader::load("/definitely/not/here.dcm").unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
}

#[test]
fn test_single_raster_file_is_one_slice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.png");
    common::write_png_slice(&path, 6, 2, |x, y| (x + 10 * y) as u16);

    let volume = VolumeLoader::load(&path).unwrap();
    assert_eq!(volume.shape(), [1, 2, 6]);
    assert_eq!(volume.voxel(SliceAxis::First, 0, 1, 5).unwrap(), 15.0);
}

#[test]
fn test_eight_bit_raster_keeps_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let gray = dir.path().join("gray.png");
    common::write_png8_slice(&gray, 4, 2, |x, y| if x == 3 && y == 1 { 255 } else { 200 });

    let volume = VolumeLoader::load(&gray).unwrap();
    assert_eq!(volume.voxel(SliceAxis::First, 0, 0, 0).unwrap(), 200.0);
    assert_eq!(volume.max_value(), 255.0);

    let rgb = dir.path().join("rgb.png");
    common::write_rgb8_slice(&rgb, 4, 2, |_, _| 200);
    let volume = VolumeLoader::load(&rgb).unwrap();
    assert_eq!(volume.voxel(SliceAxis::First, 0, 1, 3).unwrap(), 200.0);
}

#[test]
fn test_garbage_file_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.dcm");
    std::fs::write(&path, b"not a dicom file").unwrap();
    assert!(VolumeLoader::load(&path).is_err());
}
