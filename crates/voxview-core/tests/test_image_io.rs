mod common;

use ndarray::{Array2, Array3};

use voxview_core::image_io::{save_gray, save_raw_u16, save_rgb};
use voxview_core::types::SliceAxis;
use voxview_core::volume::VolumeLoader;

#[test]
fn test_save_gray_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slice.png");
    let data = Array2::from_shape_fn((3, 5), |(r, c)| (r * 50 + c) as u8);
    save_gray(&data, &path).unwrap();

    let img = image::open(&path).unwrap().to_luma8();
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(4, 2).0[0], 104);
}

#[test]
fn test_save_gray_tiff_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slice.tif");
    save_gray(&Array2::from_elem((2, 2), 9u8), &path).unwrap();
    assert_eq!(
        image::ImageFormat::from_path(&path).unwrap(),
        image::ImageFormat::Tiff
    );
    assert!(image::open(&path).is_ok());
}

#[test]
fn test_save_rgb() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fused.png");
    let mut rgb = Array3::<u8>::zeros((2, 4, 3));
    rgb[[1, 3, 0]] = 200;
    rgb[[1, 3, 1]] = 10;
    save_rgb(&rgb, &path).unwrap();

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.get_pixel(3, 1).0, [200, 10, 0]);
}

#[test]
fn test_save_rgb_rejects_wrong_channel_count() {
    let dir = tempfile::tempdir().unwrap();
    let rgb = Array3::<u8>::zeros((2, 2, 4));
    assert!(save_rgb(&rgb, &dir.path().join("bad.png")).is_err());
}

#[test]
fn test_raw_slice_reloads_as_a_volume() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw_1.png");
    save_raw_u16(&common::ramp(4, 6), &path).unwrap();

    let volume = VolumeLoader::load(&path).unwrap();
    assert_eq!(volume.shape(), [1, 4, 6]);
    let slice = volume.slice(SliceAxis::First, 0).unwrap();
    assert_eq!(slice[[0, 0]], 0.0);
    assert_eq!(slice[[3, 5]], 65535.0);
}
