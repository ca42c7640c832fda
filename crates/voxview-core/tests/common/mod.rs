#![allow(dead_code)]

use std::path::Path;

use image::{ImageBuffer, Luma, Rgb};
use ndarray::{Array2, Array3};

use voxview_core::volume::Volume;

/// Volume whose voxel value encodes its index: `v = 100*i + 10*j + k`.
pub fn indexed_volume(shape: (usize, usize, usize)) -> Volume {
    Volume::new(Array3::from_shape_fn(shape, |(i, j, k)| {
        (100 * i + 10 * j + k) as f32
    }))
}

/// Horizontal ramp, value = column index.
pub fn ramp(rows: usize, cols: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(_, c)| c as f32)
}

/// Gaussian blob of peak 1000 centred at `(cy, cx)`.
pub fn gaussian_blob(rows: usize, cols: usize, cy: f64, cx: f64, sigma: f64) -> Array2<f32> {
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let d2 = (r as f64 - cy).powi(2) + (c as f64 - cx).powi(2);
        (1000.0 * (-d2 / (2.0 * sigma * sigma)).exp()) as f32
    })
}

/// Binary image with a bright square `[lo, hi)` on a zero background.
pub fn square_image(size: usize, lo: usize, hi: usize) -> Array2<f32> {
    Array2::from_shape_fn((size, size), |(r, c)| {
        if (lo..hi).contains(&r) && (lo..hi).contains(&c) {
            255.0
        } else {
            0.0
        }
    })
}

/// Write a 16-bit PNG slice file.
pub fn write_png_slice(path: &Path, width: u32, height: u32, value: impl Fn(u32, u32) -> u16) {
    let img = ImageBuffer::<Luma<u16>, Vec<u16>>::from_fn(width, height, |x, y| Luma([value(x, y)]));
    img.save(path).expect("write PNG slice");
}

/// 8-bit greyscale PNG.
pub fn write_png8_slice(path: &Path, width: u32, height: u32, value: impl Fn(u32, u32) -> u8) {
    let img = ImageBuffer::<Luma<u8>, Vec<u8>>::from_fn(width, height, |x, y| Luma([value(x, y)]));
    img.save(path).expect("write 8-bit PNG slice");
}

/// 8-bit RGB PNG with equal channels.
pub fn write_rgb8_slice(path: &Path, width: u32, height: u32, value: impl Fn(u32, u32) -> u8) {
    let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_fn(width, height, |x, y| {
        let v = value(x, y);
        Rgb([v, v, v])
    });
    img.save(path).expect("write RGB PNG slice");
}
