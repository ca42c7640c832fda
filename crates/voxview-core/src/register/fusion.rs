use image::{Rgb, RgbImage};
use ndarray::{Array3, ArrayView2};

use crate::consts::DISPLAY_MAX;
use crate::error::{Result, ViewerError};
use crate::volume::min_max;

/// Blend two slices into an RGB overlay.
///
/// Both inputs are stretched to `[0, 1]` by their own min/max. Red carries
/// `a` weighted by `1 - alpha`, green carries `b` weighted by `alpha`, blue
/// stays empty. The result has shape `(rows, cols, 3)`.
pub fn fuse(a: &ArrayView2<'_, f32>, b: &ArrayView2<'_, f32>, alpha: f32) -> Result<Array3<u8>> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(ViewerError::InvalidArgument(format!(
            "fusion alpha must be in [0, 1] (got {alpha})"
        )));
    }
    if a.dim() != b.dim() {
        return Err(ViewerError::ShapeMismatch {
            left: a.shape().to_vec(),
            right: b.shape().to_vec(),
        });
    }

    let norm_a = normalizer(a);
    let norm_b = normalizer(b);
    let (rows, cols) = a.dim();
    let alpha = alpha as f64;

    Ok(Array3::from_shape_fn((rows, cols, 3), |(row, col, channel)| {
        let value = match channel {
            0 => norm_a(a[[row, col]]) * (1.0 - alpha),
            1 => norm_b(b[[row, col]]) * alpha,
            _ => 0.0,
        };
        (value * DISPLAY_MAX).round().clamp(0.0, DISPLAY_MAX) as u8
    }))
}

/// Convert an `(rows, cols, 3)` array into an image buffer.
pub fn to_rgb_image(rgb: &Array3<u8>) -> RgbImage {
    let (rows, cols, _) = rgb.dim();
    RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        let (r, c) = (y as usize, x as usize);
        Rgb([rgb[[r, c, 0]], rgb[[r, c, 1]], rgb[[r, c, 2]]])
    })
}

fn normalizer(data: &ArrayView2<'_, f32>) -> impl Fn(f32) -> f64 {
    let (min, max) = min_max(data.iter().copied());
    let span = (max - min) as f64;
    move |v| {
        if span > 0.0 {
            (v - min) as f64 / span
        } else {
            0.0
        }
    }
}
