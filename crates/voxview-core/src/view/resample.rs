use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::types::DisplaySize;

/// Resize a slice with bilinear interpolation.
///
/// Pixel centres are aligned the usual way (`src = (dst + 0.5) * scale - 0.5`)
/// and samples beyond the border repeat the edge pixel.
pub fn resize_bilinear(data: &ArrayView2<'_, f32>, size: DisplaySize) -> Array2<f32> {
    let (src_h, src_w) = data.dim();
    let (dst_h, dst_w) = size.shape();

    if (src_h, src_w) == (dst_h, dst_w) {
        return data.to_owned();
    }
    if src_h == 0 || src_w == 0 {
        return Array2::zeros((dst_h, dst_w));
    }

    let scale_y = src_h as f64 / dst_h as f64;
    let scale_x = src_w as f64 / dst_w as f64;
    let max_y = (src_h - 1) as f64;
    let max_x = (src_w - 1) as f64;

    let sample_row = |row: usize| -> Vec<f32> {
        let src_y = ((row as f64 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        (0..dst_w)
            .map(|col| {
                let src_x = ((col as f64 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
                bilinear_clamped(data, src_y, src_x)
            })
            .collect()
    };

    let mut result = Array2::<f32>::zeros((dst_h, dst_w));
    if dst_h * dst_w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<f32>> = (0..dst_h).into_par_iter().map(sample_row).collect();
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
    } else {
        for row in 0..dst_h {
            for (col, val) in sample_row(row).into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
    }
    result
}

/// Bilinear sample with edge replication. Coordinates are in pixels.
pub fn bilinear_clamped(data: &ArrayView2<'_, f32>, y: f64, x: f64) -> f32 {
    let (h, w) = data.dim();
    let y = y.clamp(0.0, (h - 1) as f64);
    let x = x.clamp(0.0, (w - 1) as f64);

    let y0 = y.floor() as usize;
    let x0 = x.floor() as usize;
    let y1 = (y0 + 1).min(h - 1);
    let x1 = (x0 + 1).min(w - 1);

    let fy = (y - y0 as f64) as f32;
    let fx = (x - x0 as f64) as f32;

    let v00 = data[[y0, x0]];
    let v01 = data[[y0, x1]];
    let v10 = data[[y1, x0]];
    let v11 = data[[y1, x1]];

    v00 * (1.0 - fx) * (1.0 - fy) + v01 * fx * (1.0 - fy) + v10 * (1.0 - fx) * fy + v11 * fx * fy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_is_a_copy() {
        let data = Array2::from_shape_fn((3, 4), |(r, c)| (r * 4 + c) as f32);
        let out = resize_bilinear(&data.view(), DisplaySize::new(4, 3));
        assert_eq!(out, data);
    }

    #[test]
    fn constant_image_stays_constant() {
        let data = Array2::from_elem((7, 5), 3.5f32);
        let out = resize_bilinear(&data.view(), DisplaySize::new(12, 9));
        assert_eq!(out.dim(), (9, 12));
        assert!(out.iter().all(|&v| (v - 3.5).abs() < 1e-6));
    }
}
