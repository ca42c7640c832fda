use ndarray::{Array2, ArrayView2};
use num_complex::Complex;
use rustfft::FftPlanner;

use crate::consts::EPSILON;
use crate::error::{Result, ViewerError};

use super::Translation;

/// Estimate the translation taking `fixed` coordinates into `moving` with
/// FFT phase correlation and a paraboloid sub-pixel refinement.
pub fn estimate_translation(
    fixed: &ArrayView2<'_, f32>,
    moving: &ArrayView2<'_, f32>,
) -> Result<Translation> {
    let (h, w) = fixed.dim();
    if fixed.dim() != moving.dim() {
        return Err(ViewerError::ShapeMismatch {
            left: fixed.shape().to_vec(),
            right: moving.shape().to_vec(),
        });
    }
    if h < 2 || w < 2 {
        return Ok(Translation::default());
    }

    // Hann window to reduce spectral leakage
    let fixed_fft = fft2d(&apply_hann(fixed));
    let moving_fft = fft2d(&apply_hann(moving));

    let cross_power = normalized_cross_power(&fixed_fft, &moving_fft);
    let correlation = ifft2d(&cross_power);
    let (peak_row, peak_col) = find_peak(&correlation);

    // Signed offset with wrap-around
    let wrap = |peak: usize, len: usize| {
        if peak > len / 2 {
            peak as f64 - len as f64
        } else {
            peak as f64
        }
    };
    let (sub_dy, sub_dx) = refine_peak_paraboloid(&correlation, peak_row, peak_col);
    let offset_dy = wrap(peak_row, h) + sub_dy;
    let offset_dx = wrap(peak_col, w) + sub_dx;

    // The correlation peak sits at minus the displacement of `moving`.
    Ok(Translation::new(-offset_dy, -offset_dx))
}

fn apply_hann(data: &ArrayView2<'_, f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    Array2::from_shape_fn((h, w), |(row, col)| {
        let wy = 0.5 * (1.0 - (std::f64::consts::TAU * row as f64 / h as f64).cos());
        let wx = 0.5 * (1.0 - (std::f64::consts::TAU * col as f64 / w as f64).cos());
        data[[row, col]] * (wy * wx) as f32
    })
}

/// 2D FFT: row-wise FFT, then column-wise FFT.
fn fft2d(data: &Array2<f32>) -> Array2<Complex<f64>> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let fft_row = planner.plan_fft_forward(w);
    let fft_col = planner.plan_fft_forward(h);

    let mut result = data.mapv(|v| Complex::new(v as f64, 0.0));

    for mut row in result.rows_mut() {
        let mut row_data: Vec<Complex<f64>> = row.to_vec();
        fft_row.process(&mut row_data);
        for (dst, src) in row.iter_mut().zip(row_data) {
            *dst = src;
        }
    }

    for mut col in result.columns_mut() {
        let mut col_data: Vec<Complex<f64>> = col.to_vec();
        fft_col.process(&mut col_data);
        for (dst, src) in col.iter_mut().zip(col_data) {
            *dst = src;
        }
    }

    result
}

/// Inverse 2D FFT, real part, normalized.
fn ifft2d(data: &Array2<Complex<f64>>) -> Array2<f64> {
    let (h, w) = data.dim();
    let mut planner = FftPlanner::new();
    let ifft_row = planner.plan_fft_inverse(w);
    let ifft_col = planner.plan_fft_inverse(h);

    let mut work = data.clone();

    for mut col in work.columns_mut() {
        let mut col_data: Vec<Complex<f64>> = col.to_vec();
        ifft_col.process(&mut col_data);
        for (dst, src) in col.iter_mut().zip(col_data) {
            *dst = src;
        }
    }

    for mut row in work.rows_mut() {
        let mut row_data: Vec<Complex<f64>> = row.to_vec();
        ifft_row.process(&mut row_data);
        for (dst, src) in row.iter_mut().zip(row_data) {
            *dst = src;
        }
    }

    let scale = 1.0 / (h * w) as f64;
    work.mapv(|c| c.re * scale)
}

fn normalized_cross_power(
    fixed_fft: &Array2<Complex<f64>>,
    moving_fft: &Array2<Complex<f64>>,
) -> Array2<Complex<f64>> {
    let mut result = Array2::<Complex<f64>>::zeros(fixed_fft.dim());
    ndarray::Zip::from(&mut result)
        .and(fixed_fft)
        .and(moving_fft)
        .for_each(|out, &f, &m| {
            let cross = f * m.conj();
            let mag = cross.norm();
            *out = if mag > EPSILON {
                cross / mag
            } else {
                Complex::new(0.0, 0.0)
            };
        });
    result
}

fn find_peak(data: &Array2<f64>) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_val = f64::NEG_INFINITY;
    for ((row, col), &v) in data.indexed_iter() {
        if v > best_val {
            best_val = v;
            best = (row, col);
        }
    }
    best
}

/// Paraboloid fit on the 3x3 neighbourhood, clamped to half a pixel.
fn refine_peak_paraboloid(correlation: &Array2<f64>, peak_row: usize, peak_col: usize) -> (f64, f64) {
    let (h, w) = correlation.dim();
    if peak_row == 0 || peak_row >= h - 1 || peak_col == 0 || peak_col >= w - 1 {
        return (0.0, 0.0);
    }

    let vertex = |prev: f64, curr: f64, next: f64| {
        let denom = prev - 2.0 * curr + next;
        if denom.abs() > 1e-12 {
            ((prev - next) / (2.0 * denom)).clamp(-0.5, 0.5)
        } else {
            0.0
        }
    };

    let centre = correlation[[peak_row, peak_col]];
    (
        vertex(
            correlation[[peak_row - 1, peak_col]],
            centre,
            correlation[[peak_row + 1, peak_col]],
        ),
        vertex(
            correlation[[peak_row, peak_col - 1]],
            centre,
            correlation[[peak_row, peak_col + 1]],
        ),
    )
}
