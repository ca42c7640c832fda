use ndarray::{s, Array2, ArrayView2};
use tracing::debug;

use crate::error::{Result, ViewerError};
use crate::types::DisplaySize;

use super::resample::resize_bilinear;

/// Magnification and pan offset of the displayed slice.
///
/// The slice is scaled by `factor` and a window of its original size is cut
/// out at `offset`, so the displayed image never changes size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomPan {
    factor: f64,
    /// `(row, col)` origin of the crop window in the scaled image.
    offset: [usize; 2],
}

impl Default for ZoomPan {
    fn default() -> Self {
        Self {
            factor: 1.0,
            offset: [0, 0],
        }
    }
}

impl ZoomPan {
    pub fn set_zoom(&mut self, factor: f64) -> Result<()> {
        if !factor.is_finite() || factor < 1.0 {
            return Err(ViewerError::InvalidArgument(format!(
                "zoom factor must be finite and >= 1 (got {factor})"
            )));
        }
        self.factor = factor;
        Ok(())
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn offset(&self) -> [usize; 2] {
        self.offset
    }

    pub fn is_identity(&self) -> bool {
        self.factor == 1.0
    }

    pub fn reset_pan(&mut self) {
        self.offset = [0, 0];
    }

    /// Move the crop window by half of a pointer drag `(dx, dy)`.
    ///
    /// With a known `base` shape `(rows, cols)` the offset is clamped to the
    /// scaled image, otherwise only to be non-negative.
    pub fn pan(&mut self, dx: i64, dy: i64, base: Option<(usize, usize)>) {
        let row = self.offset[0] as i64 + dy.div_euclid(2);
        let col = self.offset[1] as i64 + dx.div_euclid(2);
        let [max_row, max_col] = match base {
            Some(shape) => self.max_offset(shape).map(|v| v as i64),
            None => [i64::MAX, i64::MAX],
        };
        self.offset = [row.clamp(0, max_row) as usize, col.clamp(0, max_col) as usize];
        debug!(dx, dy, offset = ?self.offset, "Panned view");
    }

    /// Size of a `(rows, cols)` image after scaling.
    pub fn scaled_shape(&self, (rows, cols): (usize, usize)) -> (usize, usize) {
        (
            (rows as f64 * self.factor).round() as usize,
            (cols as f64 * self.factor).round() as usize,
        )
    }

    /// Largest valid offset for a base image of `shape`.
    pub fn max_offset(&self, shape: (usize, usize)) -> [usize; 2] {
        let (scaled_rows, scaled_cols) = self.scaled_shape(shape);
        [
            scaled_rows.saturating_sub(shape.0),
            scaled_cols.saturating_sub(shape.1),
        ]
    }

    /// Offset clamped for a base image of `shape`.
    pub fn clamped_offset(&self, shape: (usize, usize)) -> [usize; 2] {
        let [max_row, max_col] = self.max_offset(shape);
        [self.offset[0].min(max_row), self.offset[1].min(max_col)]
    }

    /// Scale then crop back to the input size.
    pub fn apply(&self, image: &ArrayView2<'_, f32>) -> Array2<f32> {
        if self.is_identity() {
            return image.to_owned();
        }
        zoom_and_crop(image, self.factor, self.clamped_offset(image.dim()))
    }

    /// [`ZoomPan::apply`] for 8-bit display images.
    pub fn apply_display(&self, image: &ArrayView2<'_, u8>) -> Array2<u8> {
        if self.is_identity() {
            return image.to_owned();
        }
        let zoomed = self.apply(&image.mapv(f32::from).view());
        zoomed.mapv(|v| v.round().clamp(0.0, 255.0) as u8)
    }
}

/// Scale `image` by `factor` and cut out an input-sized window at `offset`.
///
/// `offset` must already lie within the scaled image.
pub fn zoom_and_crop(image: &ArrayView2<'_, f32>, factor: f64, offset: [usize; 2]) -> Array2<f32> {
    let (rows, cols) = image.dim();
    let scaled_rows = ((rows as f64 * factor).round() as usize).max(rows);
    let scaled_cols = ((cols as f64 * factor).round() as usize).max(cols);
    let scaled = resize_bilinear(image, DisplaySize::new(scaled_cols, scaled_rows));

    let row = offset[0].min(scaled_rows - rows);
    let col = offset[1].min(scaled_cols - cols);
    scaled.slice(s![row..row + rows, col..col + cols]).to_owned()
}
