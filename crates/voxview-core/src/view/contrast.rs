use ndarray::{Array2, ArrayView2, Zip};
use serde::{Deserialize, Serialize};

use crate::consts::{DISPLAY_MAX, PARALLEL_PIXEL_THRESHOLD};
use crate::error::{Result, ViewerError};
use crate::volume::min_max;

/// Normalized intensity window, `0 <= low <= high <= 1`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContrastWindow {
    low: f64,
    high: f64,
}

impl Default for ContrastWindow {
    fn default() -> Self {
        Self {
            low: 0.0,
            high: 1.0,
        }
    }
}

impl ContrastWindow {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        validate(low, high)?;
        Ok(Self { low, high })
    }

    /// Replace the window. On error the current window is kept.
    pub fn set_window(&mut self, low: f64, high: f64) -> Result<()> {
        validate(low, high)?;
        self.low = low;
        self.high = high;
        Ok(())
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Intensity thresholds `(lo, hi)` for a slice spanning `[min, max]`.
    ///
    /// Negative data is shifted so the window is taken over `[0, max + offset]`.
    pub fn thresholds(&self, min: f32, max: f32) -> (f64, f64) {
        let offset = (-(min as f64)).max(0.0);
        let span = max as f64 + offset;
        (span * self.low - offset, span * self.high - offset)
    }

    /// Remap a slice to 8-bit display values.
    pub fn apply(&self, slice: &ArrayView2<'_, f32>) -> Array2<u8> {
        let (min, max) = min_max(slice.iter().copied());
        let (lo, hi) = self.thresholds(min, max);

        let mut out = Array2::<u8>::zeros(slice.dim());
        let zip = Zip::from(&mut out).and(slice);
        if slice.len() >= PARALLEL_PIXEL_THRESHOLD {
            zip.par_for_each(|o, &v| *o = remap(v as f64, lo, hi));
        } else {
            zip.for_each(|o, &v| *o = remap(v as f64, lo, hi));
        }
        out
    }
}

fn validate(low: f64, high: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low > high {
        return Err(ViewerError::InvalidArgument(format!(
            "contrast window must satisfy 0 <= low <= high <= 1 (got {low}, {high})"
        )));
    }
    Ok(())
}

#[inline]
fn remap(v: f64, lo: f64, hi: f64) -> u8 {
    if v >= hi {
        255
    } else if v <= lo {
        0
    } else {
        // lo < v < hi, so hi > lo here.
        (DISPLAY_MAX * (v - lo) / (hi - lo)).round().clamp(0.0, DISPLAY_MAX) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_window_is_a_threshold() {
        assert_eq!(remap(5.0, 5.0, 5.0), 255);
        assert_eq!(remap(4.9, 5.0, 5.0), 0);
    }
}
