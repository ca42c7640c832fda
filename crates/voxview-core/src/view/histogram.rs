use image::{GrayImage, Luma};
use ndarray::ArrayView2;
use serde::Serialize;
use tracing::debug;

use crate::consts::DEFAULT_HANDLE_GRAB_THRESHOLD;
use crate::error::{Result, ViewerError};
use crate::volume::min_max;

/// Intensity histogram of a slice over its own `[min, max]` range.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Histogram {
    pub counts: Vec<u64>,
    pub min: f32,
    pub max: f32,
}

impl Histogram {
    pub fn compute(slice: &ArrayView2<'_, f32>, bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(ViewerError::InvalidArgument(
                "histogram needs at least one bin".into(),
            ));
        }
        let (min, max) = min_max(slice.iter().copied());
        let mut counts = vec![0u64; bins];
        let span = (max - min) as f64;

        for &v in slice.iter() {
            let bin = if span > 0.0 {
                (((v - min) as f64 / span) * bins as f64) as usize
            } else {
                0
            };
            counts[bin.min(bins - 1)] += 1;
        }

        Ok(Self { counts, min, max })
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Lower edge of `bin` in intensity units.
    pub fn bin_start(&self, bin: usize) -> f32 {
        self.min + (self.max - self.min) * bin as f32 / self.bins() as f32
    }

    /// Bar chart raster: white bars on black, tallest bin spans the height.
    pub fn histogram_image(&self, width: u32, height: u32) -> GrayImage {
        let mut img = GrayImage::new(width, height);
        let peak = self.counts.iter().copied().max().unwrap_or(0);
        if peak == 0 || width == 0 || height == 0 {
            return img;
        }

        let bins = self.bins() as u64;
        for x in 0..width {
            let bin = (x as u64 * bins / width as u64) as usize;
            let bar = (self.counts[bin] as f64 / peak as f64 * height as f64).round() as u32;
            for y in height.saturating_sub(bar)..height {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        img
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Handle {
    Min,
    Max,
}

impl Handle {
    fn index(self) -> usize {
        match self {
            Handle::Min => 0,
            Handle::Max => 1,
        }
    }
}

/// The two draggable contrast handles drawn over the histogram.
///
/// Positions are in histogram pixels, `0 <= min <= max <= width`.
#[derive(Clone, Debug)]
pub struct HistogramHandles {
    width: f64,
    grab_threshold: f64,
    positions: [f64; 2],
    selected: Option<Handle>,
    last_x: Option<f64>,
}

impl HistogramHandles {
    pub fn new(width: f64) -> Self {
        Self::with_grab_threshold(width, DEFAULT_HANDLE_GRAB_THRESHOLD)
    }

    pub fn with_grab_threshold(width: f64, grab_threshold: f64) -> Self {
        let width = width.max(0.0);
        Self {
            width,
            grab_threshold,
            positions: [0.0, width],
            selected: None,
            last_x: None,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// `[min, max]` handle positions.
    pub fn positions(&self) -> [f64; 2] {
        self.positions
    }

    pub fn selected(&self) -> Option<Handle> {
        self.selected
    }

    /// Put both handles back at the histogram edges.
    pub fn reset(&mut self) {
        self.positions = [0.0, self.width];
        self.selected = None;
        self.last_x = None;
    }

    /// Handle closest to `x` if it lies within the grab threshold.
    pub fn nearest(&self, x: f64) -> Option<Handle> {
        let d_min = (self.positions[0] - x).abs();
        let d_max = (self.positions[1] - x).abs();
        let (handle, distance) = if d_min <= d_max {
            (Handle::Min, d_min)
        } else {
            (Handle::Max, d_max)
        };
        (distance < self.grab_threshold).then_some(handle)
    }

    /// Feed one pointer-drag sample at histogram x coordinate `x`.
    pub fn drag(&mut self, x: f64) {
        if self.selected.is_none() {
            self.selected = self.nearest(x);
        }

        if let (Some(handle), Some(last)) = (self.selected, self.last_x) {
            let delta = x - last;
            if delta != 0.0 {
                self.move_handle(handle, delta);
            }
        }
        self.last_x = Some(x);
    }

    /// End the gesture and return the normalized `(low, high)` window.
    pub fn release(&mut self) -> (f64, f64) {
        self.selected = None;
        self.last_x = None;
        let window = if self.width > 0.0 {
            (
                (self.positions[0] / self.width).min(1.0),
                (self.positions[1] / self.width).min(1.0),
            )
        } else {
            (0.0, 1.0)
        };
        debug!(low = window.0, high = window.1, "Histogram window released");
        window
    }

    fn move_handle(&mut self, handle: Handle, delta: f64) {
        let target = self.positions[handle.index()] + delta;
        let in_bounds = (0.0..=self.width).contains(&target);
        let ordered = match handle {
            Handle::Min => target <= self.positions[1],
            Handle::Max => target >= self.positions[0],
        };
        if in_bounds && ordered {
            self.positions[handle.index()] = target;
        }
    }
}
