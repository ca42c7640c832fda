//! Slice display pipeline: extract, fit to bounds, window, zoom.
//!
//! A [`VolumeView`] owns one volume and all of its view state. Rendering a
//! slice runs the stages in a fixed order:
//!
//! 1. slice extraction along the current axis
//! 2. fit-to-bounds resize, recorded in the [`CoordinateSpace`]
//! 3. contrast windowing to 8 bits
//! 4. zoom and crop
//!
//! Picks on the displayed image are mapped back through the same geometry.

pub mod contrast;
pub mod histogram;
pub mod resample;
pub mod space;
pub mod zoom;

use ndarray::Array2;
use tracing::debug;

use crate::error::Result;
use crate::types::{DisplaySize, Point, SliceAxis};
use crate::volume::Volume;

pub use contrast::ContrastWindow;
pub use histogram::{Handle, Histogram, HistogramHandles};
pub use space::{fit_to_bounds, CoordinateSpace, FitGeometry};
pub use zoom::{zoom_and_crop, ZoomPan};

/// One open volume plus its view state.
#[derive(Clone, Debug)]
pub struct VolumeView {
    volume: Volume,
    axis: SliceAxis,
    space: CoordinateSpace,
    contrast: ContrastWindow,
    zoom: ZoomPan,
}

impl VolumeView {
    pub fn new(volume: Volume, max_size: Option<DisplaySize>) -> Self {
        Self {
            volume,
            axis: SliceAxis::default(),
            space: CoordinateSpace::new(max_size),
            contrast: ContrastWindow::default(),
            zoom: ZoomPan::default(),
        }
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn axis(&self) -> SliceAxis {
        self.axis
    }

    /// Number of slices along the current axis.
    pub fn depth(&self) -> usize {
        self.volume.len(self.axis)
    }

    /// Switch the slicing axis. Resets the fit geometry and the pan offset.
    pub fn set_axis(&mut self, axis: SliceAxis) {
        if axis != self.axis {
            debug!(from = %self.axis, to = %axis, "Changed slice axis");
        }
        self.axis = axis;
        self.space.reset();
        self.zoom.reset_pan();
    }

    pub fn set_max_size(&mut self, max_size: Option<DisplaySize>) {
        self.space.set_max_size(max_size);
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn contrast(&self) -> ContrastWindow {
        self.contrast
    }

    pub fn set_contrast(&mut self, low: f64, high: f64) -> Result<()> {
        self.contrast.set_window(low, high)
    }

    pub fn zoom(&self) -> &ZoomPan {
        &self.zoom
    }

    pub fn set_zoom(&mut self, factor: f64) -> Result<()> {
        self.zoom.set_zoom(factor)
    }

    /// Pan by a pointer drag, clamped against the last displayed size.
    pub fn pan(&mut self, dx: i64, dy: i64) {
        let base = self.space.display_size().map(|size| size.shape());
        self.zoom.pan(dx, dy, base);
    }

    /// Full pipeline for slice `index` along the current axis.
    pub fn render(&mut self, index: usize) -> Result<Array2<u8>> {
        let slice = self.volume.slice(self.axis, index)?;
        let fitted = self.space.fit_slice(&slice);
        let windowed = self.contrast.apply(&fitted.view());
        Ok(self.zoom.apply_display(&windowed.view()))
    }

    /// Pipeline without the contrast stage, keeping raw intensities.
    pub fn render_raw(&mut self, index: usize) -> Result<Array2<f32>> {
        let slice = self.volume.slice(self.axis, index)?;
        let fitted = self.space.fit_slice(&slice);
        Ok(self.zoom.apply(&fitted.view()))
    }

    /// Histogram of the raw slice `index`.
    pub fn histogram(&self, index: usize, bins: usize) -> Result<Histogram> {
        let slice = self.volume.slice(self.axis, index)?;
        Histogram::compute(&slice, bins)
    }

    /// Map a display pick to original slice pixels, `None` when off-image.
    pub fn to_original(&self, point: Point) -> Option<Point> {
        self.space.to_original(point, self.zoom.factor())
    }

    /// Map a display pick to the original pixel under it, pan included.
    ///
    /// [`VolumeView::to_original`] ignores the pan offset, which cancels for
    /// differences between two picks. Single positions such as markers need
    /// the offset added before the zoom is undone.
    pub fn to_original_absolute(&self, point: Point) -> Option<Point> {
        if !self.space.contains(point) {
            return None;
        }
        let display = self.space.display_size()?;
        let [row, col] = self.zoom.clamped_offset(display.shape());
        let shifted = Point::new(point.x + col as f64, point.y + row as f64);
        let (sx, sy) = self.space.geometry()?.scale_to_original();
        let zoom = self.zoom.factor();
        Some(Point::new(shifted.x / zoom * sx, shifted.y / zoom * sy))
    }

    /// Raw intensity under display pixel `point` of slice `index`.
    ///
    /// The value is read from the zoomed display geometry before contrast is
    /// applied, so it follows what is on screen rather than the original voxel.
    pub fn probe(&mut self, index: usize, point: Point) -> Result<Option<f32>> {
        let raw = self.render_raw(index)?;
        if point.x < 0.0 || point.y < 0.0 {
            return Ok(None);
        }
        let (row, col) = (point.y as usize, point.x as usize);
        Ok(raw.get((row, col)).copied())
    }

    /// `(row, col)` pixel spacing of the current slicing plane.
    pub fn pixel_spacing(&self) -> Option<(f64, f64)> {
        self.volume.in_plane_spacing(self.axis)
    }
}
