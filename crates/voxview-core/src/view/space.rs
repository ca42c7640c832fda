use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::types::{DisplaySize, Point};

use super::resample::resize_bilinear;

/// Compute the aspect-preserving size that fits `original` into `max`.
///
/// Returns `None` when no resize is needed. The larger dimension (rows on a
/// tie) takes its bound and the other follows the aspect ratio.
pub fn fit_to_bounds(original: DisplaySize, max: DisplaySize) -> Option<DisplaySize> {
    let (rows, cols) = original.shape();
    if rows <= max.height && cols <= max.width {
        return None;
    }
    if rows == 0 || cols == 0 {
        return None;
    }

    let size = if rows >= cols {
        let width = (max.height as f64 * cols as f64 / rows as f64).round() as usize;
        DisplaySize::new(width.max(1), max.height.max(1))
    } else {
        let height = (max.width as f64 * rows as f64 / cols as f64).round() as usize;
        DisplaySize::new(max.width.max(1), height.max(1))
    };
    Some(size)
}

/// Original and fitted size recorded for the current slicing axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitGeometry {
    pub original: DisplaySize,
    /// Size after fit-to-bounds, `None` when the slice already fits.
    pub fit: Option<DisplaySize>,
}

impl FitGeometry {
    /// Size of the image handed to the display (before zoom, which keeps it).
    pub fn display(&self) -> DisplaySize {
        self.fit.unwrap_or(self.original)
    }

    /// `(x, y)` factors from display pixels back to original pixels.
    pub fn scale_to_original(&self) -> (f64, f64) {
        match self.fit {
            Some(fit) => (
                self.original.width as f64 / fit.width as f64,
                self.original.height as f64 / fit.height as f64,
            ),
            None => (1.0, 1.0),
        }
    }
}

/// Bookkeeping between original slice pixels and displayed pixels.
///
/// The fit geometry is computed from the first slice rendered for an axis
/// and reused until [`CoordinateSpace::reset`] or a new bound is set.
#[derive(Clone, Debug, Default)]
pub struct CoordinateSpace {
    max_size: Option<DisplaySize>,
    geometry: Option<FitGeometry>,
}

impl CoordinateSpace {
    pub fn new(max_size: Option<DisplaySize>) -> Self {
        Self {
            max_size,
            geometry: None,
        }
    }

    pub fn max_size(&self) -> Option<DisplaySize> {
        self.max_size
    }

    pub fn set_max_size(&mut self, max_size: Option<DisplaySize>) {
        if self.max_size != max_size {
            self.max_size = max_size;
            self.reset();
        }
    }

    /// Forget the cached geometry (axis change).
    pub fn reset(&mut self) {
        self.geometry = None;
    }

    pub fn geometry(&self) -> Option<FitGeometry> {
        self.geometry
    }

    pub fn original_size(&self) -> Option<DisplaySize> {
        self.geometry.map(|g| g.original)
    }

    pub fn fit_size(&self) -> Option<DisplaySize> {
        self.geometry.and_then(|g| g.fit)
    }

    pub fn display_size(&self) -> Option<DisplaySize> {
        self.geometry.map(|g| g.display())
    }

    /// Apply the fit-to-bounds resize, computing the geometry on first use.
    pub fn fit_slice(&mut self, slice: &ArrayView2<'_, f32>) -> Array2<f32> {
        let max_size = self.max_size;
        let geometry = *self.geometry.get_or_insert_with(|| {
            let original = DisplaySize::from_shape(slice.dim());
            let fit = max_size.and_then(|max| fit_to_bounds(original, max));
            debug!(%original, fit = ?fit, "Computed fit geometry");
            FitGeometry { original, fit }
        });

        match geometry.fit {
            Some(size) => resize_bilinear(slice, size),
            None => slice.to_owned(),
        }
    }

    /// Whether a display point lies on the displayed image.
    pub fn contains(&self, point: Point) -> bool {
        self.display_size().is_some_and(|size| {
            point.x >= 0.0
                && point.y >= 0.0
                && point.x < size.width as f64
                && point.y < size.height as f64
        })
    }

    /// Map a display pick back to original slice pixels.
    ///
    /// Undoes the magnification and then the fit resize. The pick is taken
    /// relative to the crop origin, so the pan offset is not subtracted.
    /// Picks outside the displayed image give `None`.
    pub fn to_original(&self, point: Point, zoom: f64) -> Option<Point> {
        if !self.contains(point) {
            return None;
        }
        let (sx, sy) = self.geometry?.scale_to_original();
        Some(Point::new(point.x / zoom * sx, point.y / zoom * sy))
    }

    /// Inverse of [`CoordinateSpace::to_original`] for points on screen.
    pub fn to_display(&self, point: Point, zoom: f64) -> Option<Point> {
        let (sx, sy) = self.geometry?.scale_to_original();
        let display = Point::new(point.x / sx * zoom, point.y / sy * zoom);
        self.contains(display).then_some(display)
    }
}
