use serde::Serialize;
use tracing::debug;

use crate::types::Point;

/// Distance between two picked points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub from: Point,
    pub to: Point,
    /// Euclidean distance in original slice pixels.
    pub pixels: f64,
    /// Distance in millimetres, when the pixel spacing is known.
    pub physical: Option<f64>,
}

impl Measurement {
    /// `spacing` is `(row, col)` in millimetres per pixel.
    pub fn between(from: Point, to: Point, spacing: Option<(f64, f64)>) -> Self {
        let physical = spacing.map(|(row, col)| {
            let dx = (to.x - from.x) * col;
            let dy = (to.y - from.y) * row;
            dx.hypot(dy)
        });
        Self {
            from,
            to,
            pixels: from.distance(&to),
            physical,
        }
    }
}

/// Two-click distance tool.
///
/// Points are given in original pixel space; `None` stands for a click that
/// missed the image and leaves the pending point alone.
#[derive(Clone, Debug, Default)]
pub struct DistanceTool {
    pending: Option<Point>,
}

impl DistanceTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<Point> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Register a click. The second valid click yields the measurement.
    pub fn click(&mut self, point: Option<Point>, spacing: Option<(f64, f64)>) -> Option<Measurement> {
        let point = point?;
        match self.pending.take() {
            Some(first) => {
                let measurement = Measurement::between(first, point, spacing);
                debug!(pixels = measurement.pixels, "Distance measured");
                Some(measurement)
            }
            None => {
                self.pending = Some(point);
                None
            }
        }
    }
}
