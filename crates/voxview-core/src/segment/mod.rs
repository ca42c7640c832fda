//! Interactive marker-based watershed segmentation.
//!
//! The user arms the tool, clicks seed points, then runs it. Each seed grows
//! a box of labelled pixels that floods the intensity image until regions
//! meet on watershed lines.

pub mod markers;
pub mod regions;
pub mod watershed;

use ndarray::{Array, ArrayView, Dimension};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, ViewerError};

pub use markers::{build_marker_labels, Marker};
pub use regions::{boundary_pixels, region_stats, RegionStats};
pub use watershed::{normalize_labels_for_display, to_u8_intensity, watershed};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum SegmentationState {
    #[default]
    Idle,
    Collecting,
}

/// Marker collection state machine.
///
/// `Idle -> arm -> Collecting -> take_ready -> Idle`. Markers are numbered
/// in pick order starting at 1.
#[derive(Clone, Debug, Default)]
pub struct MarkerSegmentation {
    state: SegmentationState,
    markers: Vec<Marker>,
}

impl MarkerSegmentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SegmentationState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state == SegmentationState::Collecting
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Start collecting markers.
    pub fn arm(&mut self) {
        self.state = SegmentationState::Collecting;
        self.markers.clear();
        debug!("Marker collection armed");
    }

    /// Append a marker and return its label.
    pub fn add_marker(&mut self, marker: impl Into<Marker>) -> Result<i32> {
        if !self.is_collecting() {
            return Err(ViewerError::InvalidArgument(
                "markers can only be added while segmentation is armed".into(),
            ));
        }
        let marker = marker.into();
        debug!(%marker, label = self.markers.len() + 1, "Marker added");
        self.markers.push(marker);
        Ok(self.markers.len() as i32)
    }

    /// Hand out the collected markers and return to idle.
    ///
    /// Returns [`ViewerError::NoMarkers`] when nothing was picked; the state
    /// still goes back to idle.
    pub fn take_ready(&mut self) -> Result<Vec<Marker>> {
        self.state = SegmentationState::Idle;
        let markers = std::mem::take(&mut self.markers);
        if markers.is_empty() {
            return Err(ViewerError::NoMarkers);
        }
        Ok(markers)
    }

    pub fn cancel(&mut self) {
        self.state = SegmentationState::Idle;
        self.markers.clear();
    }
}

/// Result of one segmentation run.
#[derive(Clone, Debug)]
pub struct Segmentation<D: Dimension> {
    pub labels: Array<i32, D>,
    /// Labels stretched to 8 bits for display.
    pub display: Array<u8, D>,
    pub regions: Vec<RegionStats>,
}

/// Markers to labels to watershed, on a raw intensity image.
pub fn segment<D: Dimension>(
    intensity: &ArrayView<'_, f32, D>,
    markers: &[Marker],
    radius: usize,
) -> Result<Segmentation<D>> {
    if markers.is_empty() {
        return Err(ViewerError::NoMarkers);
    }
    let seeds = build_marker_labels(markers, radius, intensity.raw_dim())?;
    let grey = to_u8_intensity(intensity);
    let labels = watershed(&seeds, &grey.view())?;
    let regions = region_stats(&labels);
    let display = normalize_labels_for_display(&labels);

    info!(
        markers = markers.len(),
        regions = regions.len(),
        boundary = boundary_pixels(&labels),
        "Watershed segmentation finished"
    );

    Ok(Segmentation {
        labels,
        display,
        regions,
    })
}
