use std::path::PathBuf;

use ndarray::{Array2, Array3};
use serde::{Deserialize, Serialize};

use crate::measure::Measurement;
use crate::register::RegistrationResult;
use crate::segment::RegionStats;
use crate::types::SliceAxis;
use crate::volume::HeaderRow;

use super::history::ActionRecord;

/// Which of the two view slots an event addresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewTarget {
    #[default]
    Principal,
    Secondary,
}

/// User input delivered to a [`super::ViewerSession`].
///
/// Pointer coordinates are display pixels relative to the image origin;
/// histogram coordinates are histogram pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ViewerEvent {
    Open {
        path: PathBuf,
        #[serde(default)]
        target: ViewTarget,
    },
    SelectAxis {
        axis: SliceAxis,
        #[serde(default)]
        target: ViewTarget,
    },
    SetDepth {
        depth: usize,
        #[serde(default)]
        target: ViewTarget,
    },
    SetZoom {
        factor: f64,
    },
    /// Primary button down.
    PointerPress {
        x: f64,
        y: f64,
    },
    /// Primary button up; ends a pan drag.
    PointerRelease {
        x: f64,
        y: f64,
    },
    Hover {
        x: f64,
        y: f64,
    },
    HistogramDrag {
        x: f64,
    },
    HistogramRelease,
    /// Secondary button click.
    DistanceClick {
        x: f64,
        y: f64,
    },
    /// Toggles marker collection, or runs the segmentation when armed.
    Watershed,
    Fuse {
        #[serde(default)]
        alpha: Option<f32>,
    },
    Register,
    ShowHeaders,
    ShowHistory,
}

/// What a handled event produced for the display layer.
#[derive(Clone, Debug)]
pub enum ViewerOutcome {
    /// Nothing to show (state-only change).
    Unchanged,
    Frame {
        target: ViewTarget,
        depth: usize,
        image: Array2<u8>,
    },
    /// Text for the pixel probe, `None` when the pointer is off the image.
    Probe(Option<String>),
    MarkerAdded {
        label: i32,
        row: usize,
        col: usize,
    },
    SegmentationArmed,
    Segmentation {
        labels: Array2<i32>,
        display: Array2<u8>,
        regions: Vec<RegionStats>,
    },
    DistancePending,
    Distance(Measurement),
    HistogramHandles {
        positions: [f64; 2],
    },
    Headers(Vec<HeaderRow>),
    History(Vec<ActionRecord>),
    Fusion(Array3<u8>),
    Registration {
        result: RegistrationResult,
        /// Secondary slice resampled onto the principal grid.
        registered: Array2<f32>,
    },
}
