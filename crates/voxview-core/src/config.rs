use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_FUSION_ALPHA, DEFAULT_HANDLE_GRAB_THRESHOLD, DEFAULT_HISTOGRAM_BINS,
    DEFAULT_HISTOGRAM_SIZE, DEFAULT_MARKER_RADIUS, DEFAULT_MAX_DISPLAY_SIZE,
};
use crate::error::Result;
use crate::register::RegistrationConfig;
use crate::types::DisplaySize;
use crate::volume::header::HeaderDisplayConfig;

/// Viewer-wide settings, loadable from TOML. Missing keys take defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Bounding box a slice is fitted into. `None` shows slices unscaled.
    pub max_display_size: Option<DisplaySize>,
    pub segmentation: SegmentationConfig,
    pub histogram: HistogramConfig,
    pub headers: HeaderDisplayConfig,
    pub fusion: FusionConfig,
    pub registration: RegistrationConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let (width, height) = DEFAULT_MAX_DISPLAY_SIZE;
        Self {
            max_display_size: Some(DisplaySize::new(width, height)),
            segmentation: SegmentationConfig::default(),
            histogram: HistogramConfig::default(),
            headers: HeaderDisplayConfig::default(),
            fusion: FusionConfig::default(),
            registration: RegistrationConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Half-size of the box painted around each marker.
    pub marker_radius: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            marker_radius: DEFAULT_MARKER_RADIUS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    pub bins: usize,
    pub width: u32,
    pub height: u32,
    /// How close (in histogram pixels) a drag must start to grab a handle.
    pub grab_threshold: f64,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        let (width, height) = DEFAULT_HISTOGRAM_SIZE;
        Self {
            bins: DEFAULT_HISTOGRAM_BINS,
            width,
            height,
            grab_threshold: DEFAULT_HANDLE_GRAB_THRESHOLD,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub alpha: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_FUSION_ALPHA,
        }
    }
}
