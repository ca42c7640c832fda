use thiserror::Error;

use crate::volume::loader::LoadError;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to load volume: {0}")]
    Load(#[from] LoadError),

    #[error("No volume loaded")]
    NoVolumeLoaded,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No initial markers selected")]
    NoMarkers,

    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    #[error("Index {index} out of range for axis {axis} (length: {len})")]
    IndexOutOfRange { axis: usize, index: usize, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

impl ViewerError {
    /// Whether the error blocks the interaction with a user-visible dialog.
    ///
    /// Everything except argument validation reaches the user; invalid
    /// arguments are rejected before any state changes and are reported by
    /// the caller that produced them.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}

impl From<ndarray::ShapeError> for ViewerError {
    fn from(e: ndarray::ShapeError) -> Self {
        Self::InvalidArgument(format!("array shape: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
