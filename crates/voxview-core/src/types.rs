use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Volume dimension used as "depth" when slicing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SliceAxis {
    #[default]
    First,
    Second,
    Third,
}

impl SliceAxis {
    pub const ALL: [SliceAxis; 3] = [Self::First, Self::Second, Self::Third];

    /// Array axis index (0, 1 or 2).
    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
            Self::Third => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL.get(index).copied().ok_or_else(|| {
            ViewerError::InvalidArgument(format!("slice axis must be 0, 1 or 2 (got {index})"))
        })
    }

    /// The two volume axes that span a slice, in (row, col) order.
    pub fn in_plane_axes(self) -> (usize, usize) {
        match self {
            Self::First => (1, 2),
            Self::Second => (0, 2),
            Self::Third => (0, 1),
        }
    }
}

impl fmt::Display for SliceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "First"),
            Self::Second => write!(f, "Second"),
            Self::Third => write!(f, "Third"),
        }
    }
}

/// Width/height of a 2D image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: usize,
    pub height: usize,
}

impl DisplaySize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Build from an ndarray `(rows, cols)` shape.
    pub fn from_shape((rows, cols): (usize, usize)) -> Self {
        Self {
            width: cols,
            height: rows,
        }
    }

    /// `(rows, cols)` shape for ndarray.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

impl fmt::Display for DisplaySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Summary of a loaded volume.
#[derive(Clone, Debug)]
pub struct VolumeInfo {
    pub source: Option<PathBuf>,
    pub shape: [usize; 3],
    pub spacing: Option<[f64; 3]>,
    pub min_value: f32,
    pub max_value: f32,
    pub header_elements: usize,
}

/// A position in image or display space, `x` along columns and `y` along rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
