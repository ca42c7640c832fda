use std::fmt;

use ndarray::{Array, Dimension, Slice};
use serde::{Deserialize, Serialize};

use crate::consts::UNLABELED;
use crate::error::{Result, ViewerError};

/// A seed position, one coordinate per array axis (`(row, col)` for a slice).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Marker(pub Vec<usize>);

impl Marker {
    pub fn coords(&self) -> &[usize] {
        &self.0
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }
}

impl From<[usize; 2]> for Marker {
    fn from(p: [usize; 2]) -> Self {
        Self(p.to_vec())
    }
}

impl From<[usize; 3]> for Marker {
    fn from(p: [usize; 3]) -> Self {
        Self(p.to_vec())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Paint the marker image: a `[p - r, p + r)` box per marker, label `i + 1`.
///
/// Boxes are clamped to the array. Later markers overwrite earlier ones. A
/// box that ends up empty is replaced by the single clamped marker voxel.
pub fn build_marker_labels<D: Dimension>(
    markers: &[Marker],
    radius: usize,
    shape: D,
) -> Result<Array<i32, D>> {
    let mut labels = Array::<i32, D>::from_elem(shape, UNLABELED);
    let dims = labels.shape().to_vec();
    if dims.contains(&0) {
        return Ok(labels);
    }

    for (i, marker) in markers.iter().enumerate() {
        if marker.ndim() != dims.len() {
            return Err(ViewerError::InvalidArgument(format!(
                "marker {marker} has {} coordinates, image has {} axes",
                marker.ndim(),
                dims.len()
            )));
        }
        let label = i as i32 + 1;

        let mut ranges: Vec<(usize, usize)> = marker
            .coords()
            .iter()
            .zip(&dims)
            .map(|(&p, &len)| (p.saturating_sub(radius).min(len), p.saturating_add(radius).min(len)))
            .collect();
        if ranges.iter().any(|&(lo, hi)| lo >= hi) {
            ranges = marker
                .coords()
                .iter()
                .zip(&dims)
                .map(|(&p, &len)| {
                    let c = p.min(len - 1);
                    (c, c + 1)
                })
                .collect();
        }

        labels
            .slice_each_axis_mut(|ax| {
                let (lo, hi) = ranges[ax.axis.index()];
                Slice::from(lo..hi)
            })
            .fill(label);
    }

    Ok(labels)
}
