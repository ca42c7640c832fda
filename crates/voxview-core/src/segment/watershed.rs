use std::collections::VecDeque;

use ndarray::{Array, ArrayView, Dimension};
use tracing::debug;

use crate::consts::{DISPLAY_MAX, UNLABELED, WATERSHED_BOUNDARY, WATERSHED_LEVELS};
use crate::error::{Result, ViewerError};

/// Transient label of pixels waiting in the flood queue.
const IN_QUEUE: i32 = -2;

/// Marker-driven watershed over an 8-bit intensity image of any dimension.
///
/// Labels `>= 1` in `markers` are seeds. Unlabeled pixels are flooded in
/// order of the absolute intensity step from the pixel that reached them,
/// lowest first, FIFO among equal steps. A pixel reached from two different
/// regions becomes [`WATERSHED_BOUNDARY`] and stops the flood there.
pub fn watershed<D: Dimension>(
    markers: &Array<i32, D>,
    intensity: &ArrayView<'_, u8, D>,
) -> Result<Array<i32, D>> {
    if markers.shape() != intensity.shape() {
        return Err(ViewerError::ShapeMismatch {
            left: markers.shape().to_vec(),
            right: intensity.shape().to_vec(),
        });
    }

    let dims = markers.shape().to_vec();
    let strides = row_major_strides(&dims);
    let image: Vec<u8> = intensity.iter().copied().collect();
    let mut labels: Vec<i32> = markers.iter().copied().collect();
    let mut queue = LevelQueue::new();
    let mut neighbours = Vec::with_capacity(2 * dims.len());

    // Seed the queue with every unlabeled pixel touching a region.
    for idx in 0..labels.len() {
        if labels[idx] != UNLABELED {
            continue;
        }
        face_neighbours(idx, &dims, &strides, &mut neighbours);
        let step = neighbours
            .iter()
            .filter(|&&n| labels[n] > 0)
            .map(|&n| image[idx].abs_diff(image[n]))
            .min();
        if let Some(step) = step {
            labels[idx] = IN_QUEUE;
            queue.push(step, idx);
        }
    }
    debug!(seeded = queue.len(), pixels = labels.len(), "Watershed queue seeded");

    while let Some(idx) = queue.pop() {
        face_neighbours(idx, &dims, &strides, &mut neighbours);

        let mut region = UNLABELED;
        for &n in &neighbours {
            let lab = labels[n];
            if lab > 0 {
                if region == UNLABELED {
                    region = lab;
                } else if region != lab {
                    region = WATERSHED_BOUNDARY;
                    break;
                }
            }
        }
        labels[idx] = region;
        if region <= 0 {
            continue;
        }

        for &n in &neighbours {
            if labels[n] == UNLABELED {
                labels[n] = IN_QUEUE;
                queue.push(image[idx].abs_diff(image[n]), n);
            }
        }
    }

    Ok(Array::from_shape_vec(markers.raw_dim(), labels)?)
}

/// Map labels to 8-bit grey for display. Boundaries become 0 first.
pub fn normalize_labels_for_display<D: Dimension>(labels: &Array<i32, D>) -> Array<u8, D> {
    let cleared = labels.mapv(|v| if v == WATERSHED_BOUNDARY { 0 } else { v });
    let min = cleared.iter().copied().min().unwrap_or(0);
    let max = cleared.iter().copied().max().unwrap_or(0);
    if max == min {
        return Array::zeros(labels.raw_dim());
    }
    let span = (max - min) as f64;
    cleared.mapv(|v| ((v - min) as f64 / span * DISPLAY_MAX).round() as u8)
}

/// Stretch an intensity image to the full 8-bit range by its own min/max.
pub fn to_u8_intensity<D: Dimension>(image: &ArrayView<'_, f32, D>) -> Array<u8, D> {
    let (min, max) = crate::volume::min_max(image.iter().copied());
    if max <= min {
        return Array::zeros(image.raw_dim());
    }
    let span = (max - min) as f64;
    image.mapv(|v| ((v - min) as f64 / span * DISPLAY_MAX).round().clamp(0.0, DISPLAY_MAX) as u8)
}

/// Hierarchical queue: one FIFO per grey level, lowest level served first.
struct LevelQueue {
    levels: Vec<VecDeque<usize>>,
    current: usize,
    len: usize,
}

impl LevelQueue {
    fn new() -> Self {
        Self {
            levels: vec![VecDeque::new(); WATERSHED_LEVELS],
            current: WATERSHED_LEVELS,
            len: 0,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, level: u8, idx: usize) {
        let level = level as usize;
        self.levels[level].push_back(idx);
        self.current = self.current.min(level);
        self.len += 1;
    }

    fn pop(&mut self) -> Option<usize> {
        while self.current < WATERSHED_LEVELS {
            if let Some(idx) = self.levels[self.current].pop_front() {
                self.len -= 1;
                return Some(idx);
            }
            self.current += 1;
        }
        None
    }
}

fn row_major_strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for k in (0..dims.len().saturating_sub(1)).rev() {
        strides[k] = strides[k + 1] * dims[k + 1];
    }
    strides
}

fn face_neighbours(idx: usize, dims: &[usize], strides: &[usize], out: &mut Vec<usize>) {
    out.clear();
    for (k, (&len, &stride)) in dims.iter().zip(strides).enumerate() {
        let coord = (idx / stride) % len;
        if coord > 0 {
            out.push(idx - stride);
        }
        if coord + 1 < dims[k] {
            out.push(idx + stride);
        }
    }
}
