use std::collections::BTreeMap;

use ndarray::{Array, Dimension, IntoDimension};
use serde::Serialize;

use crate::consts::WATERSHED_BOUNDARY;

/// Statistics for one labelled region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegionStats {
    pub label: i32,
    /// Number of pixels carrying the label.
    pub area: usize,
    /// Inclusive `(min, max)` extent per axis.
    pub bbox: Vec<(usize, usize)>,
}

/// Area and bounding box of every region (`label >= 1`), sorted by label.
pub fn region_stats<D: Dimension>(labels: &Array<i32, D>) -> Vec<RegionStats> {
    let mut stats = BTreeMap::<i32, RegionStats>::new();

    for (pattern, &label) in labels.indexed_iter() {
        if label <= 0 {
            continue;
        }
        let index = pattern.into_dimension();
        let coords = index.slice();

        let entry = stats.entry(label).or_insert_with(|| RegionStats {
            label,
            area: 0,
            bbox: coords.iter().map(|&c| (c, c)).collect(),
        });
        entry.area += 1;
        for (extent, &c) in entry.bbox.iter_mut().zip(coords) {
            extent.0 = extent.0.min(c);
            extent.1 = extent.1.max(c);
        }
    }

    stats.into_values().collect()
}

/// Number of pixels on watershed lines.
pub fn boundary_pixels<D: Dimension>(labels: &Array<i32, D>) -> usize {
    labels.iter().filter(|&&v| v == WATERSHED_BOUNDARY).count()
}
