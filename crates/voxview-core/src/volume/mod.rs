//! Read-only access to a 3D voxel volume.
//!
//! A [`Volume`] owns the voxel array, the optional voxel spacing and the raw
//! header elements it was loaded with. Slices are borrowed views, so scrubbing
//! through a volume never copies voxel data.

pub mod header;
pub mod loader;

use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayView2, Axis};

use crate::error::{Result, ViewerError};
use crate::types::{SliceAxis, VolumeInfo};

pub use header::{HeaderDictionary, HeaderElement, HeaderEntry, HeaderRow};
pub use loader::{LoadError, VolumeLoader};

#[derive(Clone, Debug)]
pub struct Volume {
    data: Array3<f32>,
    /// Voxel spacing per array axis, in millimetres.
    spacing: Option<[f64; 3]>,
    header: Vec<HeaderElement>,
    source: Option<PathBuf>,
}

impl Volume {
    pub fn new(data: Array3<f32>) -> Self {
        Self {
            data,
            spacing: None,
            header: Vec::new(),
            source: None,
        }
    }

    pub fn with_spacing(mut self, spacing: [f64; 3]) -> Self {
        self.spacing = Some(spacing);
        self
    }

    pub fn with_header(mut self, header: Vec<HeaderElement>) -> Self {
        self.header = header;
        self
    }

    pub fn with_source(mut self, source: impl AsRef<Path>) -> Self {
        self.source = Some(source.as_ref().to_path_buf());
        self
    }

    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    pub fn shape(&self) -> [usize; 3] {
        let (d0, d1, d2) = self.data.dim();
        [d0, d1, d2]
    }

    /// Number of slices along `axis`.
    pub fn len(&self, axis: SliceAxis) -> usize {
        self.data.len_of(Axis(axis.index()))
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn spacing(&self) -> Option<[f64; 3]> {
        self.spacing
    }

    /// `(row, col)` spacing of slices taken along `axis`.
    pub fn in_plane_spacing(&self, axis: SliceAxis) -> Option<(f64, f64)> {
        let spacing = self.spacing?;
        let (row_axis, col_axis) = axis.in_plane_axes();
        Some((spacing[row_axis], spacing[col_axis]))
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Borrow slice `index` along `axis`.
    pub fn slice(&self, axis: SliceAxis, index: usize) -> Result<ArrayView2<'_, f32>> {
        self.check_index(axis, index)?;
        Ok(self.data.index_axis(Axis(axis.index()), index))
    }

    /// Raw intensity at `(row, col)` of slice `index` along `axis`.
    pub fn voxel(&self, axis: SliceAxis, index: usize, row: usize, col: usize) -> Result<f32> {
        let slice = self.slice(axis, index)?;
        let (rows, cols) = slice.dim();
        if row >= rows {
            return Err(ViewerError::IndexOutOfRange {
                axis: axis.in_plane_axes().0,
                index: row,
                len: rows,
            });
        }
        if col >= cols {
            return Err(ViewerError::IndexOutOfRange {
                axis: axis.in_plane_axes().1,
                index: col,
                len: cols,
            });
        }
        Ok(slice[[row, col]])
    }

    pub fn min_value(&self) -> f32 {
        min_max(self.data.iter().copied()).0
    }

    pub fn max_value(&self) -> f32 {
        min_max(self.data.iter().copied()).1
    }

    /// `(min, max)` of a single slice.
    pub fn slice_min_max(&self, axis: SliceAxis, index: usize) -> Result<(f32, f32)> {
        let slice = self.slice(axis, index)?;
        Ok(min_max(slice.iter().copied()))
    }

    /// Header entries with a printable value.
    ///
    /// Every call starts a fresh pass over the header, so the sequence can be
    /// consumed any number of times.
    pub fn header_entries(&self) -> impl Iterator<Item = HeaderEntry<'_>> + '_ {
        self.header.iter().filter_map(HeaderElement::entry)
    }

    pub fn header_elements(&self) -> &[HeaderElement] {
        &self.header
    }

    pub fn info(&self) -> VolumeInfo {
        let (min_value, max_value) = min_max(self.data.iter().copied());
        VolumeInfo {
            source: self.source.clone(),
            shape: self.shape(),
            spacing: self.spacing,
            min_value,
            max_value,
            header_elements: self.header.len(),
        }
    }

    fn check_index(&self, axis: SliceAxis, index: usize) -> Result<()> {
        let len = self.len(axis);
        if index >= len {
            return Err(ViewerError::IndexOutOfRange {
                axis: axis.index(),
                index,
                len,
            });
        }
        Ok(())
    }
}

/// `(min, max)` of a sequence, `(0, 0)` when empty.
pub(crate) fn min_max(values: impl Iterator<Item = f32>) -> (f32, f32) {
    let (lo, hi) = values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        (0.0, 0.0)
    } else {
        (lo, hi)
    }
}
