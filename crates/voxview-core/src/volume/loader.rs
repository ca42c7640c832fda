use std::fs;
use std::path::{Path, PathBuf};

use dicom::dictionary_std::tags;
use dicom::object::{open_file, FileDicomObject, InMemDicomObject};
use dicom::pixeldata::{ConvertOptions, PixelDecoder, VoiLutOption};
use ndarray::{s, Array2, Array3, Axis};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::header::HeaderElement;
use super::Volume;

/// Raster formats accepted as per-slice files in a directory series.
const RASTER_EXTENSIONS: [&str; 6] = ["png", "tif", "tiff", "bmp", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Source does not exist: {0}")]
    NotFound(PathBuf),

    #[error("No valid slices found in {0}")]
    NoValidImages(PathBuf),

    #[error("File name has no numeric slice key: {0}")]
    MissingNumericKey(PathBuf),

    #[error("Inconsistent slice dimensions in {path}: {found:?} (expected {expected:?})")]
    InconsistentDimensions {
        path: PathBuf,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Empty pixel data in {0}")]
    EmptyPixelData(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("Pixel data error: {0}")]
    PixelData(#[from] dicom::pixeldata::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Slice pixels plus whatever metadata the file carried.
struct SliceFile {
    pixels: Array3<f32>,
    header: Vec<HeaderElement>,
    spacing: Option<[f64; 3]>,
}

pub struct VolumeLoader;

impl VolumeLoader {
    /// Load a single volumetric file or a directory series.
    pub fn load(path: impl AsRef<Path>) -> Result<Volume, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        if path.is_dir() {
            Self::load_directory(path)
        } else {
            Self::load_file(path)
        }
    }

    /// Load one file. DICOM frames stack along the first axis; a raster
    /// image becomes a single-slice volume.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Volume, LoadError> {
        let path = path.as_ref();
        let slice = read_slice_file(path)?;
        let (depth, rows, cols) = slice.pixels.dim();
        if depth == 0 || rows == 0 || cols == 0 {
            return Err(LoadError::EmptyPixelData(path.to_path_buf()));
        }

        info!(
            path = %path.display(),
            shape = ?(depth, rows, cols),
            "Loaded volume file"
        );

        let mut volume = Volume::new(slice.pixels)
            .with_header(slice.header)
            .with_source(path);
        if let Some(spacing) = slice.spacing {
            volume = volume.with_spacing(spacing);
        }
        Ok(volume)
    }

    /// Load a directory of per-slice files ordered by the number in each
    /// file name.
    pub fn load_directory(path: impl AsRef<Path>) -> Result<Volume, LoadError> {
        let path = path.as_ref();
        let files = Self::series_files(path)?;
        if files.is_empty() {
            return Err(LoadError::NoValidImages(path.to_path_buf()));
        }

        let mut images: Vec<Array2<f32>> = Vec::with_capacity(files.len());
        let mut header = Vec::new();
        let mut spacing = None;

        for (i, file) in files.iter().enumerate() {
            let slice = read_slice_file(file)?;
            if slice.pixels.len_of(Axis(0)) > 1 {
                warn!(path = %file.display(), "Multi-frame file in a series, using the first frame");
            }
            if slice.pixels.is_empty() {
                return Err(LoadError::EmptyPixelData(file.clone()));
            }
            let image = slice.pixels.index_axis_move(Axis(0), 0);

            if i == 0 {
                header = slice.header;
                spacing = slice.spacing;
            } else {
                let expected = images[0].dim();
                if image.dim() != expected {
                    return Err(LoadError::InconsistentDimensions {
                        path: file.clone(),
                        expected,
                        found: image.dim(),
                    });
                }
            }
            images.push(image);
        }

        let volume_array = build_volume_array(&images);
        info!(
            path = %path.display(),
            slices = images.len(),
            shape = ?volume_array.dim(),
            "Loaded slice series"
        );

        let mut volume = Volume::new(volume_array)
            .with_header(header)
            .with_source(path);
        if let Some(spacing) = spacing {
            volume = volume.with_spacing(spacing);
        }
        Ok(volume)
    }

    /// Slice files of a directory sorted by their numeric key.
    pub fn series_files(path: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let mut keyed: Vec<(u64, PathBuf)> = Vec::new();
        for entry in fs::read_dir(path)? {
            let file = entry?.path();
            if !file.is_file() || is_ignored(&file) {
                continue;
            }
            let key = numeric_key(&file).ok_or_else(|| LoadError::MissingNumericKey(file.clone()))?;
            keyed.push((key, file));
        }

        keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        debug!(count = keyed.len(), "Collected series files");
        Ok(keyed.into_iter().map(|(_, file)| file).collect())
    }

    /// Build a volume from an already opened DICOM object.
    pub fn from_dicom_object(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Volume, LoadError> {
        let pixels = decode_frames(dicom_object)?;
        let mut volume = Volume::new(pixels).with_header(read_header(dicom_object));
        if let Some(spacing) = read_spacing(dicom_object) {
            volume = volume.with_spacing(spacing);
        }
        Ok(volume)
    }
}

/// Last run of ASCII digits in the file stem, e.g. `slice_012.dcm` -> 12.
pub fn numeric_key(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let end = stem.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = stem[..end]
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    stem[start..end].parse().ok()
}

fn is_ignored(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_none_or(|name| name.starts_with('.') || name.eq_ignore_ascii_case("DICOMDIR"))
}

fn is_raster(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            RASTER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn read_slice_file(path: &Path) -> Result<SliceFile, LoadError> {
    if is_raster(path) {
        return read_raster(path);
    }

    let dicom_object = open_file(path)?;
    Ok(SliceFile {
        pixels: decode_frames(&dicom_object)?,
        header: read_header(&dicom_object),
        spacing: read_spacing(&dicom_object),
    })
}

/// Raster slice as raw grey levels at the source bit depth.
fn read_raster(path: &Path) -> Result<SliceFile, LoadError> {
    let image = image::open(path)?;
    let color = image.color();
    let (w, h) = (image.width(), image.height());
    let mut pixels = Array3::<f32>::zeros((1, h as usize, w as usize));

    // 8-bit sources keep 0..=255; `to_luma16` would stretch them by 257.
    if color.bytes_per_pixel() == color.channel_count() {
        for (x, y, pixel) in image.to_luma8().enumerate_pixels() {
            pixels[[0, y as usize, x as usize]] = pixel.0[0] as f32;
        }
    } else {
        for (x, y, pixel) in image.to_luma16().enumerate_pixels() {
            pixels[[0, y as usize, x as usize]] = pixel.0[0] as f32;
        }
    }
    debug!(path = %path.display(), ?color, "Read raster slice");
    Ok(SliceFile {
        pixels,
        header: Vec::new(),
        spacing: None,
    })
}

/// Decode every frame, first sample only, modality rescale applied.
fn decode_frames(
    dicom_object: &FileDicomObject<InMemDicomObject>,
) -> Result<Array3<f32>, LoadError> {
    let pixel_data = dicom_object.decode_pixel_data()?;
    let options = ConvertOptions::new().with_voi_lut(VoiLutOption::Identity);
    let frames = pixel_data.to_ndarray_with_options::<f32>(&options)?;
    Ok(frames.slice_move(s![.., .., .., 0]))
}

fn read_header(dicom_object: &FileDicomObject<InMemDicomObject>) -> Vec<HeaderElement> {
    dicom_object
        .iter()
        .filter(|element| element.header().tag != tags::PIXEL_DATA)
        .map(|element| {
            let header = element.header();
            let length = header.len.get();
            match element.to_str() {
                Ok(value) => HeaderElement::new(header.tag, value.into_owned(), length),
                Err(_) => HeaderElement::unprintable(header.tag, length),
            }
        })
        .collect()
}

/// `(slice, row, col)` spacing in millimetres.
fn read_spacing(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<[f64; 3]> {
    let pixel_spacing = dicom_object
        .element(tags::PIXEL_SPACING)
        .ok()?
        .to_multi_float64()
        .ok()?;
    let (row_spacing, col_spacing) = (*pixel_spacing.first()?, *pixel_spacing.get(1)?);

    let slice_spacing = dicom_object
        .element(tags::SPACING_BETWEEN_SLICES)
        .or_else(|_| dicom_object.element(tags::SLICE_THICKNESS))
        .ok()
        .and_then(|element| element.to_float64().ok())
        .unwrap_or(1.0);

    Some([slice_spacing, row_spacing, col_spacing])
}

fn build_volume_array(images: &[Array2<f32>]) -> Array3<f32> {
    let (height, width) = images[0].dim();
    let mut volume = Array3::<f32>::zeros((images.len(), height, width));

    for (i, image) in images.iter().enumerate() {
        volume.slice_mut(s![i, .., ..]).assign(image);
    }

    volume
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_key_takes_last_digit_run() {
        assert_eq!(numeric_key(Path::new("ct2_slice_010.dcm")), Some(10));
        assert_eq!(numeric_key(Path::new("7")), Some(7));
        assert_eq!(numeric_key(Path::new("IM-0001-0042.png")), Some(42));
        assert_eq!(numeric_key(Path::new("scout.dcm")), None);
    }

    #[test]
    fn hidden_and_dicomdir_are_ignored() {
        assert!(is_ignored(Path::new("/data/.DS_Store")));
        assert!(is_ignored(Path::new("/data/DICOMDIR")));
        assert!(!is_ignored(Path::new("/data/IM1.dcm")));
    }
}
