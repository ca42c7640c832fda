use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use ndarray::{Array2, Array3};

use crate::error::{Result, ViewerError};
use crate::register::to_rgb_image;

fn format_for(path: &Path) -> ImageFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => ImageFormat::Tiff,
        _ => ImageFormat::Png,
    }
}

/// Convert an 8-bit display slice to an image buffer.
pub fn to_gray_image(data: &Array2<u8>) -> GrayImage {
    let (h, w) = data.dim();
    GrayImage::from_fn(w as u32, h as u32, |x, y| Luma([data[[y as usize, x as usize]]]))
}

/// Save an 8-bit slice, TIFF for `.tif`/`.tiff`, PNG otherwise.
pub fn save_gray(data: &Array2<u8>, path: &Path) -> Result<()> {
    to_gray_image(data).save_with_format(path, format_for(path))?;
    Ok(())
}

/// Save an `(rows, cols, 3)` RGB array.
pub fn save_rgb(rgb: &Array3<u8>, path: &Path) -> Result<()> {
    if rgb.dim().2 != 3 {
        return Err(ViewerError::InvalidArgument(format!(
            "RGB image needs 3 channels (got {})",
            rgb.dim().2
        )));
    }
    to_rgb_image(rgb).save_with_format(path, format_for(path))?;
    Ok(())
}

/// Save a raw slice as 16-bit grey, stretched by its own min/max.
pub fn save_raw_u16(data: &Array2<f32>, path: &Path) -> Result<()> {
    let (h, w) = data.dim();
    let (min, max) = crate::volume::min_max(data.iter().copied());
    let span = max - min;

    let pixels: Vec<u16> = data
        .iter()
        .map(|&v| {
            if span > 0.0 {
                ((v - min) / span * 65535.0).round() as u16
            } else {
                0
            }
        })
        .collect();

    let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or_else(|| ViewerError::InvalidArgument("image buffer size mismatch".into()))?;
    img.save_with_format(path, format_for(path))?;
    Ok(())
}
