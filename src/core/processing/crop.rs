use ndarray::s;
use tracing::debug;

use crate::core::image::Image;
use crate::error::Result;

/// Square crop window anchored at `(offset_y, offset_x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub offset_y: usize,
    pub offset_x: usize,
    pub size: usize,
}

pub fn center_crop_window(height: usize, width: usize) -> CropWindow {
    CropWindow {
        offset_y: height.saturating_sub(width) / 2,
        offset_x: width.saturating_sub(height) / 2,
        size: height.min(width),
    }
}

/// Crop the largest centered square. No resizing happens here.
pub fn crop_center(image: &Image) -> Result<Image> {
    let (height, width) = image.dims();
    let window = center_crop_window(height, width);
    if window.size == height && window.size == width {
        return Ok(image.clone());
    }

    debug!(
        "Center crop {}x{} -> {}x{} at offset ({}, {})",
        width, height, window.size, window.size, window.offset_x, window.offset_y
    );

    let cropped = image
        .view()
        .slice(s![
            ..,
            window.offset_y..window.offset_y + window.size,
            window.offset_x..window.offset_x + window.size,
            ..
        ])
        .to_owned();
    Image::from_array(cropped)
}
