use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::core::image::Image;
use crate::error::{Error, Result};

pub fn write_image_png(output: &Path, image: &Image) -> Result<()> {
    let (rows, cols) = image.dims();
    let buffer = RgbImage::from_raw(cols as u32, rows as u32, image.to_rgb8())
        .ok_or_else(|| Error::Processing("RGB buffer does not match image size".to_string()))?;
    buffer
        .save_with_format(output, ImageFormat::Png)
        .map_err(Error::external)
}
