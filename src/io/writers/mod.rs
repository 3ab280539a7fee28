pub mod jpeg;
pub mod png;

use std::path::Path;

use tracing::info;

use crate::core::image::Image;
use crate::error::Result;
use crate::types::OutputFormat;

/// Write an image to disk in the requested format.
pub fn save_image(output: &Path, image: &Image, format: OutputFormat, jpeg_quality: u8) -> Result<()> {
    match format {
        OutputFormat::Jpeg => jpeg::write_image_jpeg(output, image, jpeg_quality)?,
        OutputFormat::Png => png::write_image_png(output, image)?,
    }
    info!("Saved {}x{} image to {:?}", image.width(), image.height(), output);
    Ok(())
}
