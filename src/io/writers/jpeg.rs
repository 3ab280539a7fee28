use jpeg_encoder::{ColorType, Encoder};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::core::image::Image;
use crate::error::{Error, Result};

pub fn write_rgb_jpeg(
    output: &Path,
    cols: usize,
    rows: usize,
    rgb_data: &[u8],
    quality: u8,
) -> Result<()> {
    let (width, height) = jpeg_dims(cols, rows)?;
    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    let encoder = Encoder::new(&mut writer, quality.clamp(1, 100));
    encoder
        .encode(rgb_data, width, height, ColorType::Rgb)
        .map_err(Error::external)?;
    Ok(())
}

pub fn write_image_jpeg(output: &Path, image: &Image, quality: u8) -> Result<()> {
    let (rows, cols) = image.dims();
    write_rgb_jpeg(output, cols, rows, &image.to_rgb8(), quality)
}

// JPEG caps both sides at u16::MAX
fn jpeg_dims(cols: usize, rows: usize) -> Result<(u16, u16)> {
    let width = u16::try_from(cols).map_err(|_| Error::InvalidArgument {
        arg: "width",
        value: cols.to_string(),
    })?;
    let height = u16::try_from(rows).map_err(|_| Error::InvalidArgument {
        arg: "height",
        value: rows.to_string(),
    })?;
    Ok((width, height))
}
