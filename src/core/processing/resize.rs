use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image as FirImage};
use ndarray::Array4;
use tracing::{debug, info};

use crate::core::image::{CHANNELS, Image};
use crate::error::{Error, Result};
use crate::types::ResizeFilter;

/// Output `(height, width)` for a resize request.
///
/// Without aspect preservation the target is used as is. With it, the image is
/// scaled uniformly to the largest size fitting inside the target.
pub fn calculate_resize_dimensions(
    original_rows: usize,
    original_cols: usize,
    target: (usize, usize),
    preserve_aspect_ratio: bool,
) -> (usize, usize) {
    if !preserve_aspect_ratio {
        return target;
    }

    let (target_rows, target_cols) = target;
    let scale_factor = (target_rows as f64 / original_rows as f64)
        .min(target_cols as f64 / original_cols as f64);
    let new_rows = ((original_rows as f64 * scale_factor).round() as usize).max(1);
    let new_cols = ((original_cols as f64 * scale_factor).round() as usize).max(1);
    (new_rows, new_cols)
}

fn resize_alg(filter: ResizeFilter) -> ResizeAlg {
    match filter {
        ResizeFilter::Nearest => ResizeAlg::Nearest,
        ResizeFilter::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
        ResizeFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
        ResizeFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
    }
}

/// Resize interleaved RGB `f32` pixels.
pub fn resize_f32x3_image(
    data: &[f32],
    original_cols: usize,
    original_rows: usize,
    target_cols: usize,
    target_rows: usize,
    filter: ResizeFilter,
) -> Result<Vec<f32>> {
    let resize_options = ResizeOptions::new().resize_alg(resize_alg(filter));
    let mut resizer = Resizer::new();

    // fast_image_resize works on raw bytes; f32 pixels travel little-endian
    let src_bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();

    let src_image = FirImage::from_vec_u8(
        original_cols as u32,
        original_rows as u32,
        src_bytes,
        PixelType::F32x3,
    )
    .map_err(|e| Error::Processing(format!("source buffer rejected: {e}")))?;
    let mut dst_image = FirImage::new(target_cols as u32, target_rows as u32, PixelType::F32x3);
    resizer
        .resize(&src_image, &mut dst_image, &resize_options)
        .map_err(|e| Error::Processing(format!("resize failed: {e}")))?;

    let dst_bytes = dst_image.into_vec();
    Ok(dst_bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Scale an image to `target = (height, width)`.
///
/// Requests that resolve to the current size return the input unchanged, which
/// makes repeated resizes to the same target idempotent. Interpolated values
/// are clamped back into `[0, 1]`.
pub fn resize(
    image: &Image,
    target: (usize, usize),
    preserve_aspect_ratio: bool,
    filter: ResizeFilter,
) -> Result<Image> {
    let (target_rows, target_cols) = target;
    if target_rows == 0 || target_cols == 0 {
        return Err(Error::ZeroSize {
            size: target_rows.min(target_cols),
        });
    }

    let (rows, cols) = image.dims();
    let (new_rows, new_cols) =
        calculate_resize_dimensions(rows, cols, target, preserve_aspect_ratio);
    if (new_rows, new_cols) == (rows, cols) {
        debug!("Image already {}x{}, skipping resize", cols, rows);
        return Ok(image.clone());
    }

    info!(
        "Original size: {}x{}, New size: {}x{} ({})",
        cols, rows, new_cols, new_rows, filter
    );

    let src = image.pixels();
    let src = src.as_standard_layout();
    let data = src
        .as_slice()
        .ok_or_else(|| Error::Processing("image buffer is not contiguous".to_string()))?;
    let resized = resize_f32x3_image(data, cols, rows, new_cols, new_rows, filter)?;

    let array = Array4::from_shape_vec((1, new_rows, new_cols, CHANNELS), resized)
        .map_err(|e| Error::shape(e.to_string()))?;
    Image::from_array_clamped(array)
}
