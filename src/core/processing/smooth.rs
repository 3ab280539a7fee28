use ndarray::{Array4, Axis};
use tracing::debug;

use crate::core::image::{CHANNELS, Image};
use crate::error::{Error, Result};

pub const DEFAULT_KERNEL: usize = 3;
pub const DEFAULT_STRIDE: usize = 1;

/// Output length and leading pad for one SAME-padded spatial axis.
fn same_padding(len: usize, kernel: usize, stride: usize) -> (usize, usize) {
    let out = len.div_ceil(stride);
    let pad_total = ((out - 1) * stride + kernel).saturating_sub(len);
    (out, pad_total / 2)
}

/// Clipped `[start, end)` input range covered by output index `o`.
fn window(o: usize, stride: usize, pad: usize, kernel: usize, len: usize) -> (usize, usize) {
    let start = (o * stride) as isize - pad as isize;
    let end = (start + kernel as isize).min(len as isize);
    (start.max(0) as usize, end.max(0) as usize)
}

/// Average pool over the spatial axes with SAME padding.
///
/// Padded cells do not count toward the mean, so a constant image stays
/// constant up to the borders.
pub fn smooth(image: &Image, kernel: usize, stride: usize) -> Result<Image> {
    if kernel == 0 {
        return Err(Error::InvalidArgument {
            arg: "kernel",
            value: kernel.to_string(),
        });
    }
    if stride == 0 {
        return Err(Error::InvalidArgument {
            arg: "stride",
            value: stride.to_string(),
        });
    }

    let (rows, cols) = image.dims();
    let (out_rows, pad_top) = same_padding(rows, kernel, stride);
    let (out_cols, pad_left) = same_padding(cols, kernel, stride);
    debug!(
        "Average pool {}x{} kernel={} stride={} -> {}x{}",
        cols, rows, kernel, stride, out_cols, out_rows
    );

    let src = image.pixels();
    let mut out = Array4::<f32>::zeros((1, out_rows, out_cols, CHANNELS));
    {
        let mut dst = out.index_axis_mut(Axis(0), 0);
        for oy in 0..out_rows {
            let (y0, y1) = window(oy, stride, pad_top, kernel, rows);
            for ox in 0..out_cols {
                let (x0, x1) = window(ox, stride, pad_left, kernel, cols);
                let count = ((y1 - y0) * (x1 - x0)) as f32;
                for c in 0..CHANNELS {
                    let mut sum = 0.0f32;
                    for y in y0..y1 {
                        for x in x0..x1 {
                            sum += src[[y, x, c]];
                        }
                    }
                    dst[[oy, ox, c]] = sum / count;
                }
            }
        }
    }
    Image::from_array_clamped(out)
}
