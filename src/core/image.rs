//! The `Image` tensor used throughout the pipeline: a `[1, H, W, 3]` array of
//! `f32` values normalized to `[0, 1]`.
use ndarray::{Array4, ArrayView3, ArrayView4, Axis};

use crate::error::{Error, Result};

/// Number of color channels every image carries.
pub const CHANNELS: usize = 3;

/// Batched RGB image, batch size always 1, values always within `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    data: Array4<f32>,
}

/// Checks the `[1, H, W, 3]` contract shared by pipeline images and model tensors.
pub fn validate_tensor(tensor: &ArrayView4<'_, f32>, role: &str) -> Result<()> {
    let (batch, height, width, channels) = tensor.dim();
    if batch != 1 {
        return Err(Error::shape(format!(
            "{role} must have batch size 1, got {batch}"
        )));
    }
    if channels != CHANNELS {
        return Err(Error::shape(format!(
            "{role} must have {CHANNELS} channels, got {channels}"
        )));
    }
    if height == 0 || width == 0 {
        return Err(Error::shape(format!(
            "{role} has an empty spatial extent {height}x{width}"
        )));
    }
    Ok(())
}

impl Image {
    /// Wrap an array, rejecting wrong shapes and values outside `[0, 1]`.
    pub fn from_array(data: Array4<f32>) -> Result<Self> {
        validate_tensor(&data.view(), "image")?;
        if let Some(bad) = data.iter().find(|v| !(0.0..=1.0).contains(*v)) {
            return Err(Error::shape(format!(
                "image value {bad} lies outside [0, 1]"
            )));
        }
        Ok(Self { data })
    }

    /// Wrap an array, clamping values into `[0, 1]` (NaN becomes 0).
    pub fn from_array_clamped(mut data: Array4<f32>) -> Result<Self> {
        validate_tensor(&data.view(), "image")?;
        data.mapv_inplace(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) });
        Ok(Self { data })
    }

    /// Build from interleaved 8-bit RGB, rescaling to `[0, 1]`.
    pub fn from_rgb8(width: usize, height: usize, pixels: &[u8]) -> Result<Self> {
        let expected = width * height * CHANNELS;
        if pixels.len() != expected {
            return Err(Error::shape(format!(
                "expected {expected} RGB bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        let values: Vec<f32> = pixels.iter().map(|&p| p as f32 / 255.0).collect();
        let data = Array4::from_shape_vec((1, height, width, CHANNELS), values)
            .map_err(|e| Error::shape(e.to_string()))?;
        Self::from_array(data)
    }

    /// Build from a per-pixel function returning values that get clamped.
    pub fn from_fn<F>(height: usize, width: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> f32,
    {
        let data = Array4::from_shape_fn((1, height, width, CHANNELS), |(_, y, x, c)| f(y, x, c));
        Self::from_array_clamped(data)
    }

    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    pub fn width(&self) -> usize {
        self.data.dim().2
    }

    /// `(height, width)`
    pub fn dims(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// The single batch entry as `[H, W, 3]`.
    pub fn pixels(&self) -> ArrayView3<'_, f32> {
        self.data.index_axis(Axis(0), 0)
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    pub fn into_array(self) -> Array4<f32> {
        self.data
    }

    /// Interleaved 8-bit RGB in row-major order.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.data
            .iter()
            .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
            .collect()
    }

    /// Smallest and largest pixel value.
    pub fn value_range(&self) -> (f32, f32) {
        self.data
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_batch_and_channels() {
        let batch2 = Array4::<f32>::zeros((2, 4, 4, 3));
        assert!(matches!(Image::from_array(batch2), Err(Error::Shape(_))));

        let rgba = Array4::<f32>::zeros((1, 4, 4, 4));
        assert!(matches!(Image::from_array(rgba), Err(Error::Shape(_))));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut data = Array4::<f32>::zeros((1, 2, 2, 3));
        data[[0, 1, 1, 2]] = 1.5;
        assert!(matches!(Image::from_array(data.clone()), Err(Error::Shape(_))));

        let clamped = Image::from_array_clamped(data).unwrap();
        assert_eq!(clamped.as_array()[[0, 1, 1, 2]], 1.0);
    }

    #[test]
    fn rgb8_round_trips_extremes() {
        let pixels = [0u8, 128, 255, 255, 0, 64];
        let img = Image::from_rgb8(2, 1, &pixels).unwrap();
        assert_eq!(img.dims(), (1, 2));
        assert_eq!(img.value_range(), (0.0, 1.0));
        assert_eq!(img.to_rgb8(), pixels.to_vec());
    }

    #[test]
    fn rgb8_length_mismatch_is_shape_error() {
        assert!(matches!(
            Image::from_rgb8(3, 3, &[0u8; 10]),
            Err(Error::Shape(_))
        ));
    }
}
