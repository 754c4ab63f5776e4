// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// Turns an arbitrary raster image into the model's input layout.
//
// Steps (applied in order):
//   1. Convert to single-channel 8-bit grayscale
//   2. Resize to 28×28 with a Lanczos3 filter (anti-aliased)
//   3. Normalise every pixel: value / 255 * 2 - 1
//   4. Lay out row-major as [1, 1, 28, 28]
//
// Reference: image crate documentation (imageops::resize)

use burn::{
    prelude::*,
    tensor::TensorData,
};
use image::{imageops::FilterType, DynamicImage};

/// Side length of the square images the model consumes
pub const IMAGE_SIZE: usize = 28;

/// Map a raw pixel in [0, 255] to [-1, 1].
#[inline]
pub fn normalize_pixel(value: f32) -> f32 {
    value / 255.0 * 2.0 - 1.0
}

pub struct Preprocessor {
    size:   u32,
    filter: FilterType,
}

impl Preprocessor {
    pub fn new() -> Self {
        Self { size: IMAGE_SIZE as u32, filter: FilterType::Lanczos3 }
    }

    /// Grayscale, resize and normalise `image` into a flat row-major
    /// buffer of IMAGE_SIZE * IMAGE_SIZE values.
    pub fn prepare(&self, image: &DynamicImage) -> Vec<f32> {
        let gray    = image.to_luma8();
        let resized = image::imageops::resize(&gray, self.size, self.size, self.filter);

        resized
            .into_raw()
            .into_iter()
            .map(|p| normalize_pixel(p as f32))
            .collect()
    }

    /// Wrap prepared pixels as a single-example batch [1, 1, 28, 28].
    pub fn to_tensor<B: Backend>(&self, pixels: Vec<f32>, device: &B::Device) -> Tensor<B, 4> {
        let size = self.size as usize;
        let data = TensorData::new(pixels, [1, 1, size, size]).convert::<B::FloatElem>();
        Tensor::<B, 4>::from_data(data, device)
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
