// ============================================================
// Layer 4 — Image Loader
// ============================================================
// Reads a single image file (any format the `image` crate can
// decode: PNG, JPEG, BMP, PGM, ...) and hands it to the
// Preprocessor. A missing or undecodable file is an error.

use std::path::Path;

use anyhow::{Context, Result};
use burn::prelude::*;
use image::DynamicImage;

use crate::data::preprocessor::Preprocessor;

/// Decode the image file at `path`.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path)
        .with_context(|| format!("Cannot open image '{}'", path.display()))
}

/// Load, preprocess and batch one image as a [1, 1, 28, 28] tensor.
pub fn load_digit_tensor<B: Backend>(path: &Path, device: &B::Device) -> Result<Tensor<B, 4>> {
    let image  = load_image(path)?;
    let pre    = Preprocessor::new();
    let pixels = pre.prepare(&image);

    tracing::debug!(
        "Loaded '{}' ({}x{}) → {} pixels",
        path.display(),
        image.width(),
        image.height(),
        pixels.len()
    );

    Ok(pre.to_tensor::<B>(pixels, device))
}
