// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the model from a checkpoint (config + weights) on a
// non-autodiff backend and classifies one image at a time.

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use burn::prelude::*;

use crate::data::loader::load_digit_tensor;
use crate::domain::prediction::Prediction;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{model::MnistModel, InferBackend};

pub struct Inferencer<B: Backend = InferBackend> {
    model:  MnistModel<B>,
    device: B::Device,
}

impl<B: Backend> Inferencer<B> {
    /// Load the architecture and weights saved at `ckpt_manager`.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let cfg   = ckpt_manager.load_config()?;
        let model = cfg.init::<B>(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("checkpoint loaded");
        Ok(Self::new(model, device))
    }

    pub fn new(model: MnistModel<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Classify the first image of `images` ([1, 1, 28, 28]).
    pub fn predict(&self, images: Tensor<B, 4>) -> Result<Prediction> {
        let probabilities    = self.model.forward(images);
        let [_, num_classes] = probabilities.dims();
        let scores: Vec<f32> = probabilities
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read model output: {e:?}"))?;

        let first_row = scores.into_iter().take(num_classes).collect();
        Prediction::from_scores(first_row).context("Model produced no class scores")
    }

    /// Load, preprocess and classify the image file at `path`.
    pub fn predict_file(&self, path: &Path) -> Result<Prediction> {
        let images     = load_digit_tensor::<B>(path, &self.device)?;
        let prediction = self.predict(images)?;
        tracing::debug!(
            "'{}' → digit {} (p={:.4})",
            path.display(),
            prediction.digit,
            prediction.confidence()
        );
        Ok(prediction)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{GrayImage, Luma};

    use crate::ml::model::MnistConfig;

    type TestBackend = NdArray;

    #[test]
    fn test_prediction_from_checkpoint_matches_live_model() {
        let dir    = tempfile::tempdir().unwrap();
        let device = Default::default();
        let ckpt   = CheckpointManager::new(dir.path().join("ckpt"));

        let cfg = MnistConfig::new();
        let live: MnistModel<TestBackend> = cfg.init(&device);
        ckpt.save_config(&cfg).unwrap();
        ckpt.save_model(&live).unwrap();

        let image = dir.path().join("digit.png");
        GrayImage::from_fn(40, 40, |x, _| Luma([if (15..25).contains(&x) { 255 } else { 0 }]))
            .save(&image)
            .unwrap();

        let loaded    = Inferencer::<TestBackend>::from_checkpoint(&ckpt, device).unwrap();
        let reference = Inferencer::<TestBackend>::new(live, Default::default());

        let a = loaded.predict_file(&image).unwrap();
        let b = reference.predict_file(&image).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.scores.len(), 10);
        assert!(a.digit < 10);
        assert!((a.scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_image_fails() {
        let device = Default::default();
        let model: MnistModel<TestBackend> = MnistConfig::new().init(&device);
        let inferencer = Inferencer::new(model, device);
        assert!(inferencer.predict_file(Path::new("does/not/exist.png")).is_err());
    }
}
