// ============================================================
// Layer 6 — Inference Model Export
// ============================================================
// Writes a self-contained inference artefact, separate from the
// training checkpoint:
//
//   model/simple_mnist/
//     model.bin           ← parameters, Burn binary record
//     model_config.json   ← architecture
//
// An exported model is only trusted once it has been shown to
// reproduce the live model: `verify` reloads the artefact and
// compares both outputs on a fixed, seeded reference image.

use anyhow::{anyhow, ensure, Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{BinFileRecorder, FullPrecisionSettings, Recorder},
    tensor::TensorData,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::infra::checkpoint::check_shapes;
use crate::ml::model::{MnistConfig, MnistModel, MnistModelRecord};

pub type ExportRecorder = BinFileRecorder<FullPrecisionSettings>;

/// Largest absolute output difference accepted between the live
/// model and its re-loaded export.
pub const EXPORT_TOLERANCE: f32 = 1e-5;

/// Seed of the reference image `verify` feeds both models.
pub const REFERENCE_SEED: u64 = 1234;

pub struct InferenceExporter {
    dir: PathBuf,
}

impl InferenceExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn model_file(&self) -> PathBuf {
        self.dir.join("model.bin")
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join("model_config.json")
    }

    /// Write the model parameters and architecture into the export
    /// directory, replacing a previous export.
    pub fn export<B: Backend>(&self, model: &MnistModel<B>, cfg: &MnistConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create export dir '{}'", self.dir.display()))?;

        ExportRecorder::new()
            .record(model.clone().into_record(), self.dir.join("model"))
            .with_context(|| format!("Failed to export model to '{}'", self.model_file().display()))?;

        fs::write(self.config_file(), serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write '{}'", self.config_file().display()))?;

        tracing::info!("Inference model exported to '{}'", self.dir.display());
        Ok(())
    }

    /// Rebuild the exported model on `device`.
    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<MnistModel<B>> {
        let json = fs::read_to_string(self.config_file())
            .with_context(|| format!("Cannot read '{}'", self.config_file().display()))?;
        let cfg: MnistConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed model config in '{}'", self.config_file().display()))?;
        cfg.validate()
            .with_context(|| format!("Unusable model config in '{}'", self.config_file().display()))?;

        let record: MnistModelRecord<B> = ExportRecorder::new()
            .load(self.dir.join("model"), device)
            .with_context(|| format!("Cannot load exported model '{}'", self.model_file().display()))?;

        let model = cfg.init::<B>(device);
        check_shapes(&model, &record, &self.model_file())?;
        Ok(model.load_record(record))
    }

    /// Reload the export and compare it against `model` on the seeded
    /// reference image. Returns the max absolute difference.
    pub fn verify<B: Backend>(&self, model: &MnistModel<B>, device: &B::Device) -> Result<f32> {
        let exported = self.load::<B>(device)?;
        let input    = reference_image::<B>(device);

        let live = scores(model.forward(input.clone()))?;
        let back = scores(exported.forward(input))?;

        let max_diff = live
            .iter()
            .zip(back.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f32, f32::max);

        ensure!(
            max_diff <= EXPORT_TOLERANCE,
            "Exported model diverges from the trained model (max diff {max_diff:e})"
        );
        tracing::debug!("Export verified, max diff {:e}", max_diff);
        Ok(max_diff)
    }
}

/// [1, 1, 28, 28] image with pixels uniform in [-1, 1), drawn from
/// `REFERENCE_SEED` so every call yields the same tensor.
pub fn reference_image<B: Backend>(device: &B::Device) -> Tensor<B, 4> {
    let mut rng = StdRng::seed_from_u64(REFERENCE_SEED);
    let pixels: Vec<f32> = (0..28 * 28).map(|_| rng.gen_range(-1.0..1.0)).collect();
    Tensor::from_data(
        TensorData::new(pixels, [1, 1, 28, 28]).convert::<B::FloatElem>(),
        device,
    )
}

fn scores<B: Backend>(output: Tensor<B, 2>) -> Result<Vec<f32>> {
    output
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read model output: {e:?}"))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_export_then_verify() {
        let dir      = tempfile::tempdir().unwrap();
        let device   = Default::default();
        let exporter = InferenceExporter::new(dir.path().join("simple_mnist"));

        let cfg = MnistConfig::new();
        let model: MnistModel<TestBackend> = cfg.init(&device);
        exporter.export(&model, &cfg).unwrap();

        assert!(exporter.model_file().exists());
        assert!(exporter.config_file().exists());
        assert_eq!(exporter.verify(&model, &device).unwrap(), 0.0);
    }

    #[test]
    fn test_verify_detects_different_model() {
        let dir      = tempfile::tempdir().unwrap();
        let device   = Default::default();
        let exporter = InferenceExporter::new(dir.path());

        let cfg   = MnistConfig::new();
        let saved: MnistModel<TestBackend> = cfg.init(&device);
        let other: MnistModel<TestBackend> = cfg.init(&device);
        exporter.export(&saved, &cfg).unwrap();

        assert!(exporter.verify(&other, &device).is_err());
    }

    #[test]
    fn test_reference_image_is_deterministic() {
        let device = Default::default();
        let a = reference_image::<TestBackend>(&device).into_data().to_vec::<f32>().unwrap();
        let b = reference_image::<TestBackend>(&device).into_data().to_vec::<f32>().unwrap();
        assert_eq!(a.len(), 28 * 28);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn test_verify_ignores_backend_seed() {
        let dir      = tempfile::tempdir().unwrap();
        let device   = Default::default();
        let exporter = InferenceExporter::new(dir.path());

        let cfg = MnistConfig::new();
        let model: MnistModel<TestBackend> = cfg.init(&device);
        exporter.export(&model, &cfg).unwrap();

        TestBackend::seed(1);
        let first = exporter.verify(&model, &device).unwrap();
        TestBackend::seed(2);
        let second = exporter.verify(&model, &device).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_rejects_unusable_config() {
        let dir      = tempfile::tempdir().unwrap();
        let device   = Default::default();
        let exporter = InferenceExporter::new(dir.path());

        let cfg = MnistConfig::new();
        let model: MnistModel<TestBackend> = cfg.init(&device);
        exporter.export(&model, &cfg).unwrap();

        for bad in [MnistConfig::new().with_pool_size(0), MnistConfig::new().with_image_size(32)] {
            fs::write(exporter.config_file(), serde_json::to_string(&bad).unwrap()).unwrap();
            assert!(exporter.load::<TestBackend>(&device).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_load_without_export_fails() {
        let dir      = tempfile::tempdir().unwrap();
        let exporter = InferenceExporter::new(dir.path().join("missing"));
        assert!(exporter.load::<TestBackend>(&Default::default()).is_err());
    }
}
