// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the configuration
//   Step 2: Load train / test datasets  (Layer 4 - data)
//   Step 3: Save the model config       (Layer 6 - infra)
//   Step 4: Run the training loop       (Layer 5 - ml)
//   Step 5: Export + verify the inference model (Layer 6 - infra)

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use burn::{module::AutodiffModule, tensor::backend::AutodiffBackend};

use crate::data::dataset::DatasetSource;
use crate::infra::{checkpoint::CheckpointManager, export::InferenceExporter, metrics::EpochMetrics};
use crate::ml::{model::MnistConfig, trainer::run_training, TrainBackend};

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub epochs:          usize,
    pub batch_size:      usize,
    pub learning_rate:   f64,
    pub seed:            u64,
    /// Print a progress line every this many batches
    pub log_interval:    usize,
    /// Checkpoint path without extension
    pub checkpoint_path: PathBuf,
    pub export_dir:      PathBuf,
    pub dataset:         DatasetSource,
    pub model:           MnistConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs:          5,
            batch_size:      64,
            learning_rate:   1e-3,
            seed:            42,
            log_interval:    100,
            checkpoint_path: PathBuf::from("save_temp"),
            export_dir:      PathBuf::from("model/simple_mnist"),
            dataset:         DatasetSource::Mnist,
            model:           MnistConfig::new(),
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.epochs > 0, "epochs must be a positive integer");
        ensure!(self.batch_size > 0, "batch_size must be a positive integer");
        ensure!(self.log_interval > 0, "log_interval must be a positive integer");
        ensure!(
            self.learning_rate > 0.0 && self.learning_rate.is_finite(),
            "learning_rate must be positive, got {}",
            self.learning_rate
        );
        self.model.validate()
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn checkpoint(&self) -> CheckpointManager {
        CheckpointManager::new(&self.config.checkpoint_path)
    }

    /// Execute the full training pipeline on the default backend.
    pub fn execute(&self) -> Result<Vec<EpochMetrics>> {
        self.execute_on::<TrainBackend>(Default::default())
    }

    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<Vec<EpochMetrics>> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Datasets ──────────────────────────────────────────────────
        tracing::info!("Loading datasets ({:?})", cfg.dataset);
        let (train_dataset, test_dataset) = cfg.dataset.load();

        // ── Step 3: Save config for inference ─────────────────────────────────
        let ckpt_manager = self.checkpoint();
        ckpt_manager.save_config(&cfg.model)?;

        // ── Step 4: Training loop ─────────────────────────────────────────────
        let report = run_training::<B, _>(cfg, train_dataset, test_dataset, &ckpt_manager, device.clone())?;

        // ── Step 5: Export inference model ────────────────────────────────────
        let exporter = InferenceExporter::new(&cfg.export_dir);
        let model    = report.model.valid();
        exporter.export(&model, &cfg.model)?;
        exporter.verify(&model, &device)?;

        Ok(report.epochs)
    }
}
