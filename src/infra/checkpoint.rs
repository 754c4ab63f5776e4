// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's
// NamedMpkGzFileRecorder at full precision, so a reloaded
// model reproduces the saved one bit for bit.
//
// Files, for a checkpoint path `save_temp`:
//   save_temp.mpk.gz   ← all learned parameters (overwritten on save)
//   save_temp.json     ← MnistConfig, needed to rebuild the model
//   metrics.csv        ← per-epoch metrics, next to the checkpoint
//
// Loading validates every parameter shape in the record against
// the freshly built model BEFORE applying it, so an architecture
// mismatch is an error and never a wrongly-shaped model.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{ensure, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};

use crate::ml::model::{record_shapes, MnistConfig, MnistModel, MnistModelRecord};

pub type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

const WEIGHTS_EXTENSION: &str = "mpk.gz";
const CONFIG_EXTENSION:  &str = "json";

/// Manages one checkpoint location on disk.
pub struct CheckpointManager {
    /// Checkpoint path without extension — the recorder appends it
    path: PathBuf,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File the weights are written to / read from
    pub fn weights_file(&self) -> PathBuf {
        let mut file = self.path.clone();
        file.set_extension(WEIGHTS_EXTENSION);
        file
    }

    /// File the architecture config is written to / read from
    pub fn config_file(&self) -> PathBuf {
        self.path.with_extension(CONFIG_EXTENSION)
    }

    /// CSV file for per-epoch training metrics
    pub fn metrics_file(&self) -> PathBuf {
        self.path
            .parent()
            .map(|dir| dir.join("metrics.csv"))
            .unwrap_or_else(|| PathBuf::from("metrics.csv"))
    }

    /// Save all model parameters, replacing any previous checkpoint.
    /// Returns the file that was written.
    pub fn save_model<B: Backend>(&self, model: &MnistModel<B>) -> Result<PathBuf> {
        ensure_parent_dir(&self.path)?;

        CheckpointRecorder::new()
            .record(model.clone().into_record(), self.path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", self.weights_file().display())
            })?;

        tracing::debug!("Saved checkpoint '{}'", self.weights_file().display());
        Ok(self.weights_file())
    }

    /// Load saved parameters into `model`, which must have been built
    /// with the same architecture as the checkpointed one.
    pub fn load_model<B: Backend>(
        &self,
        model:  MnistModel<B>,
        device: &B::Device,
    ) -> Result<MnistModel<B>> {
        let record: MnistModelRecord<B> = CheckpointRecorder::new()
            .load(self.path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    self.weights_file().display()
                )
            })?;

        check_shapes(&model, &record, &self.weights_file())?;
        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &MnistConfig) -> Result<()> {
        let path = self.config_file();
        ensure_parent_dir(&path)?;

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved model config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<MnistConfig> {
        let path = self.config_file();
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;

        let cfg: MnistConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed model config in '{}'", path.display()))?;
        cfg.validate()
            .with_context(|| format!("Unusable model config in '{}'", path.display()))?;
        Ok(cfg)
    }
}

/// Fail unless every tensor in `record` has the shape `model` declares.
pub fn check_shapes<B: Backend>(
    model:  &MnistModel<B>,
    record: &MnistModelRecord<B>,
    source: &Path,
) -> Result<()> {
    let expected = model.param_shapes();
    let found    = record_shapes(record);

    ensure!(
        expected == found,
        "Parameter shapes in '{}' do not match the model: expected {:?}, found {:?}",
        source.display(),
        expected,
        found,
    );
    Ok(())
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create directory '{}'", dir.display()))?;
    }
    Ok(())
}
