// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Example CSV output:
//   epoch,train_loss,test_loss,test_acc
//   0,0.312400,0.118200,0.964700
//   1,0.101300,0.083400,0.974100
//
// The header is written once; later runs append.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Epoch index (starts at 0)
    pub epoch: usize,

    /// Full training batches processed; the short trailing batch is not counted
    pub train_batches: usize,

    /// Mean cross-entropy over the kept training batches
    pub train_loss: f64,

    /// Mean of per-batch test losses
    pub test_loss: f64,

    /// Mean of per-batch test accuracies, in [0.0, 1.0]
    pub test_acc: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch: usize,
        train_batches: usize,
        train_loss: f64,
        test_loss: f64,
        test_acc: f64,
    ) -> Self {
        Self { epoch, train_batches, train_loss, test_loss, test_acc }
    }

    /// Returns true if this epoch improved over the previous best test loss
    pub fn is_improvement(&self, best_test_loss: f64) -> bool {
        self.test_loss < best_test_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the CSV header if the file is new.
    pub fn new(csv_path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = csv_path.into();

        if let Some(dir) = csv_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "epoch,train_loss,test_loss,test_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.test_loss, m.test_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics over {} batches: test_loss={:.4}, test_acc={:.4}",
            m.epoch,
            m.train_batches,
            m.test_loss,
            m.test_acc,
        );
        Ok(())
    }
}
