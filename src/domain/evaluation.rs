// ============================================================
// Layer 3 — Evaluation Summary
// ============================================================
// Accumulates one (loss, accuracy) pair per evaluated batch and
// reduces them to their arithmetic means. Each batch counts
// equally, regardless of how many examples it held.

use serde::{Deserialize, Serialize};

/// Mean loss and accuracy over an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Mean of per-batch mean cross-entropy losses (NaN when no batches)
    pub loss: f64,

    /// Mean of per-batch accuracies in [0.0, 1.0] (0.0 when no batches)
    pub accuracy: f64,

    /// Number of batches that contributed
    pub batches: usize,
}

/// Collects per-batch results during an evaluation pass.
#[derive(Debug, Default, Clone)]
pub struct EvalAccumulator {
    losses:     Vec<f64>,
    accuracies: Vec<f64>,
}

impl EvalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch's mean loss and accuracy
    pub fn push(&mut self, loss: f64, accuracy: f64) {
        self.losses.push(loss);
        self.accuracies.push(accuracy);
    }

    pub fn finish(&self) -> EvalSummary {
        let batches = self.losses.len();
        if batches == 0 {
            return EvalSummary { loss: f64::NAN, accuracy: 0.0, batches };
        }
        EvalSummary {
            loss:     mean(&self.losses),
            accuracy: mean(&self.accuracies),
            batches,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_means_are_per_batch() {
        let mut acc = EvalAccumulator::new();
        acc.push(2.0, 0.5);
        acc.push(1.0, 1.0);
        let s = acc.finish();
        assert_eq!(s.batches, 2);
        assert!((s.loss - 1.5).abs() < 1e-12);
        assert!((s.accuracy - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_empty_pass() {
        let s = EvalAccumulator::new().finish();
        assert_eq!(s.batches, 0);
        assert!(s.loss.is_nan());
        assert_eq!(s.accuracy, 0.0);
    }
}
