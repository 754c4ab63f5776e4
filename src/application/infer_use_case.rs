// ============================================================
// Layer 2 — InferUseCase
// ============================================================
// Loads a checkpoint once, then classifies image files through
// the DigitRecognizer trait.

use anyhow::Result;
use std::path::Path;

use crate::domain::{prediction::Prediction, traits::DigitRecognizer};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{inferencer::Inferencer, InferBackend};

pub struct InferUseCase {
    inferencer: Inferencer<InferBackend>,
}

impl InferUseCase {
    pub fn new(checkpoint_path: &Path) -> Result<Self> {
        let ckpt       = CheckpointManager::new(checkpoint_path);
        let inferencer = Inferencer::from_checkpoint(&ckpt, Default::default())?;
        Ok(Self { inferencer })
    }
}

impl DigitRecognizer for InferUseCase {
    fn recognize(&self, path: &Path) -> Result<Prediction> {
        self.inferencer.predict_file(path)
    }
}
