// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer asks for a digit through this trait and
// never sees which backend or checkpoint format answers it.
//
// Implementations:
//   - InferUseCase → loads a checkpoint and runs the CNN
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use anyhow::Result;
use crate::domain::prediction::Prediction;

// ─── DigitRecognizer ──────────────────────────────────────────────────────────
/// Any component that can classify a handwritten digit image file.
pub trait DigitRecognizer {
    /// Read the image at `path` and return the class scores and
    /// the predicted digit.
    fn recognize(&self, path: &Path) -> Result<Prediction>;
}
