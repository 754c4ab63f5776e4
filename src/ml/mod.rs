// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model math lives here:
//
//   model.rs      — conv(1→32, 3×3) → ReLU → max-pool 2×2
//                   → flatten → dense(5408→10) → softmax
//
//   trainer.rs    — epoch/batch loop: forward, cross-entropy,
//                   backward, Adam step, per-epoch evaluation,
//                   final checkpoint
//
//   evaluator.rs  — mean loss / accuracy over a test stream
//                   on the non-autodiff (evaluation) backend
//
//   inferencer.rs — loads a checkpoint and classifies one image
//
// Backend selection:
//   Training runs on Autodiff<InferBackend>; `model.valid()`
//   strips autodiff for evaluation and inference. NdArray (CPU)
//   is the default, the `wgpu` feature switches to Wgpu.
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Convolutional digit classifier
pub mod model;

/// Training loop with per-epoch evaluation and checkpointing
pub mod trainer;

/// Evaluation pass over a held-out stream
pub mod evaluator;

/// Checkpoint-backed single image inference
pub mod inferencer;

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;
