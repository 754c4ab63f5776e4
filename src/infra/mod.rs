// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs — Saving and loading model weights
//                   (Burn NamedMpkGz recorder, full precision)
//                   plus the architecture config as JSON so
//                   inference can rebuild the exact model.
//
//   export.rs     — Standalone inference artefact: a binary
//                   record + config in its own directory,
//                   checked against the live model on export.
//
//   metrics.rs    — Per-epoch loss/accuracy appended to CSV.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Records and Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Inference model export and re-load
pub mod export;

/// Training metrics CSV logger
pub mod metrics;
