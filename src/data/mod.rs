// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw pixels and model-ready tensors.
//
//   MNIST / synthetic items
//       │
//       ▼
//   DigitDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   MnistBatcher      → stacks items into [N,1,28,28] / [N] tensors
//       │
//       ▼
//   DataLoader        → feeds shuffled batches to the training loop
//
//   image file ─► loader ─► preprocessor ─► [1,1,28,28] tensor
//
// Training items and inference images share one pixel
// normalisation: value / 255 * 2 - 1, mapping [0,255] to [-1,1].
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// MNIST / synthetic dataset sources
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Reads an image file from disk
pub mod loader;

/// Grayscale, resize and normalise a single image
pub mod preprocessor;
