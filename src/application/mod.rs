// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
//
//   train_use_case.rs — datasets → training loop → checkpoint
//                       → inference export
//   infer_use_case.rs — checkpoint → one image → predicted digit
//
// No model math and no printing of results here; that belongs
// to Layer 5 and Layer 1 respectively.

// The training workflow
pub mod train_use_case;

// The single-image inference workflow
pub mod infer_use_case;
