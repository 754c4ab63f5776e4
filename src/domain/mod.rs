// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what the system produces:
// a class prediction for one image, and the aggregated
// loss/accuracy of an evaluation pass.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Per-image class scores and the selected digit
pub mod prediction;

// Mean loss / accuracy over a stream of batches
pub mod evaluation;

// Core abstractions (traits) that other layers implement
pub mod traits;
