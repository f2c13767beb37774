// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// pipeline works with:
//
//   table.rs   - the ingested dataset, cell by cell
//   review.rs  - sentiment labels and review records
//   error.rs   - the error taxonomy callers match on
//   traits.rs  - seams other layers implement
//
// Rules for this layer:
//   - NO feature-matrix or classifier types here
//   - NO file I/O or network calls
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// The raw delimited table as loaded from disk
pub mod table;

// Sentiment labels and raw/cleaned review records
pub mod review;

// Typed errors shared across layers
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
