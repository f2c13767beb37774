// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only: no model math, no HTTP, no
// printing. The CLI and the web shell call into this layer.
//
//   train_use_case   - one full pipeline run, best-pair selection
//   predict_use_case - single-text prediction from the store
//   selection_store  - the current Selection, swapped atomically
//   tasks            - span + timing wrapper for pipeline steps
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

pub mod predict_use_case;
pub mod selection_store;
pub mod tasks;
pub mod train_use_case;
