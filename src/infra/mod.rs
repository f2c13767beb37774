// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Filesystem-facing concerns shared by the CLI, the web shell
// and the pipeline:
//
//   checkpoint.rs - the single saved Selection plus the
//                   PipelineConfig that produced it
//
//   tracking.rs   - TrackingSink implementations: an MLflow-like
//                   directory tree, and a sink that discards
//
//   metrics.rs    - leaderboard CSV, one row per successful
//                   (vectorizer, classifier) pair per run
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Selection and config persistence
pub mod checkpoint;

/// Experiment tracking sinks
pub mod tracking;

/// Leaderboard CSV logger
pub mod metrics;
