// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer is written against these traits, never
// against the concrete loader, sink or predictor:
//
//   DatasetSource      - CsvLoader
//   TrackingSink       - FsTrackingSink, NullSink
//   SentimentPredictor - PredictUseCase
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::error::SentimentError;
use crate::domain::review::Sentiment;
use crate::domain::table::RawTable;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Anything that can produce the raw review table.
pub trait DatasetSource {
    fn load(&self) -> Result<RawTable>;
}

// ─── TrackingSink ─────────────────────────────────────────────────────────────
/// Opaque identifier handed out by a TrackingSink for one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Finished,
    Failed,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Finished => "FINISHED",
            RunStatus::Failed => "FAILED",
        }
    }
}

/// Experiment-tracking sink. Runs may nest under a parent run.
///
/// Implementations may fail on any call; the pipeline treats every
/// failure as best-effort and keeps training.
pub trait TrackingSink: Send + Sync {
    fn start_run(&self, name: &str, parent: Option<&RunId>) -> Result<RunId>;

    fn log_param(&self, run: &RunId, key: &str, value: &str) -> Result<()>;

    fn log_metric(&self, run: &RunId, key: &str, value: f64) -> Result<()>;

    /// Store a serialised artifact under a relative, `/`-separated path.
    fn log_artifact(&self, run: &RunId, path: &str, payload: &serde_json::Value) -> Result<()>;

    fn end_run(&self, run: &RunId, status: RunStatus) -> Result<()>;
}

// ─── SentimentPredictor ───────────────────────────────────────────────────────
/// Anything that can label a single review.
pub trait SentimentPredictor: Send + Sync {
    fn predict(&self, text: &str) -> Result<Sentiment, SentimentError>;

    /// Untyped entry point for callers that receive arbitrary JSON.
    fn predict_value(&self, value: &serde_json::Value) -> Result<Sentiment, SentimentError>;
}
