// ============================================================
// Layer 6 - Leaderboard Logger
// ============================================================
// Records the score of every trained (vectorizer, model) pair to
// a CSV file, one row per pair per pipeline run.
//
// Output file: checkpoints/leaderboard.csv
//
// Example CSV output:
//   run_id,vectorizer,model,macro_f1
//   20261019T101500Z-0001,BoW,RandomForest,0.812345
//   20261019T101500Z-0001,BoW,GradientBoost,0.790210
//   ...
//
// The file is appended to across runs, so it also shows how the
// scores move as the dataset changes.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::features::VectorizerKind;
use crate::ml::classifier::ClassifierKind;

const HEADER: &str = "run_id,vectorizer,model,macro_f1";

/// One trained pair and its held-out score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub vectorizer: VectorizerKind,
    pub model:      ClassifierKind,
    pub macro_f1:   f64,
}

impl ScoreRow {
    pub fn new(vectorizer: VectorizerKind, model: ClassifierKind, macro_f1: f64) -> Self {
        Self { vectorizer, model, macro_f1 }
    }

    /// True if this row strictly beats `best`; NaN never beats anything
    pub fn beats(&self, best: f64) -> bool {
        self.macro_f1 > best
    }
}

/// Appends leaderboard rows to a CSV file.
pub struct LeaderboardLogger {
    csv_path: PathBuf,
}

impl LeaderboardLogger {
    /// Create a new LeaderboardLogger in `dir`.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join("leaderboard.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created leaderboard CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append every row of one pipeline run.
    pub fn log_run(&self, run_id: &str, rows: &[ScoreRow]) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        for row in rows {
            writeln!(f, "{},{},{},{:.6}", run_id, row.vectorizer, row.model, row.macro_f1)?;
        }
        tracing::debug!("Logged {} leaderboard rows for run {}", rows.len(), run_id);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
