// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Persists the latest Selection so a restarted server or the
// `predict` command can serve without retraining.
//
// What gets saved:
//   1. selection.json        - the winning model, its fitted
//                              vectorizer and its score
//   2. pipeline_config.json  - the configuration of the run that
//                              produced it
//
// There is one slot: every successful pipeline run overwrites
// both files. Writes go to a temporary file first and are then
// renamed, so a reader never sees a half-written checkpoint.
//
// File layout:
//   checkpoints/
//     selection.json
//     pipeline_config.json
//     leaderboard.csv        (written by infra::metrics)
//
// Reference: Rust Book §9 (Error Handling)
//            serde_json documentation

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::application::train_use_case::PipelineConfig;
use crate::ml::selection::Selection;

const SELECTION_FILE: &str = "selection.json";
const CONFIG_FILE: &str = "pipeline_config.json";

/// Manages the checkpoint directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Overwrite the saved Selection.
    pub fn save_selection(&self, selection: &Selection) -> Result<()> {
        let path = self.dir.join(SELECTION_FILE);
        write_json_atomic(&path, selection)?;
        tracing::info!(
            "Saved selection {} (macro_f1={:.4}) to '{}'",
            selection.label(),
            selection.macro_f1,
            path.display()
        );
        Ok(())
    }

    /// Load the saved Selection.
    /// Returns Ok(None) when nothing has been trained yet.
    pub fn load_selection_if_exists(&self) -> Result<Option<Selection>> {
        let path = self.dir.join(SELECTION_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read selection from '{}'", path.display()))?;
        let selection: Selection = serde_json::from_str(&json)
            .with_context(|| format!("Selection file '{}' is corrupt", path.display()))?;

        tracing::info!("Loaded selection {} from '{}'", selection.label(), path.display());
        Ok(Some(selection))
    }

    /// Save the pipeline configuration next to the selection.
    pub fn save_config(&self, cfg: &PipelineConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        write_json_atomic(&path, cfg)?;
        tracing::debug!("Saved pipeline config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<PipelineConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' first.",
                path.display()
            )
        })?;

        Ok(serde_json::from_str(&json)?)
    }
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp  = path.with_extension("json.tmp");

    fs::write(&tmp, json).with_context(|| format!("Cannot write '{}'", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Cannot move '{}' into place", path.display()))?;
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{fit_transform, VectorizerConfig, VectorizerKind};
    use crate::ml::classifier::{Classifier, ClassifierConfig, ClassifierKind, Model};

    fn selection() -> Selection {
        let texts = ["good value", "bad value", "good price", "bad price"];
        let cfg   = VectorizerConfig::default();
        let (table, fitted) = fit_transform(VectorizerKind::Bow, &texts, &cfg).unwrap();
        let mut model = Model::new(
            ClassifierKind::GradientBoost,
            &ClassifierConfig { boost_stages: 5, ..ClassifierConfig::default() },
        );
        model.fit(table.values.view(), &[2, 0, 2, 0], 3).unwrap();
        Selection {
            strategy:       VectorizerKind::Bow,
            classifier:     ClassifierKind::GradientBoost,
            model,
            vectorizer:     fitted,
            vectorizer_cfg: cfg,
            macro_f1:       0.75,
            feature_width:  table.width(),
            run_id:         Some("run-1".into()),
            trained_at:     chrono::Utc::now(),
        }
    }

    #[test]
    fn test_missing_selection_is_none() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert!(ckpt.load_selection_if_exists().unwrap().is_none());
    }

    #[test]
    fn test_selection_round_trip_and_overwrite() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().join("nested")).unwrap();

        let first = selection();
        ckpt.save_selection(&first).unwrap();
        let mut second = selection();
        second.macro_f1 = 0.9;
        ckpt.save_selection(&second).unwrap();

        let loaded = ckpt.load_selection_if_exists().unwrap().unwrap();
        assert_eq!(loaded.macro_f1, 0.9);
        assert_eq!(loaded.model, second.model);
        assert_eq!(loaded.vectorizer, second.vectorizer);
        assert!(!dir.path().join("nested/selection.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_selection_is_error() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        fs::write(dir.path().join(SELECTION_FILE), "{not json").unwrap();
        assert!(ckpt.load_selection_if_exists().is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let dir  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path()).unwrap();
        assert!(ckpt.load_config().is_err());

        let cfg = PipelineConfig { test_fraction: 0.25, ..PipelineConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        assert_eq!(ckpt.load_config().unwrap(), cfg);
    }
}
