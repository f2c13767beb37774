// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates one full pipeline run:
//
//   Step 1: Load the review table         (Layer 4 - data)
//   Step 2: Clean and label the rows      (Layer 4 - data)
//   Step 3: For every vectorizer kind:
//             vectorize                   (features)
//             fit and score the panel     (Layer 5 - ml)
//             log each pair to tracking   (Layer 6 - infra)
//   Step 4: Pick the best pair            (select_best)
//
// Every step runs through `run_task`. A vectorizer or classifier
// failure is recorded as a ComboFailure and the run carries on;
// only ingestion and preprocessing errors abort it. The result
// is a fresh Selection: publishing and persisting it is left to
// the caller.
//
// Tracking layout of one run:
//
//   Full-Pipeline
//     ├── BoW/RandomForest          params, macro_f1, model.json
//     ├── BoW/GradientBoost
//     ├── ...
//     └── Word2Vec-SkipGram/AdaBoost   (FAILED if it did not fit)
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::tasks::run_task;
use crate::data::{
    dataset::ReviewCorpus,
    loader::CsvLoader,
    preprocessor::{ColumnSpec, Preprocessor},
};
use crate::domain::error::SentimentError;
use crate::domain::traits::{DatasetSource, RunId, RunStatus, TrackingSink};
use crate::features::{fit_transform, FittedVectorizer, VectorizerConfig, VectorizerKind};
use crate::infra::{checkpoint::CheckpointManager, metrics::LeaderboardLogger, metrics::ScoreRow};
use crate::ml::classifier::{ClassifierConfig, ClassifierKind, Model};
use crate::ml::inferencer::FeatureReconstruction;
use crate::ml::selection::Selection;
use crate::ml::trainer::Trainer;

// ─── Pipeline Configuration ──────────────────────────────────────────────────
// Everything one pipeline run depends on. Saved next to the
// checkpoint; `predict` reads the reconstruction mode back from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_path:      String,
    pub review_column:  String,
    pub label_column:   String,
    pub tracking_dir:   String,
    pub experiment:     String,
    pub checkpoint_dir: String,
    pub test_fraction:  f64,
    pub split_seed:     u64,
    pub vectorizer:     VectorizerConfig,
    pub classifiers:    ClassifierConfig,
    pub reconstruction: FeatureReconstruction,
    pub no_tracking:    bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let columns = ColumnSpec::default();
        Self {
            data_path:      "Dataset/Product_Reviews.csv".to_string(),
            review_column:  columns.review,
            label_column:   columns.label,
            tracking_dir:   "mlruns".to_string(),
            experiment:     "llm project".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            test_fraction:  0.2,
            split_seed:     42,
            vectorizer:     VectorizerConfig::default(),
            classifiers:    ClassifierConfig::default(),
            reconstruction: FeatureReconstruction::default(),
            no_tracking:    false,
        }
    }
}

impl PipelineConfig {
    pub fn columns(&self) -> ColumnSpec {
        ColumnSpec {
            review: self.review_column.clone(),
            label:  self.label_column.clone(),
        }
    }
}

// ─── Outcome ──────────────────────────────────────────────────────────────────
/// A (vectorizer, classifier) pair that produced no model.
/// `classifier` is None when the vectorizer itself failed, which
/// takes the whole panel for that strategy down with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ComboFailure {
    pub vectorizer: VectorizerKind,
    pub classifier: Option<ClassifierKind>,
    pub reason:     String,
}

impl ComboFailure {
    pub fn label(&self) -> String {
        match self.classifier {
            Some(classifier) => format!("{}/{}", self.vectorizer, classifier),
            None => self.vectorizer.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub selection:   Selection,
    /// Every successful pair, in strategy-then-classifier order
    pub leaderboard: Vec<ScoreRow>,
    pub failures:    Vec<ComboFailure>,
}

/// Index of the highest-scoring row. The first maximum wins and a
/// NaN score is never picked.
pub fn select_best(rows: &[ScoreRow]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, row) in rows.iter().enumerate() {
        match best {
            None if !row.macro_f1.is_nan() => best = Some((i, row.macro_f1)),
            Some((_, score)) if row.beats(score) => best = Some((i, row.macro_f1)),
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

// ─── Tracker ──────────────────────────────────────────────────────────────────
// Best-effort front for a TrackingSink: a sink error is logged and
// swallowed, never allowed to fail the pipeline. Calls against a
// run that never started are skipped.
pub struct Tracker {
    sink: Arc<dyn TrackingSink>,
}

impl Tracker {
    pub fn new(sink: Arc<dyn TrackingSink>) -> Self {
        Self { sink }
    }

    pub fn start_run(&self, name: &str, parent: Option<&RunId>) -> Option<RunId> {
        match self.sink.start_run(name, parent) {
            Ok(run) => Some(run),
            Err(e) => {
                tracing::warn!("Tracking: cannot start run '{name}': {e:#}");
                None
            }
        }
    }

    pub fn log_param(&self, run: Option<&RunId>, key: &str, value: &str) {
        if let Some(run) = run {
            warn_on_error("log_param", self.sink.log_param(run, key, value));
        }
    }

    pub fn log_metric(&self, run: Option<&RunId>, key: &str, value: f64) {
        if let Some(run) = run {
            warn_on_error("log_metric", self.sink.log_metric(run, key, value));
        }
    }

    pub fn log_artifact<T: Serialize>(&self, run: Option<&RunId>, path: &str, payload: &T) {
        let Some(run) = run else { return };
        match serde_json::to_value(payload) {
            Ok(value) => warn_on_error("log_artifact", self.sink.log_artifact(run, path, &value)),
            Err(e) => tracing::warn!("Tracking: cannot serialise artifact '{path}': {e}"),
        }
    }

    pub fn end_run(&self, run: Option<&RunId>, status: RunStatus) {
        if let Some(run) = run {
            warn_on_error("end_run", self.sink.end_run(run, status));
        }
    }
}

fn warn_on_error(call: &str, result: Result<()>) {
    if let Err(e) = result {
        tracing::warn!("Tracking: {call} failed: {e:#}");
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config:  PipelineConfig,
    tracker: Tracker,
}

/// A successful pair awaiting selection. `slot` indexes the
/// fitted vectorizers of the run.
struct Candidate {
    model: Model,
    slot:  usize,
}

impl TrainUseCase {
    pub fn new(config: PipelineConfig, sink: Arc<dyn TrackingSink>) -> Self {
        Self { config, tracker: Tracker::new(sink) }
    }

    /// Run the whole pipeline under an outer `Full-Pipeline` run.
    pub fn execute(&self) -> Result<PipelineOutcome> {
        let outer  = self.tracker.start_run("Full-Pipeline", None);
        let result = self.run_pipeline(outer.as_ref());

        let status = if result.is_ok() { RunStatus::Finished } else { RunStatus::Failed };
        self.tracker.end_run(outer.as_ref(), status);
        result
    }

    fn run_pipeline(&self, outer: Option<&RunId>) -> Result<PipelineOutcome> {
        let cfg = &self.config;

        // ── Step 1: Ingest ────────────────────────────────────────────────────
        let table = run_task("ingest", || CsvLoader::new(&cfg.data_path).load())?;

        // ── Step 2: Preprocess ────────────────────────────────────────────────
        let records = run_task("preprocess", || {
            Ok(Preprocessor::new().bulk_preprocess(&table, &cfg.columns())?)
        })?;
        let corpus = ReviewCorpus::from_records(&records);
        if corpus.is_empty() {
            return Err(SentimentError::Input("no usable rows left after preprocessing".into()).into());
        }
        let [neg, neu, pos] = corpus.class_counts();
        tracing::info!("Corpus: {} reviews ({neg} negative, {neu} neutral, {pos} positive)", corpus.len());

        // ── Step 3: Vectorize, train and score every pair ─────────────────────
        let trainer = Trainer::new(cfg.test_fraction, cfg.split_seed, cfg.classifiers.clone());

        let mut vectorizers: Vec<(VectorizerKind, FittedVectorizer, usize)> = Vec::new();
        let mut leaderboard: Vec<ScoreRow> = Vec::new();
        let mut candidates:  Vec<Candidate> = Vec::new();
        let mut failures:    Vec<ComboFailure> = Vec::new();

        for kind in VectorizerKind::ALL {
            let fitted = run_task(&format!("vectorize {kind}"), || {
                Ok(fit_transform(kind, corpus.texts(), &cfg.vectorizer)?)
            });
            let (features, fitted) = match fitted {
                Ok(pair) => pair,
                Err(e) => {
                    let failure = ComboFailure {
                        vectorizer: kind,
                        classifier: None,
                        reason:     format!("{:#}", SentimentError::training(kind.name(), e)),
                    };
                    self.track_failure(outer, &failure);
                    failures.push(failure);
                    continue;
                }
            };

            let outcomes = run_task(&format!("train {kind}"), || {
                Ok(trainer.train_and_score(&features, corpus.labels())?)
            })?;

            let slot = vectorizers.len();
            vectorizers.push((kind, fitted, features.width()));

            for outcome in outcomes {
                match outcome {
                    Ok(record) => {
                        let row = ScoreRow::new(kind, record.classifier, record.macro_f1);
                        self.track_success(outer, &row, &record.model);
                        leaderboard.push(row);
                        candidates.push(Candidate { model: record.model, slot });
                    }
                    Err(failed) => {
                        let failure = ComboFailure {
                            vectorizer: kind,
                            classifier: Some(failed.classifier),
                            reason:     failed.error.to_string(),
                        };
                        self.track_failure(outer, &failure);
                        failures.push(failure);
                    }
                }
            }
        }

        // ── Step 4: Select the best pair ──────────────────────────────────────
        let Some(best) = select_best(&leaderboard) else {
            let reasons = failures.iter().map(|f| format!("{}: {}", f.label(), f.reason)).collect();
            return Err(SentimentError::NoModelTrained(reasons).into());
        };

        let winner = &leaderboard[best];
        let Candidate { model, slot } = candidates.swap_remove(best);
        let (strategy, vectorizer, feature_width) = vectorizers.swap_remove(slot);

        let selection = Selection {
            strategy,
            classifier: winner.model,
            model,
            vectorizer,
            vectorizer_cfg: cfg.vectorizer.clone(),
            macro_f1: winner.macro_f1,
            feature_width,
            run_id: outer.map(|r| r.0.clone()),
            trained_at: Utc::now(),
        };
        tracing::info!(
            "Best pair: {} (macro_f1={:.4}); {} trained, {} failed",
            selection.label(),
            selection.macro_f1,
            leaderboard.len(),
            failures.len()
        );

        Ok(PipelineOutcome { selection, leaderboard, failures })
    }

    fn track_success(&self, outer: Option<&RunId>, row: &ScoreRow, model: &Model) {
        let name = format!("{}/{}", row.vectorizer, row.model);
        let run  = self.tracker.start_run(&name, outer);
        self.tracker.log_param(run.as_ref(), "vectorizer", row.vectorizer.name());
        self.tracker.log_param(run.as_ref(), "model", row.model.name());
        self.tracker.log_metric(run.as_ref(), "macro_f1", row.macro_f1);
        self.tracker.log_artifact(run.as_ref(), &name, model);
        self.tracker.end_run(run.as_ref(), RunStatus::Finished);
    }

    fn track_failure(&self, outer: Option<&RunId>, failure: &ComboFailure) {
        let run = self.tracker.start_run(&failure.label(), outer);
        self.tracker.log_param(run.as_ref(), "vectorizer", failure.vectorizer.name());
        if let Some(classifier) = failure.classifier {
            self.tracker.log_param(run.as_ref(), "model", classifier.name());
        }
        self.tracker.log_param(run.as_ref(), "error", &failure.reason);
        self.tracker.end_run(run.as_ref(), RunStatus::Failed);
    }

    /// Save the Selection, this config and the leaderboard rows to
    /// the checkpoint directory.
    pub fn persist(&self, outcome: &PipelineOutcome) -> Result<()> {
        let ckpt = CheckpointManager::new(&self.config.checkpoint_dir)?;
        ckpt.save_selection(&outcome.selection)?;
        ckpt.save_config(&self.config)?;

        let run_id = outcome.selection.run_id.as_deref().unwrap_or("untracked");
        LeaderboardLogger::new(ckpt.dir())?
            .log_run(run_id, &outcome.leaderboard)
            .context("Cannot append to leaderboard")?;
        Ok(())
    }
}

// ─── Test Fixtures ────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::io::Write;

    const NEGATIVE: &[&str] = &["terrible", "broken", "refund", "awful", "cracked"];
    const NEUTRAL:  &[&str] = &["okay", "average", "decent", "ordinary", "fine"];
    const POSITIVE: &[&str] = &["excellent", "love", "great", "perfect", "amazing"];

    /// 100 distinct reviews; the label follows from the vocabulary.
    pub fn write_dataset() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "Product Review,Sentiment").unwrap();
        for i in 0..100 {
            let (words, label) = match i % 3 {
                0 => (NEGATIVE, 0),
                1 => (NEUTRAL, 1),
                _ => (POSITIVE, 2),
            };
            let a = words[i % words.len()];
            let b = words[(i / 3 + 1) % words.len()];
            writeln!(f, "\"{a} {b} phone, order {i}\",{label}").unwrap();
        }
        f.flush().unwrap();
        f
    }

    pub fn small_config(data: &tempfile::NamedTempFile) -> PipelineConfig {
        PipelineConfig {
            data_path:   data.path().display().to_string(),
            vectorizer:  VectorizerConfig {
                vector_size: 16,
                epochs:      3,
                min_count:   1,
                seed:        Some(7),
                ..VectorizerConfig::default()
            },
            classifiers: ClassifierConfig {
                forest_trees:   10,
                boost_stages:   10,
                ada_estimators: 10,
                ..ClassifierConfig::default()
            },
            ..PipelineConfig::default()
        }
    }
}
