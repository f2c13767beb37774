// ============================================================
// Layer 5 - Trainer
// ============================================================
// Fits the classifier panel on one feature table and scores each
// model on a held-out split.
//
//   1. Seeded shuffle split (default 80/20, seed 42)
//   2. For each ClassifierKind in PANEL order:
//        fit on train rows, predict test rows, macro-F1
//   3. Return one outcome per classifier, success or failure
//
// A classifier that fails to fit is reported as a
// TrainingFailure in its slot; the others still run. The trainer
// does no I/O: logging to a tracking sink is the caller's job.

use ndarray::Axis;

use crate::data::splitter::split_train_test;
use crate::domain::error::SentimentError;
use crate::domain::review::Sentiment;
use crate::features::FeatureTable;
use crate::ml::classifier::{Classifier, ClassifierConfig, ClassifierKind, Model, ModelError};
use crate::ml::metrics::macro_f1;

/// One fitted, scored classifier.
#[derive(Debug, Clone)]
pub struct TrainedModelRecord {
    pub classifier: ClassifierKind,
    pub model:      Model,
    pub macro_f1:   f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingFailure {
    pub classifier: ClassifierKind,
    pub error:      ModelError,
}

pub type ModelOutcome = Result<TrainedModelRecord, TrainingFailure>;

#[derive(Debug, Clone)]
pub struct Trainer {
    test_fraction: f64,
    split_seed:    u64,
    classifiers:   ClassifierConfig,
}

impl Trainer {
    pub fn new(test_fraction: f64, split_seed: u64, classifiers: ClassifierConfig) -> Self {
        Self { test_fraction, split_seed, classifiers }
    }

    pub fn train_and_score(
        &self,
        features: &FeatureTable,
        labels:   &[Sentiment],
    ) -> Result<Vec<ModelOutcome>, SentimentError> {
        let n = features.n_rows();
        if n != labels.len() {
            return Err(SentimentError::Input(format!(
                "{} feature rows but {} labels",
                n,
                labels.len()
            )));
        }

        // ── Split ─────────────────────────────────────────────────────────────
        let (train_idx, test_idx) = split_train_test(n, self.test_fraction, self.split_seed);
        if train_idx.is_empty() || test_idx.is_empty() {
            return Err(SentimentError::Input(format!(
                "{n} rows cannot be split into non-empty train and test sets (test fraction {})",
                self.test_fraction
            )));
        }

        let x_train = features.values.select(Axis(0), &train_idx);
        let x_test  = features.values.select(Axis(0), &test_idx);
        let y_train: Vec<usize> = train_idx.iter().map(|&i| labels[i].index()).collect();
        let y_test:  Vec<usize> = test_idx.iter().map(|&i| labels[i].index()).collect();

        // ── Fit and score the panel ───────────────────────────────────────────
        let outcomes = ClassifierKind::PANEL
            .iter()
            .map(|&kind| {
                let mut model = Model::new(kind, &self.classifiers);
                let scored = model
                    .fit(x_train.view(), &y_train, Sentiment::COUNT)
                    .and_then(|()| model.predict(x_test.view()))
                    .map(|y_pred| macro_f1(&y_test, &y_pred));

                match scored {
                    Ok(score) => {
                        tracing::info!(
                            "{} on {}: macro_f1={:.4}",
                            kind,
                            features.strategy,
                            score
                        );
                        Ok(TrainedModelRecord { classifier: kind, model, macro_f1: score })
                    }
                    Err(error) => {
                        tracing::warn!("{} on {} failed: {}", kind, features.strategy, error);
                        Err(TrainingFailure { classifier: kind, error })
                    }
                }
            })
            .collect();

        Ok(outcomes)
    }
}
