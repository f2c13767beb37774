// ============================================================
// Layer 5 - Classifier Panel
// ============================================================
// The fixed panel of tree ensembles the trainer fits for every
// vectorization strategy, behind one Classifier trait:
//
//   RandomForest   100 bagged Gini trees, sqrt features
//   GradientBoost  100 softmax stages of depth-3 trees
//   AdaBoost       50 SAMME stumps
//
// `Model` is the closed, serialisable set of fitted classifiers
// a Selection can carry.

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::adaboost::AdaBoost;
use super::forest::RandomForest;
use super::gradient_boost::GradientBoost;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("cannot fit on an empty dataset")]
    EmptyDataset,

    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("label {label} is outside 0..{n_classes}")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("model has not been fitted")]
    NotFitted,

    #[error("model was fitted on {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("base estimator is worse than random (weighted error {error:.4}); ensemble cannot be fit")]
    WorseThanRandom { error: f64 },
}

pub trait Classifier {
    /// Fit on rows of `x` labelled `y`, with labels in `0..n_classes`.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<(), ModelError>;

    /// One class index per row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<usize>, ModelError>;
}

/// Shared input checks for every `fit`.
pub(crate) fn check_fit_input(
    x:         ArrayView2<'_, f64>,
    y:         &[usize],
    n_classes: usize,
) -> Result<(), ModelError> {
    if x.nrows() == 0 || y.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::LengthMismatch { rows: x.nrows(), labels: y.len() });
    }
    if let Some(&label) = y.iter().find(|&&l| l >= n_classes) {
        return Err(ModelError::LabelOutOfRange { label, n_classes });
    }
    Ok(())
}

/// Shared input check for every `predict`.
pub(crate) fn check_width(expected: Option<usize>, x: ArrayView2<'_, f64>) -> Result<(), ModelError> {
    let expected = expected.ok_or(ModelError::NotFitted)?;
    if x.ncols() != expected {
        return Err(ModelError::FeatureMismatch { expected, actual: x.ncols() });
    }
    Ok(())
}

/// Index of the largest score; the first one wins a tie.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate() {
        if s > scores[best] {
            best = i;
        }
    }
    best
}

// ─── Panel ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassifierKind {
    RandomForest,
    GradientBoost,
    AdaBoost,
}

impl ClassifierKind {
    /// Training order; also the tie-break order within a strategy
    pub const PANEL: [ClassifierKind; 3] = [
        ClassifierKind::RandomForest,
        ClassifierKind::GradientBoost,
        ClassifierKind::AdaBoost,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClassifierKind::RandomForest => "RandomForest",
            ClassifierKind::GradientBoost => "GradientBoost",
            ClassifierKind::AdaBoost => "AdaBoost",
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Seed shared by every model that uses randomness
    pub seed:                u64,
    pub forest_trees:        usize,
    pub boost_stages:        usize,
    pub boost_learning_rate: f64,
    pub boost_max_depth:     usize,
    pub ada_estimators:      usize,
    pub ada_learning_rate:   f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            seed:                42,
            forest_trees:        100,
            boost_stages:        100,
            boost_learning_rate: 0.1,
            boost_max_depth:     3,
            ada_estimators:      50,
            ada_learning_rate:   1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Model {
    RandomForest(RandomForest),
    GradientBoost(GradientBoost),
    AdaBoost(AdaBoost),
}

impl Model {
    /// Unfitted model of `kind`, configured from `config`.
    pub fn new(kind: ClassifierKind, config: &ClassifierConfig) -> Self {
        match kind {
            ClassifierKind::RandomForest => {
                Model::RandomForest(RandomForest::new(config.forest_trees, config.seed))
            }
            ClassifierKind::GradientBoost => Model::GradientBoost(GradientBoost::new(
                config.boost_stages,
                config.boost_learning_rate,
                config.boost_max_depth,
                config.seed,
            )),
            ClassifierKind::AdaBoost => Model::AdaBoost(AdaBoost::new(
                config.ada_estimators,
                config.ada_learning_rate,
                config.seed,
            )),
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            Model::RandomForest(m) => m,
            Model::GradientBoost(m) => m,
            Model::AdaBoost(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            Model::RandomForest(m) => m,
            Model::GradientBoost(m) => m,
            Model::AdaBoost(m) => m,
        }
    }
}

impl Classifier for Model {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<(), ModelError> {
        self.inner_mut().fit(x, y, n_classes)
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<usize>, ModelError> {
        self.inner().predict(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn small_config() -> ClassifierConfig {
        ClassifierConfig {
            forest_trees: 10,
            boost_stages: 10,
            ada_estimators: 10,
            ..ClassifierConfig::default()
        }
    }

    /// Three well separated clusters on the first feature
    fn clusters() -> (Array2<f64>, Vec<usize>) {
        let x = Array2::from_shape_fn((30, 2), |(i, j)| {
            if j == 0 { (i % 3) as f64 * 10.0 + (i / 3) as f64 * 0.1 } else { (i % 2) as f64 }
        });
        let y = (0..30).map(|i| i % 3).collect();
        (x, y)
    }

    #[test]
    fn test_every_model_learns_separable_data() {
        let (x, y) = clusters();
        for kind in ClassifierKind::PANEL {
            let mut model = Model::new(kind, &small_config());
            model.fit(x.view(), &y, 3).unwrap();
            assert_eq!(model.predict(x.view()).unwrap(), y, "{kind} should fit clusters");
        }
    }

    #[test]
    fn test_predict_before_fit_is_not_fitted() {
        let x = array![[1.0, 2.0]];
        for kind in ClassifierKind::PANEL {
            let model = Model::new(kind, &small_config());
            assert_eq!(model.predict(x.view()).unwrap_err(), ModelError::NotFitted);
        }
    }

    #[test]
    fn test_input_checks() {
        let x = array![[1.0], [2.0]];
        let mut model = Model::new(ClassifierKind::RandomForest, &small_config());
        assert_eq!(
            model.fit(x.view(), &[0], 3).unwrap_err(),
            ModelError::LengthMismatch { rows: 2, labels: 1 }
        );
        assert_eq!(
            model.fit(x.view(), &[0, 5], 3).unwrap_err(),
            ModelError::LabelOutOfRange { label: 5, n_classes: 3 }
        );
        let empty = Array2::<f64>::zeros((0, 1));
        assert_eq!(model.fit(empty.view(), &[], 3).unwrap_err(), ModelError::EmptyDataset);
    }

    #[test]
    fn test_feature_width_checked_at_predict() {
        let (x, y) = clusters();
        let mut model = Model::new(ClassifierKind::GradientBoost, &small_config());
        model.fit(x.view(), &y, 3).unwrap();
        let wrong = Array2::<f64>::zeros((1, 5));
        assert_eq!(
            model.predict(wrong.view()).unwrap_err(),
            ModelError::FeatureMismatch { expected: 2, actual: 5 }
        );
    }

    #[test]
    fn test_argmax_first_wins() {
        assert_eq!(argmax(&[0.2, 0.5, 0.5]), 1);
        assert_eq!(argmax(&[1.0]), 0);
    }

    #[test]
    fn test_fitted_model_survives_json() {
        let (x, y) = clusters();
        let mut model = Model::new(ClassifierKind::AdaBoost, &small_config());
        model.fit(x.view(), &y, 3).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back.predict(x.view()).unwrap(), y);
    }
}
