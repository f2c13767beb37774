// ============================================================
// Layer 5 - ML / Model Layer
// ============================================================
// Everything that fits or applies a classifier lives here. The
// application layer only sees the Trainer, the Selection and the
// Inferencer; the tree ensembles behind them are private detail.
//
// What's in this layer:
//
//   tree.rs           CART tree with pluggable split criterion
//   forest.rs         random forest (rayon-parallel bagging)
//   gradient_boost.rs softmax gradient boosting
//   adaboost.rs       SAMME AdaBoost over stumps
//   classifier.rs     Classifier trait, ModelError, the panel
//   metrics.rs        macro-averaged F1
//   trainer.rs        split, fit the panel, score each model
//   selection.rs      the winning model + fitted vectorizer
//   inferencer.rs     single-text prediction with a Selection
//
// Reference: Breiman (2001) Random Forests
//            Friedman (2001) Gradient Boosting Machine
//            Zhu et al. (2009) Multi-class AdaBoost

pub mod adaboost;
pub mod classifier;
pub mod forest;
pub mod gradient_boost;
pub mod tree;

/// Macro-F1 scoring
pub mod metrics;

/// Fits and scores the classifier panel on one feature table
pub mod trainer;

/// Best model of a pipeline run
pub mod selection;

/// Inference engine - rebuilds features and predicts one label
pub mod inferencer;
