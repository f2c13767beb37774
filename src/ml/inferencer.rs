// ============================================================
// Layer 5 - Inferencer
// ============================================================
// Labels one raw review with the current Selection:
//
//   raw text ─► preprocess_single ─► one-row feature matrix ─► model
//
// The feature row is rebuilt in one of two ways:
//
//   ReuseFitted   transform with the vectorizer state kept in the
//                 Selection; the row lives in the training
//                 feature space (default)
//   RefitOnInput  fit a fresh vectorizer of the same strategy on
//                 the single input text, then zero-pad or truncate
//                 to the model's width. Kept for parity with older
//                 deployments; the resulting row does not share the
//                 training feature space
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::data::preprocessor::Preprocessor;
use crate::domain::error::SentimentError;
use crate::domain::review::Sentiment;
use crate::features::fit_transform;
use crate::ml::classifier::Classifier;
use crate::ml::selection::Selection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum FeatureReconstruction {
    #[default]
    ReuseFitted,
    RefitOnInput,
}

pub struct Inferencer {
    preprocessor: Preprocessor,
    mode:         FeatureReconstruction,
}

impl Inferencer {
    pub fn new(mode: FeatureReconstruction) -> Self {
        Self { preprocessor: Preprocessor::new(), mode }
    }

    pub fn predict(&self, text: &str, selection: Option<&Selection>) -> Result<Sentiment, SentimentError> {
        let selection = selection.ok_or(SentimentError::NotReady)?;
        let cleaned   = self.preprocessor.preprocess_single(text);
        self.classify(&cleaned, selection)
    }

    /// Same as `predict` for untyped input; a non-string value is
    /// rejected with InvalidInput once a Selection exists.
    pub fn predict_value(
        &self,
        value:     &serde_json::Value,
        selection: Option<&Selection>,
    ) -> Result<Sentiment, SentimentError> {
        let selection = selection.ok_or(SentimentError::NotReady)?;
        let cleaned   = self.preprocessor.preprocess_value(value)?;
        self.classify(&cleaned, selection)
    }

    fn classify(&self, cleaned: &str, selection: &Selection) -> Result<Sentiment, SentimentError> {
        let row = match self.mode {
            FeatureReconstruction::ReuseFitted => selection.vectorizer.transform(&[cleaned]),
            FeatureReconstruction::RefitOnInput => self.refit_row(cleaned, selection)?,
        };

        let predicted = selection
            .model
            .predict(row.view())
            .map_err(|e| SentimentError::Prediction(e.to_string()))?;

        let class = predicted
            .first()
            .copied()
            .ok_or_else(|| SentimentError::Prediction("model returned no prediction".to_string()))?;

        let label = Sentiment::from_index(class)
            .ok_or_else(|| SentimentError::Prediction(format!("model predicted unknown class {class}")))?;

        tracing::debug!("'{}' -> {} via {}", cleaned, label, selection.label());
        Ok(label)
    }

    fn refit_row(&self, cleaned: &str, selection: &Selection) -> Result<Array2<f64>, SentimentError> {
        let (table, _) = fit_transform(selection.strategy, &[cleaned], &selection.vectorizer_cfg)
            .map_err(|e| {
                SentimentError::Prediction(format!(
                    "refitting {} on the input failed: {e}",
                    selection.strategy
                ))
            })?;

        let width = selection.feature_width;
        if table.width() != width {
            tracing::warn!(
                "Refitted {} produced {} features, model expects {}; conforming",
                selection.strategy,
                table.width(),
                width
            );
        }

        let keep    = table.width().min(width);
        let mut row = Array2::<f64>::zeros((1, width));
        row.slice_mut(s![.., ..keep]).assign(&table.values.slice(s![.., ..keep]));
        Ok(row)
    }
}

impl Default for Inferencer {
    fn default() -> Self {
        Self::new(FeatureReconstruction::default())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{VectorizerConfig, VectorizerKind};
    use crate::ml::classifier::{ClassifierConfig, ClassifierKind, Model};
    use chrono::Utc;
    use serde_json::json;

    fn trained_selection() -> Selection {
        let texts: Vec<String> = (0..30)
            .map(|i| match i % 3 {
                0 => "terrible broken".to_string(),
                1 => "okay average".to_string(),
                _ => "excellent love".to_string(),
            })
            .collect();
        let labels: Vec<usize> = (0..30).map(|i| i % 3).collect();
        let cfg = VectorizerConfig::default();
        let (table, fitted) = fit_transform(VectorizerKind::Bow, &texts, &cfg).unwrap();

        let classifiers = ClassifierConfig { forest_trees: 10, ..ClassifierConfig::default() };
        let mut model   = Model::new(ClassifierKind::RandomForest, &classifiers);
        model.fit(table.values.view(), &labels, 3).unwrap();

        Selection {
            strategy:       VectorizerKind::Bow,
            classifier:     ClassifierKind::RandomForest,
            model,
            vectorizer:     fitted,
            vectorizer_cfg: cfg,
            macro_f1:       1.0,
            feature_width:  table.width(),
            run_id:         None,
            trained_at:     Utc::now(),
        }
    }

    #[test]
    fn test_not_ready_without_selection() {
        let inf = Inferencer::default();
        assert!(matches!(inf.predict("great", None), Err(SentimentError::NotReady)));
        assert!(matches!(inf.predict_value(&json!(5), None), Err(SentimentError::NotReady)));
    }

    #[test]
    fn test_reuse_fitted_predicts_training_labels() {
        let sel = trained_selection();
        let inf = Inferencer::default();
        assert_eq!(inf.predict("Terrible, BROKEN!", Some(&sel)).unwrap(), Sentiment::Negative);
        assert_eq!(inf.predict("Excellent - I love it", Some(&sel)).unwrap(), Sentiment::Positive);
        assert_eq!(inf.predict("okay, average", Some(&sel)).unwrap(), Sentiment::Neutral);
    }

    #[test]
    fn test_any_text_gets_a_valid_label() {
        let sel = trained_selection();
        let inf = Inferencer::default();
        for text in ["", "   ", "completely unrelated words", "!!!"] {
            assert!(Sentiment::ALL.contains(&inf.predict(text, Some(&sel)).unwrap()));
        }
    }

    #[test]
    fn test_predict_value_rejects_non_strings() {
        let sel = trained_selection();
        let inf = Inferencer::default();
        assert!(matches!(
            inf.predict_value(&json!({"text": "hi"}), Some(&sel)),
            Err(SentimentError::InvalidInput(_))
        ));
        assert_eq!(inf.predict_value(&json!("love it, excellent"), Some(&sel)).unwrap(), Sentiment::Positive);
    }

    #[test]
    fn test_refit_mode_conforms_width() {
        let sel = trained_selection();
        let inf = Inferencer::new(FeatureReconstruction::RefitOnInput);
        let row = inf.refit_row("love love excellent", &sel).unwrap();
        assert_eq!(row.shape(), &[1, sel.feature_width]);
        // A one-document vocabulary is ["excellent", "love"], so its
        // columns do not line up with the training columns
        assert_eq!(row[[0, 0]], 1.0);
        assert_eq!(row[[0, 1]], 2.0);
        assert!(Sentiment::ALL.contains(&inf.predict("love love excellent", Some(&sel)).unwrap()));
    }

    #[test]
    fn test_refit_mode_fails_on_blank_input() {
        let sel = trained_selection();
        let inf = Inferencer::new(FeatureReconstruction::RefitOnInput);
        assert!(matches!(inf.predict("   ", Some(&sel)), Err(SentimentError::Prediction(_))));
    }
}
