// ============================================================
// Layer 3 - Error Taxonomy
// ============================================================
// Most of the application propagates `anyhow::Error`. The cases
// below are the ones a caller has to tell apart: the web layer maps
// NotReady and InvalidInput to user-facing responses, and the
// orchestrator records Training failures per combination instead
// of aborting.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// Malformed or missing dataset columns, unparsable labels,
    /// datasets too small to split.
    #[error("input error: {0}")]
    Input(String),

    /// Prediction requested before any pipeline run succeeded.
    #[error("no trained model is available yet, retrain the pipeline first")]
    NotReady,

    /// Single-text input that is not a string.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A vectorizer or classifier failed to fit.
    #[error("training failed during {stage}: {reason}")]
    Training { stage: String, reason: String },

    /// The selected model could not score the reconstructed features.
    #[error("prediction failed: {0}")]
    Prediction(String),

    /// Every (vectorizer, classifier) combination failed.
    #[error("no model could be trained ({} failures): {}", .0.len(), .0.join("; "))]
    NoModelTrained(Vec<String>),
}

impl SentimentError {
    pub fn training(stage: impl Into<String>, reason: impl ToString) -> Self {
        Self::Training {
            stage:  stage.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_model_trained_lists_failures() {
        let err = SentimentError::NoModelTrained(vec![
            "BoW/AdaBoost: worse than random".to_string(),
            "Word2Vec-CBOW: empty vocabulary".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("2 failures"));
        assert!(msg.contains("BoW/AdaBoost"));
    }

    #[test]
    fn test_training_helper() {
        let err = SentimentError::training("BoW/RandomForest", "boom");
        assert_eq!(err.to_string(), "training failed during BoW/RandomForest: boom");
    }
}
