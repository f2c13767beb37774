// ============================================================
// Layer 2 - PredictUseCase
// ============================================================
// Serves single-text predictions from whatever Selection the
// store holds at call time. Each call takes one snapshot, so a
// retrain that publishes mid-request cannot mix two Selections.

use std::sync::Arc;

use crate::application::selection_store::SelectionStore;
use crate::domain::error::SentimentError;
use crate::domain::review::Sentiment;
use crate::domain::traits::SentimentPredictor;
use crate::ml::inferencer::{FeatureReconstruction, Inferencer};

pub struct PredictUseCase {
    store:      Arc<SelectionStore>,
    inferencer: Inferencer,
}

impl PredictUseCase {
    pub fn new(store: Arc<SelectionStore>, mode: FeatureReconstruction) -> Self {
        Self { store, inferencer: Inferencer::new(mode) }
    }
}

impl SentimentPredictor for PredictUseCase {
    fn predict(&self, text: &str) -> Result<Sentiment, SentimentError> {
        let snapshot = self.store.snapshot();
        self.inferencer.predict(text, snapshot.as_deref())
    }

    fn predict_value(&self, value: &serde_json::Value) -> Result<Sentiment, SentimentError> {
        let snapshot = self.store.snapshot();
        self.inferencer.predict_value(value, snapshot.as_deref())
    }
}
