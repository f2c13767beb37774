// ============================================================
// Layer 5 - Selection
// ============================================================
// The winning (classifier, vectorization strategy) pair of one
// pipeline run, bundled with everything inference needs:
//
//   model          the fitted classifier
//   vectorizer     the fitted vectorizer state (vocabulary or
//                  embedding table) for `strategy`
//   vectorizer_cfg the settings `strategy` was fitted with, used
//                  only when inference is asked to refit
//
// A Selection is immutable once built. A new pipeline run
// produces a new Selection; nothing edits one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::{FittedVectorizer, VectorizerConfig, VectorizerKind};
use crate::ml::classifier::{ClassifierKind, Model};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub strategy:       VectorizerKind,
    pub classifier:     ClassifierKind,
    pub model:          Model,
    pub vectorizer:     FittedVectorizer,
    pub vectorizer_cfg: VectorizerConfig,
    pub macro_f1:       f64,
    /// Column count the model was trained on
    pub feature_width:  usize,
    /// Outer tracking run of the pipeline that produced it
    pub run_id:         Option<String>,
    pub trained_at:     DateTime<Utc>,
}

impl Selection {
    /// "<strategy>/<classifier>", the same path the tracking sink
    /// stores the model under
    pub fn label(&self) -> String {
        format!("{}/{}", self.strategy, self.classifier)
    }
}
