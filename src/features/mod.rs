// ============================================================
// Layer 5 - Vectorization
// ============================================================
// Turns cleaned review texts into a fixed-width numeric matrix.
//
//   VectorizerKind      which strategy ("BoW", "Word2Vec-CBOW",
//                       "Word2Vec-SkipGram")
//   fit_transform       fits a strategy on a corpus and returns
//                       the FeatureTable plus the fitted state
//   FittedVectorizer    the fitted state; `transform` maps new
//                       texts into the same feature space
//
// The fitted state travels inside the Selection so that
// inference never has to refit on a single document.

pub mod bow;
pub mod word2vec;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use bow::CountVectorizer;
use word2vec::{EmbeddingTable, Objective, Word2Vec};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorizerError {
    #[error("empty vocabulary: no token survived the frequency filter")]
    EmptyVocabulary,
}

// ─── Strategy names ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VectorizerKind {
    #[serde(rename = "BoW")]
    Bow,
    #[serde(rename = "Word2Vec-CBOW")]
    Word2VecCbow,
    #[serde(rename = "Word2Vec-SkipGram")]
    Word2VecSkipGram,
}

impl VectorizerKind {
    /// Iteration order of the pipeline; also the tie-break order
    pub const ALL: [VectorizerKind; 3] = [
        VectorizerKind::Bow,
        VectorizerKind::Word2VecCbow,
        VectorizerKind::Word2VecSkipGram,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VectorizerKind::Bow => "BoW",
            VectorizerKind::Word2VecCbow => "Word2Vec-CBOW",
            VectorizerKind::Word2VecSkipGram => "Word2Vec-SkipGram",
        }
    }
}

impl fmt::Display for VectorizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Configuration ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Vocabulary cap of the frequency strategy
    pub max_features: usize,
    pub vector_size:  usize,
    pub window:       usize,
    pub min_count:    usize,
    pub epochs:       usize,
    pub negative:     usize,
    pub alpha:        f32,
    pub min_alpha:    f32,
    /// Frequent-token downsampling threshold; 0 disables it
    pub sample:       f64,
    /// None trains embeddings from OS entropy
    pub seed:         Option<u64>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            vector_size:  100,
            window:       3,
            min_count:    2,
            epochs:       5,
            negative:     5,
            alpha:        0.025,
            min_alpha:    0.0001,
            sample:       1e-3,
            seed:         None,
        }
    }
}

// ─── Feature table and fitted state ───────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub strategy: VectorizerKind,
    pub columns:  Vec<String>,
    /// One row per input text, in input order
    pub values:   Array2<f64>,
}

impl FeatureTable {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedVectorizer {
    Bow(CountVectorizer),
    Embedding(EmbeddingTable),
}

impl FittedVectorizer {
    /// Map texts into the fitted feature space.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Array2<f64> {
        match self {
            FittedVectorizer::Bow(bow) => bow.transform(texts),
            FittedVectorizer::Embedding(table) => table.transform(texts),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            FittedVectorizer::Bow(bow) => bow.len(),
            FittedVectorizer::Embedding(table) => table.dim(),
        }
    }

    pub fn columns(&self) -> Vec<String> {
        match self {
            FittedVectorizer::Bow(bow) => bow.terms().to_vec(),
            FittedVectorizer::Embedding(table) => (0..table.dim()).map(|i| i.to_string()).collect(),
        }
    }
}

/// Fit `kind` on `texts` and vectorize them.
pub fn fit_transform<S: AsRef<str>>(
    kind:   VectorizerKind,
    texts:  &[S],
    config: &VectorizerConfig,
) -> Result<(FeatureTable, FittedVectorizer), VectorizerError> {
    let fitted = match kind {
        VectorizerKind::Bow => FittedVectorizer::Bow(CountVectorizer::fit(texts, config.max_features)?),
        VectorizerKind::Word2VecCbow => {
            FittedVectorizer::Embedding(Word2Vec::new(config, Objective::Cbow).train(texts)?)
        }
        VectorizerKind::Word2VecSkipGram => {
            FittedVectorizer::Embedding(Word2Vec::new(config, Objective::SkipGram).train(texts)?)
        }
    };

    let table = FeatureTable {
        strategy: kind,
        columns:  fitted.columns(),
        values:   fitted.transform(texts),
    };
    tracing::info!("{kind}: feature table {} x {}", table.n_rows(), table.width());
    Ok((table, fitted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts() -> Vec<String> {
        (0..30)
            .map(|i| match i % 3 {
                0 => "love screen love price".to_string(),
                1 => "hate battery hate screen".to_string(),
                _ => "okay battery okay price".to_string(),
            })
            .collect()
    }

    fn small_config() -> VectorizerConfig {
        VectorizerConfig {
            vector_size: 8,
            seed: Some(7),
            ..VectorizerConfig::default()
        }
    }

    #[test]
    fn test_names_and_order() {
        let names: Vec<&str> = VectorizerKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names, vec!["BoW", "Word2Vec-CBOW", "Word2Vec-SkipGram"]);
        assert_eq!(serde_json::to_string(&VectorizerKind::Bow).unwrap(), "\"BoW\"");
    }

    #[test]
    fn test_every_strategy_keeps_row_count_and_width() {
        let cfg = small_config();
        for kind in VectorizerKind::ALL {
            let (table, fitted) = fit_transform(kind, &texts(), &cfg).unwrap();
            assert_eq!(table.strategy, kind);
            assert_eq!(table.n_rows(), 30);
            assert_eq!(table.width(), fitted.width());
            assert_eq!(table.columns.len(), table.width());
        }
    }

    #[test]
    fn test_transform_reuses_fit() {
        let (table, fitted) = fit_transform(VectorizerKind::Bow, &texts(), &small_config()).unwrap();
        let again = fitted.transform(&texts()[..1]);
        assert_eq!(again.row(0), table.values.row(0));
        // A single new document keeps the training width
        assert_eq!(fitted.transform(&["love"]).ncols(), table.width());
    }

    #[test]
    fn test_fitted_state_survives_json() {
        let (_, fitted) = fit_transform(VectorizerKind::Word2VecSkipGram, &texts(), &small_config()).unwrap();
        let json  = serde_json::to_string(&fitted).unwrap();
        let back: FittedVectorizer = serde_json::from_str(&json).unwrap();
        let (a, b) = (back.transform(&["love battery"]), fitted.transform(&["love battery"]));
        assert_eq!(a.dim(), b.dim());
        assert!(a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-6));
    }
}
