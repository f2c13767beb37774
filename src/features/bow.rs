// ============================================================
// Layer 5 - Frequency (Bag-of-Words) Vectorizer
// ============================================================
// Counts vocabulary tokens per document.
//
//   fit:       count every token across the corpus, keep the
//              `max_features` most frequent (ties alphabetical),
//              order the kept columns alphabetically
//   transform: one row per text, cell = occurrences of the
//              column's token; unseen tokens are ignored
//
// A token is a whitespace-separated run of at least two
// characters. The cleaner has already reduced text to lowercase
// ASCII letters and digits, so no further normalisation is done.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VectorizerError;

/// Shortest token kept in the vocabulary
const MIN_TOKEN_LEN: usize = 2;

/// Fitted vocabulary; the column order is `terms` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountVectorizer {
    terms:      Vec<String>,
    vocabulary: HashMap<String, usize>,
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace().filter(|t| t.len() >= MIN_TOKEN_LEN)
}

impl CountVectorizer {
    /// Learn the vocabulary of `texts`, capped at `max_features` terms.
    pub fn fit<S: AsRef<str>>(texts: &[S], max_features: usize) -> Result<Self, VectorizerError> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for text in texts {
            for token in tokens(text.as_ref()) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }

        if counts.is_empty() || max_features == 0 {
            return Err(VectorizerError::EmptyVocabulary);
        }

        // Most frequent first, alphabetical among equals
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        tracing::debug!("BoW vocabulary: {} terms (cap {})", terms.len(), max_features);
        Ok(Self { terms, vocabulary })
    }

    /// Count matrix of shape (texts, vocabulary size).
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((texts.len(), self.terms.len()));
        for (row, text) in texts.iter().enumerate() {
            for token in tokens(text.as_ref()) {
                if let Some(&col) = self.vocabulary.get(token) {
                    out[[row, col]] += 1.0;
                }
            }
        }
        out
    }

    /// Column names in matrix order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_alphabetical_columns() {
        let texts = ["good phone good battery", "bad battery"];
        let bow   = CountVectorizer::fit(&texts, 1000).unwrap();
        assert_eq!(bow.terms(), &["bad", "battery", "good", "phone"]);

        let m = bow.transform(&texts);
        assert_eq!(m.shape(), &[2, 4]);
        assert_eq!(m.row(0).to_vec(), vec![0.0, 1.0, 2.0, 1.0]);
        assert_eq!(m.row(1).to_vec(), vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_width_capped_and_cells_are_counts() {
        let texts: Vec<String> = (0..50)
            .map(|i| format!("w{} w{} common common", i, i + 1))
            .collect();
        let bow = CountVectorizer::fit(&texts, 10).unwrap();
        assert!(bow.len() <= 10);

        let m = bow.transform(&texts);
        assert_eq!(m.ncols(), bow.len());
        assert!(m.iter().all(|&v| v >= 0.0 && v.fract() == 0.0));
        // The most frequent token always survives the cap
        assert!(bow.terms().contains(&"common".to_string()));
    }

    #[test]
    fn test_ties_broken_alphabetically() {
        let bow = CountVectorizer::fit(&["zeta alpha mid"], 2).unwrap();
        assert_eq!(bow.terms(), &["alpha", "mid"]);
    }

    #[test]
    fn test_unseen_and_short_tokens_ignored() {
        let bow = CountVectorizer::fit(&["great value"], 1000).unwrap();
        let m   = bow.transform(&["x great unknown"]);
        assert_eq!(m.row(0).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_empty_corpus_is_error() {
        assert_eq!(
            CountVectorizer::fit(&["", "a b"], 1000).unwrap_err(),
            VectorizerError::EmptyVocabulary
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn test_any_corpus_gives_capped_count_matrix(
                texts in prop::collection::vec("[a-e0-9 ]{0,30}", 1..8),
                max_features in 1usize..12,
            ) {
                match CountVectorizer::fit(&texts, max_features) {
                    Ok(bow) => {
                        let m = bow.transform(&texts);
                        prop_assert_eq!(m.nrows(), texts.len());
                        prop_assert!(m.ncols() <= max_features);
                        prop_assert_eq!(m.ncols(), bow.len());
                        prop_assert!(m.iter().all(|&v| v >= 0.0 && v.fract() == 0.0));
                        for (row, text) in m.rows().into_iter().zip(&texts) {
                            let tokens = text.split_whitespace().count() as f64;
                            prop_assert!(row.sum() <= tokens);
                        }
                    }
                    Err(e) => {
                        prop_assert_eq!(e, VectorizerError::EmptyVocabulary);
                        prop_assert!(texts.iter().all(|t| t.split_whitespace().all(|w| w.len() < 2)));
                    }
                }
            }
        }
    }
}
