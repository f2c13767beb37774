// ============================================================
// Layer 5 - Word2Vec Embedding Trainer
// ============================================================
// Learns dense token vectors with negative sampling, in either
// of the two classic objectives:
//
//   CBOW:      predict the centre token from the mean of its
//              context vectors
//   Skip-gram: predict the centre token from each context
//              vector on its own
//
// Training loop per epoch:
//   1. Drop out-of-vocabulary tokens and downsample frequent
//      ones (keep probability from `sample`)
//   2. Shrink the window at random for each position
//   3. One positive and `negative` negative updates per
//      prediction; negatives drawn from unigram^0.75
//   4. Learning rate decays linearly from `alpha` to
//      `min_alpha` over all epochs
//
// The result is an EmbeddingTable, which averages token vectors
// into one row per text.
//
// Reference: Mikolov et al. (2013) Distributed Representations
//            of Words and Phrases and their Compositionality

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{VectorizerConfig, VectorizerError};

/// Unigram exponent of the negative-sampling distribution
const NEG_POWER: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    Cbow,
    SkipGram,
}

/// Trained token vectors. Row `i` of `vectors` belongs to the
/// token mapped to `i` in `index`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingTable {
    index:   HashMap<String, usize>,
    vectors: Array2<f32>,
}

impl EmbeddingTable {
    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn vector(&self, token: &str) -> Option<ArrayView1<'_, f32>> {
        self.index.get(token).map(|&i| self.vectors.row(i))
    }

    /// One row per text: the mean of its known token vectors, or
    /// zeros when no token is known.
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Array2<f64> {
        let dim     = self.dim();
        let mut out = Array2::<f64>::zeros((texts.len(), dim));

        for (row, text) in texts.iter().enumerate() {
            let mut sum   = Array1::<f64>::zeros(dim);
            let mut known = 0usize;
            for token in text.as_ref().split_whitespace() {
                if let Some(v) = self.vector(token) {
                    sum.zip_mut_with(&v, |s, &x| *s += f64::from(x));
                    known += 1;
                }
            }
            if known > 0 {
                sum /= known as f64;
                out.row_mut(row).assign(&sum);
            }
        }
        out
    }
}

pub struct Word2Vec {
    dim:       usize,
    window:    usize,
    min_count: usize,
    epochs:    usize,
    negative:  usize,
    alpha:     f32,
    min_alpha: f32,
    sample:    f64,
    objective: Objective,
    seed:      Option<u64>,
}

/// Vocabulary built before training; sorted by count, then token.
struct Vocab {
    words:  Vec<String>,
    counts: Vec<usize>,
    index:  HashMap<String, usize>,
}

impl Word2Vec {
    pub fn new(config: &VectorizerConfig, objective: Objective) -> Self {
        Self {
            dim:       config.vector_size,
            window:    config.window.max(1),
            min_count: config.min_count,
            epochs:    config.epochs.max(1),
            negative:  config.negative,
            alpha:     config.alpha,
            min_alpha: config.min_alpha,
            sample:    config.sample,
            objective,
            seed:      config.seed,
        }
    }

    /// Train on whitespace-tokenised `texts`.
    pub fn train<S: AsRef<str>>(&self, texts: &[S]) -> Result<EmbeddingTable, VectorizerError> {
        let sentences: Vec<Vec<&str>> = texts
            .iter()
            .map(|t| t.as_ref().split_whitespace().collect())
            .collect();

        let vocab = self.build_vocab(&sentences);
        if vocab.words.is_empty() || self.dim == 0 {
            return Err(VectorizerError::EmptyVocabulary);
        }

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        // Input vectors start small and random, output vectors at zero
        let n       = vocab.words.len();
        let scale   = 1.0 / self.dim as f32;
        let mut syn0 = Array2::from_shape_fn((n, self.dim), |_| (rng.gen::<f32>() - 0.5) * scale);
        let mut syn1 = Array2::<f32>::zeros((n, self.dim));

        let cumulative = unigram_table(&vocab.counts);
        let keep_prob  = self.keep_probabilities(&vocab.counts);

        let sentences: Vec<Vec<usize>> = sentences
            .iter()
            .map(|s| s.iter().filter_map(|w| vocab.index.get(*w).copied()).collect())
            .collect();
        let words_per_epoch: usize = sentences.iter().map(Vec::len).sum();
        let total_words = (words_per_epoch * self.epochs).max(1) as f32;

        tracing::debug!(
            "Word2Vec {:?}: {} tokens in vocabulary, {} epochs, dim {}",
            self.objective,
            n,
            self.epochs,
            self.dim
        );

        let mut processed = 0usize;
        for _epoch in 0..self.epochs {
            for sentence in &sentences {
                let progress = processed as f32 / total_words;
                let alpha    = (self.alpha - (self.alpha - self.min_alpha) * progress).max(self.min_alpha);
                processed   += sentence.len();

                let kept: Vec<usize> = sentence
                    .iter()
                    .copied()
                    .filter(|&w| keep_prob[w] >= 1.0 || keep_prob[w] > rng.gen::<f64>())
                    .collect();

                self.train_sentence(&kept, alpha, &mut syn0, &mut syn1, &cumulative, &mut rng);
            }
        }

        Ok(EmbeddingTable { index: vocab.index, vectors: syn0 })
    }

    fn build_vocab(&self, sentences: &[Vec<&str>]) -> Vocab {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for sentence in sentences {
            for &word in sentence {
                *counts.entry(word).or_insert(0) += 1;
            }
        }

        let mut words: Vec<(&str, usize)> = counts
            .into_iter()
            .filter(|(_, c)| *c >= self.min_count)
            .collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let index = words
            .iter()
            .enumerate()
            .map(|(i, (w, _))| (w.to_string(), i))
            .collect();
        Vocab {
            words: words.iter().map(|(w, _)| w.to_string()).collect(),
            counts: words.iter().map(|(_, c)| *c).collect(),
            index,
        }
    }

    /// Probability of keeping each vocabulary token during one pass.
    fn keep_probabilities(&self, counts: &[usize]) -> Vec<f64> {
        if self.sample <= 0.0 {
            return vec![1.0; counts.len()];
        }
        let total: usize = counts.iter().sum();
        let threshold    = self.sample * total as f64;
        counts
            .iter()
            .map(|&c| {
                let c = c as f64;
                (((c / threshold).sqrt() + 1.0) * (threshold / c)).min(1.0)
            })
            .collect()
    }

    fn train_sentence(
        &self,
        sentence:   &[usize],
        alpha:      f32,
        syn0:       &mut Array2<f32>,
        syn1:       &mut Array2<f32>,
        cumulative: &[f64],
        rng:        &mut ChaCha8Rng,
    ) {
        for (pos, &centre) in sentence.iter().enumerate() {
            let reduced = rng.gen_range(0..self.window);
            let span    = self.window - reduced;
            let start   = pos.saturating_sub(span);
            let end     = (pos + span + 1).min(sentence.len());
            let context: Vec<usize> = (start..end)
                .filter(|&p| p != pos)
                .map(|p| sentence[p])
                .collect();
            if context.is_empty() {
                continue;
            }

            match self.objective {
                Objective::SkipGram => {
                    for &ctx in &context {
                        let l1       = syn0.row(ctx).to_owned();
                        let neu1e    = self.negative_update(&l1, centre, alpha, syn1, cumulative, rng);
                        syn0.row_mut(ctx).scaled_add(1.0, &neu1e);
                    }
                }
                Objective::Cbow => {
                    let mut l1 = Array1::<f32>::zeros(self.dim);
                    for &ctx in &context {
                        l1 += &syn0.row(ctx);
                    }
                    let inv   = 1.0 / context.len() as f32;
                    l1       *= inv;
                    let neu1e = self.negative_update(&l1, centre, alpha, syn1, cumulative, rng);
                    for &ctx in &context {
                        syn0.row_mut(ctx).scaled_add(inv, &neu1e);
                    }
                }
            }
        }
    }

    /// One positive and `negative` sampled updates of the output
    /// vectors. Returns the error to push back into the input side.
    fn negative_update(
        &self,
        l1:         &Array1<f32>,
        target:     usize,
        alpha:      f32,
        syn1:       &mut Array2<f32>,
        cumulative: &[f64],
        rng:        &mut ChaCha8Rng,
    ) -> Array1<f32> {
        let mut neu1e = Array1::<f32>::zeros(self.dim);
        for d in 0..=self.negative {
            let (word, label) = if d == 0 {
                (target, 1.0)
            } else {
                let w = draw_negative(cumulative, rng);
                if w == target {
                    continue;
                }
                (w, 0.0)
            };
            let f = l1.dot(&syn1.row(word));
            let g = (label - sigmoid(f)) * alpha;
            neu1e.scaled_add(g, &syn1.row(word));
            syn1.row_mut(word).scaled_add(g, l1);
        }
        neu1e
    }
}

/// Cumulative unigram^0.75 weights; sampling is a binary search.
fn unigram_table(counts: &[usize]) -> Vec<f64> {
    counts
        .iter()
        .scan(0.0, |acc, &c| {
            *acc += (c as f64).powf(NEG_POWER);
            Some(*acc)
        })
        .collect()
}

fn draw_negative(cumulative: &[f64], rng: &mut ChaCha8Rng) -> usize {
    let total = cumulative.last().copied().unwrap_or(0.0);
    let r     = rng.gen::<f64>() * total;
    cumulative
        .partition_point(|&c| c <= r)
        .min(cumulative.len().saturating_sub(1))
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        let mut texts = Vec::new();
        for _ in 0..20 {
            texts.push("great battery great screen".to_string());
            texts.push("terrible battery broken screen".to_string());
            texts.push("okay phone average price".to_string());
        }
        texts
    }

    fn config(seed: Option<u64>) -> VectorizerConfig {
        VectorizerConfig {
            vector_size: 16,
            seed,
            ..VectorizerConfig::default()
        }
    }

    #[test]
    fn test_vocab_respects_min_count() {
        let mut texts = corpus();
        texts.push("rare".to_string());
        let table = Word2Vec::new(&config(Some(1)), Objective::Cbow).train(&texts).unwrap();
        assert!(table.vector("rare").is_none());
        assert!(table.vector("battery").is_some());
        assert_eq!(table.dim(), 16);
        assert_eq!(table.index.len(), 9);
    }

    #[test]
    fn test_unknown_tokens_give_zero_row() {
        let table = Word2Vec::new(&config(Some(1)), Objective::SkipGram).train(&corpus()).unwrap();
        let m     = table.transform(&["nothing known here", ""]);
        assert_eq!(m.shape(), &[2, 16]);
        assert!(m.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_row_is_mean_of_known_vectors() {
        let table = Word2Vec::new(&config(Some(3)), Objective::Cbow).train(&corpus()).unwrap();
        let m     = table.transform(&["great unknown screen"]);
        let great = table.vector("great").unwrap();
        let scr   = table.vector("screen").unwrap();
        for j in 0..16 {
            let expected = (f64::from(great[j]) + f64::from(scr[j])) / 2.0;
            assert!((m[[0, j]] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seeded_training_is_reproducible() {
        for objective in [Objective::Cbow, Objective::SkipGram] {
            let a = Word2Vec::new(&config(Some(42)), objective).train(&corpus()).unwrap();
            let b = Word2Vec::new(&config(Some(42)), objective).train(&corpus()).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_unseeded_training_differs_between_runs() {
        // Without a seed each run draws fresh initial vectors, so two
        // runs are not expected to agree.
        let a = Word2Vec::new(&config(None), Objective::Cbow).train(&corpus()).unwrap();
        let b = Word2Vec::new(&config(None), Objective::Cbow).train(&corpus()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_vocabulary_is_error() {
        let err = Word2Vec::new(&config(Some(1)), Objective::Cbow)
            .train(&["single words only"])
            .unwrap_err();
        assert_eq!(err, VectorizerError::EmptyVocabulary);
    }

    #[test]
    fn test_negative_draws_stay_in_range() {
        let cumulative = unigram_table(&[5, 3, 1]);
        let mut rng    = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..1000 {
            assert!(draw_negative(&cumulative, &mut rng) < 3);
        }
    }
}
