// ============================================================
// Layer 5 - AdaBoost Classifier (SAMME)
// ============================================================
// Multi-class AdaBoost over depth-1 Gini stumps.
//
// Per round m, with sample weights w summing to 1:
//   err_m   = sum of w over misclassified rows
//   alpha_m = lr * (ln((1 - err_m) / err_m) + ln(K - 1))
//   w_i    *= exp(alpha_m) for every misclassified row, renormalise
//
// Early exits:
//   err_m == 0            keep the stump with weight 1 and stop
//   err_m >= 1 - 1/K      the stump is no better than chance; an
//                         error if it is the first, otherwise it is
//                         discarded and boosting stops
//
// Prediction: each stump votes alpha_m for its class; argmax.
//
// Reference: Zhu, Zou, Rosset, Hastie (2009) Multi-class AdaBoost

use ndarray::ArrayView2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::classifier::{argmax, check_fit_input, check_width, Classifier, ModelError};
use super::tree::{DecisionTree, Gini, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaBoost {
    n_estimators:  usize,
    learning_rate: f64,
    seed:          u64,
    n_classes:     usize,
    n_features:    Option<usize>,
    /// (stump, voting weight)
    estimators:    Vec<(DecisionTree, f64)>,
}

impl AdaBoost {
    pub fn new(n_estimators: usize, learning_rate: f64, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            learning_rate,
            seed,
            n_classes: 0,
            n_features: None,
            estimators: Vec::new(),
        }
    }
}

impl Classifier for AdaBoost {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<(), ModelError> {
        check_fit_input(x, y, n_classes)?;

        let n = x.nrows();
        // K counts the classes present, not the declared ones
        let mut present = vec![false; n_classes];
        y.iter().for_each(|&c| present[c] = true);
        let k = present.iter().filter(|&&p| p).count().max(1) as f64;

        let samples: Vec<usize> = (0..n).collect();
        let params     = TreeParams { max_depth: Some(1), ..TreeParams::default() };
        let mut rng    = ChaCha8Rng::seed_from_u64(self.seed);
        let mut w      = vec![1.0 / n as f64; n];
        let mut fitted = Vec::new();

        for round in 0..self.n_estimators {
            let gini  = Gini { labels: y, weights: &w, n_classes };
            let stump = DecisionTree::fit(x, &samples, &gini, &params, &mut rng);

            let wrong: Vec<bool> = x
                .rows()
                .into_iter()
                .zip(y)
                .map(|(row, &label)| argmax(stump.leaf_value(row)) != label)
                .collect();
            let total: f64 = w.iter().sum();
            let err: f64   = w.iter().zip(&wrong).filter_map(|(wi, m)| m.then_some(*wi)).sum::<f64>() / total;

            if err <= 0.0 {
                fitted.push((stump, 1.0));
                tracing::debug!("AdaBoost: perfect stump at round {round}, stopping");
                break;
            }
            if err >= 1.0 - 1.0 / k {
                if fitted.is_empty() {
                    return Err(ModelError::WorseThanRandom { error: err });
                }
                tracing::debug!("AdaBoost: stump no better than chance at round {round}, stopping");
                break;
            }

            let alpha = self.learning_rate * (((1.0 - err) / err).ln() + (k - 1.0).ln());
            fitted.push((stump, alpha));

            for (wi, &m) in w.iter_mut().zip(&wrong) {
                if m {
                    *wi *= alpha.exp();
                }
            }
            let sum: f64 = w.iter().sum();
            w.iter_mut().for_each(|wi| *wi /= sum);
        }

        self.estimators = fitted;
        self.n_classes  = n_classes;
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<usize>, ModelError> {
        check_width(self.n_features, x)?;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut votes = vec![0.0; self.n_classes];
                for (stump, alpha) in &self.estimators {
                    votes[argmax(stump.leaf_value(row))] += alpha;
                }
                argmax(&votes)
            })
            .collect())
    }
}
