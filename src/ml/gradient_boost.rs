// ============================================================
// Layer 5 - Gradient Boosting Classifier
// ============================================================
// Multinomial deviance boosting, one regression tree per class
// per stage:
//
//   F_k(x)  starts at log(prior_k)
//   p       = softmax(F)
//   r_ik    = [y_i == k] - p_ik            (negative gradient)
//   tree_k  fitted to r_k with squared error, max depth 3
//   leaf    = (K-1)/K * sum(r) / sum(p(1-p))   (one Newton step)
//   F_k    += learning_rate * tree_k(x)
//
// Prediction is argmax_k F_k(x).
//
// Reference: Friedman (2001) Greedy Function Approximation:
//            A Gradient Boosting Machine, Algorithm 6

use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::classifier::{argmax, check_fit_input, check_width, Classifier, ModelError};
use super::tree::{DecisionTree, SquaredError, TreeParams};

/// Floor for class priors and Newton denominators
const EPS: f64 = 1e-150;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoost {
    n_stages:      usize,
    learning_rate: f64,
    max_depth:     usize,
    seed:          u64,
    n_features:    Option<usize>,
    /// log prior per class
    init:          Vec<f64>,
    /// stages[m][k] is the class-k tree of stage m
    stages:        Vec<Vec<DecisionTree>>,
}

impl GradientBoost {
    pub fn new(n_stages: usize, learning_rate: f64, max_depth: usize, seed: u64) -> Self {
        Self {
            n_stages: n_stages.max(1),
            learning_rate,
            max_depth: max_depth.max(1),
            seed,
            n_features: None,
            init: Vec::new(),
            stages: Vec::new(),
        }
    }

    /// Raw additive scores F, shape (rows, classes).
    pub fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array2<f64>, ModelError> {
        check_width(self.n_features, x)?;
        let k_classes  = self.init.len();
        let mut scores = Array2::from_shape_fn((x.nrows(), k_classes), |(_, k)| self.init[k]);
        for (i, row) in x.rows().into_iter().enumerate() {
            for stage in &self.stages {
                for (k, tree) in stage.iter().enumerate() {
                    scores[[i, k]] += self.learning_rate * tree.leaf_value(row)[0];
                }
            }
        }
        Ok(scores)
    }
}

fn softmax_rows(scores: &Array2<f64>) -> Array2<f64> {
    let mut out = scores.clone();
    for mut row in out.rows_mut() {
        let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

impl Classifier for GradientBoost {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<(), ModelError> {
        check_fit_input(x, y, n_classes)?;

        let n = x.nrows();
        let k_classes = n_classes.max(2);

        let mut prior = vec![0.0; k_classes];
        for &label in y {
            prior[label] += 1.0 / n as f64;
        }
        let init: Vec<f64> = prior.iter().map(|p| p.max(EPS).ln()).collect();

        let mut scores  = Array2::from_shape_fn((n, k_classes), |(_, k)| init[k]);
        let samples: Vec<usize> = (0..n).collect();
        let params      = TreeParams { max_depth: Some(self.max_depth), ..TreeParams::default() };
        let newton      = (k_classes - 1) as f64 / k_classes as f64;
        let mut rng     = ChaCha8Rng::seed_from_u64(self.seed);
        let mut stages  = Vec::with_capacity(self.n_stages);

        for _ in 0..self.n_stages {
            let proba     = softmax_rows(&scores);
            let mut stage = Vec::with_capacity(k_classes);

            for k in 0..k_classes {
                let residual: Vec<f64> = (0..n)
                    .map(|i| f64::from(u8::from(y[i] == k)) - proba[[i, k]])
                    .collect();
                let hessian: Vec<f64> = (0..n).map(|i| proba[[i, k]] * (1.0 - proba[[i, k]])).collect();

                let leaf_value = |leaf: &[usize]| {
                    let num: f64 = leaf.iter().map(|&i| residual[i]).sum();
                    let den: f64 = leaf.iter().map(|&i| hessian[i]).sum();
                    if den.abs() < EPS { 0.0 } else { newton * num / den }
                };
                let loss = SquaredError { targets: &residual, leaf_value };
                let tree = DecisionTree::fit(x, &samples, &loss, &params, &mut rng);

                for (i, row) in x.rows().into_iter().enumerate() {
                    scores[[i, k]] += self.learning_rate * tree.leaf_value(row)[0];
                }
                stage.push(tree);
            }
            stages.push(stage);
        }

        self.init       = init;
        self.stages     = stages;
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<usize>, ModelError> {
        let scores = self.decision_function(x)?;
        Ok(scores
            .rows()
            .into_iter()
            .map(|row| argmax(&row.to_vec()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_init_is_log_prior() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let mut gb = GradientBoost::new(1, 0.1, 3, 42);
        gb.fit(x.view(), &[0, 0, 0, 1], 3).unwrap();
        assert!((gb.init[0] - 0.75f64.ln()).abs() < 1e-12);
        assert!((gb.init[1] - 0.25f64.ln()).abs() < 1e-12);
        // An unseen class gets a vanishing prior and is never predicted
        assert!(gb.init[2] < -300.0);
        assert!(gb.predict(x.view()).unwrap().iter().all(|&c| c < 2));
    }

    #[test]
    fn test_stages_raise_correct_class_score() {
        let x = array![[0.0], [0.1], [5.0], [5.1]];
        let y = [0, 0, 1, 1];
        let mut gb = GradientBoost::new(20, 0.1, 3, 42);
        gb.fit(x.view(), &y, 2).unwrap();
        let scores = gb.decision_function(x.view()).unwrap();
        assert!(scores[[0, 0]] > scores[[0, 1]]);
        assert!(scores[[3, 1]] > scores[[3, 0]]);
        assert_eq!(gb.stages.len(), 20);
        assert!(gb.stages.iter().all(|s| s.len() == 2));
    }

    #[test]
    fn test_softmax_rows_normalise() {
        let p = softmax_rows(&array![[1.0, 2.0, 3.0], [1000.0, 1000.0, 1000.0]]);
        for row in p.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        assert!((p[[1, 0]] - 1.0 / 3.0).abs() < 1e-12);
    }
}
