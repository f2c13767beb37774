// ============================================================
// Layer 5 - Random Forest Classifier
// ============================================================
// Bagged Gini trees:
//   - each tree sees a bootstrap sample (n draws with replacement)
//   - each node evaluates floor(sqrt(n_features)) random
//     features that are not constant within the node
//   - trees grow until leaves are pure
//   - prediction averages the trees' leaf class proportions
//     and takes the argmax
//
// Trees are fitted in parallel with rayon. Tree i owns an RNG
// seeded with `seed + i`, and results are collected in tree order,
// so a fixed seed gives the same forest on any thread count.

use ndarray::ArrayView2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::classifier::{argmax, check_fit_input, check_width, Classifier, ModelError};
use super::tree::{DecisionTree, Gini, TreeParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_trees:    usize,
    seed:       u64,
    n_classes:  usize,
    n_features: Option<usize>,
    trees:      Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(n_trees: usize, seed: u64) -> Self {
        Self {
            n_trees: n_trees.max(1),
            seed,
            n_classes: 0,
            n_features: None,
            trees: Vec::new(),
        }
    }

    /// Mean class proportions over all trees, one Vec per row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Vec<Vec<f64>>, ModelError> {
        check_width(self.n_features, x)?;
        let scale = 1.0 / self.trees.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut proba = vec![0.0; self.n_classes];
                for tree in &self.trees {
                    for (p, v) in proba.iter_mut().zip(tree.leaf_value(row)) {
                        *p += v * scale;
                    }
                }
                proba
            })
            .collect())
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[usize], n_classes: usize) -> Result<(), ModelError> {
        check_fit_input(x, y, n_classes)?;

        let n       = x.nrows();
        let weights = vec![1.0; n];
        let gini    = Gini { labels: y, weights: &weights, n_classes };
        let params  = TreeParams {
            max_features: Some(((x.ncols() as f64).sqrt() as usize).max(1)),
            ..TreeParams::default()
        };

        let trees: Vec<DecisionTree> = (0..self.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(i as u64));
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, &bootstrap, &gini, &params, &mut rng)
            })
            .collect();

        tracing::debug!(
            "RandomForest: {} trees, mean depth {:.1}",
            trees.len(),
            trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / trees.len() as f64
        );

        self.trees      = trees;
        self.n_classes  = n_classes;
        self.n_features = Some(x.ncols());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<usize>, ModelError> {
        Ok(self.predict_proba(x)?.iter().map(|p| argmax(p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn noisy_data() -> (Array2<f64>, Vec<usize>) {
        let x = Array2::from_shape_fn((60, 4), |(i, j)| {
            let base = ((i * 7 + j * 13) % 11) as f64;
            if j == 2 { base + (i % 3) as f64 * 5.0 } else { base }
        });
        let y = (0..60).map(|i| i % 3).collect();
        (x, y)
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (x, y) = noisy_data();
        let mut a = RandomForest::new(8, 42);
        let mut b = RandomForest::new(8, 42);
        a.fit(x.view(), &y, 3).unwrap();
        b.fit(x.view(), &y, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sparse_informative_column_is_found() {
        // One column carries the label, the other 99 are all zero
        let y: Vec<usize> = (0..80).map(|i| if i < 50 { 0 } else if i < 65 { 1 } else { 2 }).collect();
        let x = Array2::from_shape_fn((80, 100), |(i, j)| if j == 0 { y[i] as f64 } else { 0.0 });
        let mut forest = RandomForest::new(100, 42);
        forest.fit(x.view(), &y, 3).unwrap();
        assert_eq!(forest.predict(x.view()).unwrap(), y);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (x, y) = noisy_data();
        let mut forest = RandomForest::new(5, 1);
        forest.fit(x.view(), &y, 3).unwrap();
        for p in forest.predict_proba(x.view()).unwrap() {
            assert_eq!(p.len(), 3);
            assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }
}
