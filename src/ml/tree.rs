// ============================================================
// Layer 5 - CART Decision Tree
// ============================================================
// The base learner of all three ensembles.
//
//   RandomForest   deep classification trees (Gini), bootstrap
//                  rows, random feature subset per node
//   GradientBoost  depth-3 regression trees (squared error) on
//                  softmax residuals, Newton-step leaves
//   AdaBoost       weighted classification stumps (Gini)
//
// The split criterion is abstracted by the Impurity trait. A
// split sends `x[feature] <= threshold` left; thresholds are the
// midpoint between two adjacent distinct values.
//
// Nodes live in a flat Vec with child indices, so a serialised
// tree has constant nesting depth however deep it grows.
//
// Reference: Breiman et al. (1984) Classification and Regression Trees

use ndarray::{ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Smallest cost reduction that counts as an improvement
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// None grows until leaves are pure or too small
    pub max_depth:         Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    /// Features tried per node; None tries all
    pub max_features:      Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth:         None,
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_features:      None,
        }
    }
}

// ─── Split criteria ───────────────────────────────────────────────────────────
/// Running statistics of a candidate node. `cost` is the node's
/// impurity multiplied by its weight, so the cost of a split is
/// the sum of its children's costs.
pub trait Impurity {
    type Acc: Clone;

    fn empty(&self) -> Self::Acc;
    fn add(&self, acc: &mut Self::Acc, sample: usize);
    fn remove(&self, acc: &mut Self::Acc, sample: usize);
    fn cost(&self, acc: &Self::Acc) -> f64;
    fn leaf(&self, samples: &[usize]) -> Vec<f64>;
}

/// Weighted Gini impurity; leaves hold class proportions.
pub struct Gini<'a> {
    pub labels:    &'a [usize],
    pub weights:   &'a [f64],
    pub n_classes: usize,
}

impl Impurity for Gini<'_> {
    type Acc = (Vec<f64>, f64);

    fn empty(&self) -> Self::Acc {
        (vec![0.0; self.n_classes], 0.0)
    }

    fn add(&self, acc: &mut Self::Acc, sample: usize) {
        let w = self.weights[sample];
        acc.0[self.labels[sample]] += w;
        acc.1 += w;
    }

    fn remove(&self, acc: &mut Self::Acc, sample: usize) {
        let w = self.weights[sample];
        acc.0[self.labels[sample]] -= w;
        acc.1 -= w;
    }

    fn cost(&self, acc: &Self::Acc) -> f64 {
        let (per_class, total) = (&acc.0, acc.1);
        if total <= 0.0 {
            return 0.0;
        }
        let sq: f64 = per_class.iter().map(|w| w * w).sum();
        (total - sq / total).max(0.0)
    }

    fn leaf(&self, samples: &[usize]) -> Vec<f64> {
        let mut acc = self.empty();
        for &s in samples {
            self.add(&mut acc, s);
        }
        let (mut per_class, total) = acc;
        if total > 0.0 {
            per_class.iter_mut().for_each(|w| *w /= total);
        }
        per_class
    }
}

/// Squared error on a real-valued target. The leaf value comes
/// from `leaf_value`, so boosting can plug in its own step.
pub struct SquaredError<'a, F> {
    pub targets:    &'a [f64],
    pub leaf_value: F,
}

impl<F> Impurity for SquaredError<'_, F>
where
    F: Fn(&[usize]) -> f64,
{
    /// (count, sum, sum of squares)
    type Acc = (f64, f64, f64);

    fn empty(&self) -> Self::Acc {
        (0.0, 0.0, 0.0)
    }

    fn add(&self, acc: &mut Self::Acc, sample: usize) {
        let y = self.targets[sample];
        acc.0 += 1.0;
        acc.1 += y;
        acc.2 += y * y;
    }

    fn remove(&self, acc: &mut Self::Acc, sample: usize) {
        let y = self.targets[sample];
        acc.0 -= 1.0;
        acc.1 -= y;
        acc.2 -= y * y;
    }

    fn cost(&self, acc: &Self::Acc) -> f64 {
        let (n, sum, sum_sq) = *acc;
        if n <= 0.0 {
            return 0.0;
        }
        (sum_sq - sum * sum / n).max(0.0)
    }

    fn leaf(&self, samples: &[usize]) -> Vec<f64> {
        vec![(self.leaf_value)(samples)]
    }
}

// ─── Tree ─────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: Vec<f64>,
    },
    Split {
        feature:   usize,
        threshold: f64,
        left:      usize,
        right:     usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree over the rows listed in `samples`. A row may be
    /// listed more than once (bootstrap).
    pub fn fit<I: Impurity>(
        x:        ArrayView2<'_, f64>,
        samples:  &[usize],
        impurity: &I,
        params:   &TreeParams,
        rng:      &mut ChaCha8Rng,
    ) -> Self {
        let mut builder = Builder {
            x,
            impurity,
            params,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(samples.to_vec(), 0);
        Self { nodes: builder.nodes }
    }

    /// Leaf value reached by `row`.
    pub fn leaf_value(&self, row: ArrayView1<'_, f64>) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value } => return value,
                Node::Split { feature, threshold, left, right } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

struct Builder<'x, 'a, I> {
    x:        ArrayView2<'x, f64>,
    impurity: &'a I,
    params:   &'a TreeParams,
    rng:      &'a mut ChaCha8Rng,
    nodes:    Vec<Node>,
}

impl<I: Impurity> Builder<'_, '_, I> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { value: Vec::new() });

        match self.best_split(&samples, depth) {
            None => {
                self.nodes[id] = Node::Leaf { value: self.impurity.leaf(&samples) };
            }
            Some((feature, threshold)) => {
                let x = self.x;
                let (l, r): (Vec<usize>, Vec<usize>) =
                    samples.into_iter().partition(|&s| x[[s, feature]] <= threshold);
                let left  = self.grow(l, depth + 1);
                let right = self.grow(r, depth + 1);
                self.nodes[id] = Node::Split { feature, threshold, left, right };
            }
        }
        id
    }

    fn best_split(&mut self, samples: &[usize], depth: usize) -> Option<(usize, f64)> {
        let n = samples.len();
        if n < self.params.min_samples_split.max(2)
            || self.params.max_depth.is_some_and(|d| depth >= d)
        {
            return None;
        }

        let mut total = self.impurity.empty();
        for &s in samples {
            self.impurity.add(&mut total, s);
        }
        let parent_cost = self.impurity.cost(&total);
        if parent_cost <= MIN_GAIN {
            return None;
        }

        let min_leaf  = self.params.min_samples_leaf.max(1);
        let x         = self.x;
        let mut order = samples.to_vec();
        let mut best: Option<(f64, usize, f64)> = None;

        let (candidates, budget) = self.candidate_features();
        let mut evaluated = 0;
        for feature in candidates {
            if evaluated == budget {
                break;
            }
            // A feature constant within the node does not use up the budget
            let first = x[[samples[0], feature]];
            if samples.iter().all(|&s| x[[s, feature]] == first) {
                continue;
            }
            evaluated += 1;

            order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left  = self.impurity.empty();
            let mut right = total.clone();
            for p in 0..n - 1 {
                let s = order[p];
                self.impurity.add(&mut left, s);
                self.impurity.remove(&mut right, s);

                let (a, b) = (x[[s, feature]], x[[order[p + 1], feature]]);
                let n_left = p + 1;
                if a == b || n_left < min_leaf || n - n_left < min_leaf {
                    continue;
                }

                let cost = self.impurity.cost(&left) + self.impurity.cost(&right);
                if best.map_or(true, |(c, _, _)| cost < c) {
                    best = Some((cost, feature, midpoint(a, b)));
                }
            }
        }

        best.filter(|(c, _, _)| *c < parent_cost - MIN_GAIN)
            .map(|(_, f, t)| (f, t))
    }

    /// Visiting order of the features and how many non-constant
    /// ones to evaluate. With a feature cap every column is visited
    /// in random order until the cap is met, so a node whose drawn
    /// features are all constant keeps drawing.
    fn candidate_features(&mut self) -> (Vec<usize>, usize) {
        let n_features = self.x.ncols();
        match self.params.max_features {
            Some(m) if m < n_features => {
                let mut order: Vec<usize> = (0..n_features).collect();
                order.shuffle(&mut *self.rng);
                (order, m.max(1))
            }
            _ => ((0..n_features).collect(), n_features),
        }
    }
}

/// Midpoint of a < b that still sends `a` left and `b` right.
fn midpoint(a: f64, b: f64) -> f64 {
    let m = a / 2.0 + b / 2.0;
    if m >= b {
        a
    } else {
        m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    fn n_leaves(tree: &DecisionTree) -> usize {
        tree.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }

    #[test]
    fn test_gini_tree_separates_classes() {
        let x       = array![[1.0, 0.0], [2.0, 0.0], [8.0, 1.0], [9.0, 1.0]];
        let labels  = [0, 0, 1, 1];
        let weights = [1.0; 4];
        let gini    = Gini { labels: &labels, weights: &weights, n_classes: 2 };
        let tree    = DecisionTree::fit(x.view(), &[0, 1, 2, 3], &gini, &TreeParams::default(), &mut rng());

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf_value(x.row(0)), &[1.0, 0.0]);
        assert_eq!(tree.leaf_value(x.row(3)), &[0.0, 1.0]);
        assert_eq!(tree.leaf_value(array![4.5, 0.0].view()), &[1.0, 0.0]);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let x       = array![[1.0], [2.0], [3.0]];
        let labels  = [2, 2, 2];
        let weights = [1.0; 3];
        let gini    = Gini { labels: &labels, weights: &weights, n_classes: 3 };
        let tree    = DecisionTree::fit(x.view(), &[0, 1, 2], &gini, &TreeParams::default(), &mut rng());
        assert_eq!(n_leaves(&tree), 1);
        assert_eq!(tree.leaf_value(x.row(1)), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x: ndarray::Array2<f64> = ndarray::Array2::from_shape_fn((16, 1), |(i, _)| i as f64);
        let labels: Vec<usize> = (0..16).map(|i| i % 2).collect();
        let weights = vec![1.0; 16];
        let gini    = Gini { labels: &labels, weights: &weights, n_classes: 2 };
        let params  = TreeParams { max_depth: Some(2), ..TreeParams::default() };
        let samples: Vec<usize> = (0..16).collect();
        let tree = DecisionTree::fit(x.view(), &samples, &gini, &params, &mut rng());
        assert!(tree.depth() <= 2);
        assert!(n_leaves(&tree) <= 4);
    }

    #[test]
    fn test_weights_move_the_leaf_proportions() {
        let x       = array![[0.0], [0.0], [0.0]];
        let labels  = [0, 1, 1];
        let weights = [2.0, 1.0, 1.0];
        let gini    = Gini { labels: &labels, weights: &weights, n_classes: 2 };
        let tree    = DecisionTree::fit(x.view(), &[0, 1, 2], &gini, &TreeParams::default(), &mut rng());
        assert_eq!(tree.leaf_value(x.row(0)), &[0.5, 0.5]);
    }

    #[test]
    fn test_squared_error_uses_leaf_closure() {
        let x       = array![[0.0], [1.0], [10.0], [11.0]];
        let targets = [1.0, 1.0, -1.0, -1.0];
        let mean    = |s: &[usize]| s.iter().map(|&i| targets[i]).sum::<f64>() / s.len() as f64;
        let mse     = SquaredError { targets: &targets, leaf_value: mean };
        let tree    = DecisionTree::fit(x.view(), &[0, 1, 2, 3], &mse, &TreeParams::default(), &mut rng());
        assert_eq!(tree.leaf_value(x.row(1)), &[1.0]);
        assert_eq!(tree.leaf_value(x.row(2)), &[-1.0]);
    }

    #[test]
    fn test_bootstrap_duplicates_accepted() {
        let x       = array![[0.0], [5.0]];
        let labels  = [0, 1];
        let weights = [1.0; 2];
        let gini    = Gini { labels: &labels, weights: &weights, n_classes: 2 };
        let tree    = DecisionTree::fit(x.view(), &[0, 0, 0, 1], &gini, &TreeParams::default(), &mut rng());
        assert_eq!(tree.leaf_value(x.row(1)), &[0.0, 1.0]);
    }

    #[test]
    fn test_feature_cap_skips_constant_columns() {
        // Only column 7 varies; a cap of one feature must still find it
        let x = ndarray::Array2::from_shape_fn((6, 20), |(i, j)| if j == 7 { (i / 3) as f64 } else { 0.0 });
        let labels  = [0, 0, 0, 1, 1, 1];
        let weights = [1.0; 6];
        let gini    = Gini { labels: &labels, weights: &weights, n_classes: 2 };
        let params  = TreeParams { max_features: Some(1), ..TreeParams::default() };
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let tree    = DecisionTree::fit(x.view(), &[0, 1, 2, 3, 4, 5], &gini, &params, &mut rng);
            assert_eq!(tree.depth(), 1);
            assert_eq!(tree.leaf_value(x.row(0)), &[1.0, 0.0]);
            assert_eq!(tree.leaf_value(x.row(5)), &[0.0, 1.0]);
        }
    }

    #[test]
    fn test_midpoint_never_reaches_upper_value() {
        assert_eq!(midpoint(1.0, 3.0), 2.0);
        let a = 1.0_f64;
        let b = f64::from_bits(a.to_bits() + 1);
        assert_eq!(midpoint(a, b), a);
    }
}
