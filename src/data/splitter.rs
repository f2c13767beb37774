// ============================================================
// Layer 4 - Train/Test Splitter
// ============================================================
// Shuffles row indices with a seeded RNG and splits them into a
// training partition and a held-out test partition.
//
// The split works on indices, not rows, so the same split can be
// applied to a feature matrix and its label slice without moving
// either.
//
// Test size: ceil(test_fraction * n), so 0.2 of 100 rows gives
// 20 test rows and 0.2 of 11 rows gives 3.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom on a
// ChaCha8Rng, which gives the same permutation for the same seed
// on every platform.
//
// Reference: rand crate documentation
//            rand_chacha crate documentation

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Shuffle `0..n` with `seed` and split into (train, test) indices.
///
/// # Arguments
/// * `n`             - Number of rows
/// * `test_fraction` - Proportion held out, e.g. 0.2 = 20%
/// * `seed`          - RNG seed; the same seed gives the same split
pub fn split_train_test(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test   = ((n as f64) * fraction).ceil() as usize;
    let n_test   = n_test.min(n);

    // split_off(k) leaves [0..k] in `indices` and returns [k..n]
    let test  = indices.split_off(n - n_test);
    let train = indices;

    tracing::debug!(
        "Dataset split: {} training, {} test (seed {})",
        train.len(),
        test.len(),
        seed
    );

    (train, test)
}
