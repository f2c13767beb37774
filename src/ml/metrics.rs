// ============================================================
// Layer 5 - Classification Metrics
// ============================================================
// Macro-averaged F1: the unweighted mean of per-class F1 over
// every class that appears in either the true or the predicted
// labels. A class with no true and no predicted positives cannot
// appear; a class with tp = 0 scores 0 rather than NaN.
//
//   F1_c = 2 tp / (2 tp + fp + fn)

use std::collections::BTreeSet;

/// F1 of one class from its confusion counts; 0 when undefined.
pub fn class_f1(tp: usize, fp: usize, fn_: usize) -> f64 {
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        0.0
    } else {
        (2 * tp) as f64 / denom as f64
    }
}

/// Macro-averaged F1 of `y_pred` against `y_true`.
/// Returns 0.0 for empty input or mismatched lengths.
pub fn macro_f1(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return 0.0;
    }

    let labels: BTreeSet<usize> = y_true.iter().chain(y_pred).copied().collect();
    let sum: f64 = labels
        .iter()
        .map(|&c| {
            let (mut tp, mut fp, mut fn_) = (0, 0, 0);
            for (&t, &p) in y_true.iter().zip(y_pred) {
                match (t == c, p == c) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }
            class_f1(tp, fp, fn_)
        })
        .sum();

    sum / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        assert_eq!(macro_f1(&[0, 1, 2, 2], &[0, 1, 2, 2]), 1.0);
    }

    #[test]
    fn test_minority_class_counts_equally() {
        // Majority class perfect, minority class missed entirely
        let y_true = [0, 0, 0, 0, 1];
        let y_pred = [0, 0, 0, 0, 0];
        let f1_0   = class_f1(4, 1, 0);
        assert!((macro_f1(&y_true, &y_pred) - (f1_0 + 0.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_known_value() {
        // class 0: tp 1 fp 1 fn 1 -> 0.5 ; class 1: tp 1 fp 1 fn 1 -> 0.5 ; class 2: tp 1 -> 1
        let y_true = [0, 0, 1, 1, 2];
        let y_pred = [0, 1, 1, 0, 2];
        assert!((macro_f1(&y_true, &y_pred) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(macro_f1(&[], &[]), 0.0);
        assert_eq!(macro_f1(&[1, 2], &[1]), 0.0);
        assert_eq!(class_f1(0, 0, 0), 0.0);
    }
}
