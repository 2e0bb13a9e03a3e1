use ndarray::{Array2, ArrayView2};

/// Turns each row of unnormalized class scores into a probability distribution.
///
/// Each row is shifted by its maximum before exponentiating, so large scores don't overflow.
pub fn softmax(scores: ArrayView2<f32>) -> Array2<f32> {
    let mut probs = scores.to_owned();

    for mut row in probs.rows_mut() {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());

        let sum = row.sum();
        row /= sum;
    }

    probs
}
