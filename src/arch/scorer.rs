use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD};

use crate::error::Result;

/// A classifier seen as a function from a batch of inputs to unnormalized class scores.
///
/// Implementations must be pure: evaluating the same input twice gives the same scores. A
/// scorer is borrowed immutably, so a single instance may play both the role of the model
/// whose loss is computed and the one used to search for the adversarial direction.
pub trait Scorer {
    /// Computes the class scores of every example.
    ///
    /// # Arguments
    /// * `x` - The input batch, with the batch along the first axis.
    ///
    /// # Returns
    /// An array shaped `[batch, classes]`, or an error if the input doesn't fit the scorer.
    fn scores(&self, x: ArrayViewD<f32>) -> Result<Array2<f32>>;

    /// Maps a gradient with respect to the scores back into input space, that is, computes the
    /// vector-Jacobian product of `scores` at `x`.
    ///
    /// # Arguments
    /// * `x` - The input batch the scores were computed at.
    /// * `d_scores` - The gradient of some quantity with respect to `scores(x)`.
    ///
    /// # Returns
    /// The gradient of that quantity with respect to `x`, shaped like `x`.
    fn input_grad(&self, x: ArrayViewD<f32>, d_scores: ArrayView2<f32>) -> Result<ArrayD<f32>>;
}
