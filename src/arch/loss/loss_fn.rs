use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::autodiff::Detached;

/// A divergence between a fixed reference distribution and a model's predicted distribution.
pub trait LossFn {
    /// Computes the weighted loss of every example.
    ///
    /// # Arguments
    /// * `reference` - The reference distribution, excluded from differentiation.
    /// * `probs` - The predicted distribution, the softmax of the model's scores.
    /// * `weights` - One weight per example.
    ///
    /// # Returns
    /// The loss of each example.
    fn loss(
        &self,
        reference: &Detached<Array2<f32>>,
        probs: ArrayView2<f32>,
        weights: ArrayView1<f32>,
    ) -> Array1<f32>;

    /// Computes the gradient of the summed per-example loss with respect to the scores that
    /// `probs` was computed from.
    ///
    /// # Arguments
    /// * `reference` - The reference distribution, excluded from differentiation.
    /// * `probs` - The predicted distribution, the softmax of the model's scores.
    /// * `weights` - One weight per example.
    ///
    /// # Returns
    /// An array shaped like `probs`.
    fn loss_prime(
        &self,
        reference: &Detached<Array2<f32>>,
        probs: ArrayView2<f32>,
        weights: ArrayView1<f32>,
    ) -> Array2<f32>;
}
