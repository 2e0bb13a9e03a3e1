use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};

use super::LossFn;
use crate::{autodiff::Detached, numeric::clipped_ln};

/// Cross-entropy of a predicted distribution against a fixed reference, with the predicted
/// probabilities clipped from below before taking their logarithm.
///
/// Per example: `-sum_c reference_c * ln(max(probs_c, clip_value_min)) * weight`.
///
/// Both methods panic if `reference`, `probs` and `weights` disagree on the batch size or the
/// number of classes.
#[derive(Debug, Clone, Copy)]
pub struct ClippedCrossEntropy {
    clip_value_min: f32,
}

impl ClippedCrossEntropy {
    /// Returns a new `ClippedCrossEntropy`.
    ///
    /// # Arguments
    /// * `clip_value_min` - The floor applied to the probabilities before the logarithm.
    pub fn new(clip_value_min: f32) -> Self {
        Self { clip_value_min }
    }
}

impl LossFn for ClippedCrossEntropy {
    fn loss(
        &self,
        reference: &Detached<Array2<f32>>,
        probs: ArrayView2<f32>,
        weights: ArrayView1<f32>,
    ) -> Array1<f32> {
        let ln = clipped_ln(&probs, self.clip_value_min);
        let mut losses = -(reference.get() * &ln).sum_axis(Axis(1));
        losses *= &weights;
        losses
    }

    /// The derivative of `max(p, clip_value_min)` is taken as 1 where `p >= clip_value_min` and
    /// 0 elsewhere, so chained through the softmax each row becomes
    /// `weight * (probs_j * active_mass - reference_j * [probs_j >= clip_value_min])`, with
    /// `active_mass` the reference mass over the unclipped classes.
    fn loss_prime(
        &self,
        reference: &Detached<Array2<f32>>,
        probs: ArrayView2<f32>,
        weights: ArrayView1<f32>,
    ) -> Array2<f32> {
        let clip = self.clip_value_min;
        let mut grad = Array2::<f32>::zeros(probs.raw_dim());

        Zip::from(grad.rows_mut())
            .and(reference.get().rows())
            .and(probs.rows())
            .and(&weights)
            .for_each(|mut g, q, p, &w| {
                let active_mass: f32 = q
                    .iter()
                    .zip(p.iter())
                    .filter(|&(_, &p)| p >= clip)
                    .map(|(q, _)| q)
                    .sum();

                Zip::from(&mut g).and(&q).and(&p).for_each(|g, &q, &p| {
                    let active = if p >= clip { q } else { 0.0 };
                    *g = w * (p * active_mass - active);
                });
            });

        grad
    }
}
