use ndarray::{Array1, ArrayViewD};

use super::{VatOutput, approximator::Approximation, checked_scores};
use crate::{
    Result, VatConfig,
    arch::{
        Scorer,
        loss::{ClippedCrossEntropy, LossFn},
    },
    autodiff::stop_gradient,
    numeric::softmax,
};

/// Measures the divergence between `scorer`'s clean distribution and its distribution at the
/// `epsilon`-scaled adversarial perturbation.
pub(super) fn evaluate<S: Scorer + ?Sized>(
    x: ArrayViewD<f32>,
    scorer: &S,
    approximation: Approximation,
    same_network: bool,
    weights: &Array1<f32>,
    config: &VatConfig,
) -> Result<VatOutput> {
    let clip = config.clip_value_min();
    let loss_fn = ClippedCrossEntropy::new(clip);

    let Approximation {
        plain_softmax,
        direction,
    } = approximation;

    let reference = if same_network {
        plain_softmax
    } else {
        stop_gradient(softmax(checked_scores(scorer, x.view(), None)?.view()))
    };

    let perturbation = stop_gradient(direction * config.epsilon());
    let probe = &x + perturbation.get();

    let classes = reference.get().ncols();
    let probs = softmax(checked_scores(scorer, probe.view(), Some(classes))?.view());

    // guarded against an all-zero weight vector
    let total_weight = weights.sum() + clip;
    let divergences = loss_fn.loss(&reference, probs.view(), weights.view());
    let loss = divergences.sum() / total_weight;
    let scores_grad = loss_fn.loss_prime(&reference, probs.view(), weights.view()) / total_weight;

    Ok(VatOutput {
        loss,
        perturbation: perturbation.into_inner(),
        divergences,
        scores_grad,
    })
}
