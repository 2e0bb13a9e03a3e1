use log::debug;
use ndarray::{Array1, Array2, ArrayD, ArrayViewD};

use super::checked_scores;
use crate::{
    Result, VatConfig, VatErr,
    arch::{
        Scorer,
        loss::{ClippedCrossEntropy, LossFn},
    },
    autodiff::{Detached, stop_gradient},
    noise::NoiseGen,
    numeric::{normalize, softmax},
};

/// The outcome of the adversarial direction search.
pub(super) struct Approximation {
    /// The clean distribution of the scorer used for the search.
    pub plain_softmax: Detached<Array2<f32>>,
    /// The approximated unit-norm adversarial direction of every example.
    pub direction: ArrayD<f32>,
}

/// Approximates the direction along which `scorer`'s predicted distribution diverges the most
/// from its clean one, by power iteration on the gradient of the divergence at a probe of
/// norm `xi`.
pub(super) fn approximate<A, N>(
    x: ArrayViewD<f32>,
    scorer: &A,
    weights: &Array1<f32>,
    config: &VatConfig,
    noise: &mut N,
) -> Result<Approximation>
where
    A: Scorer + ?Sized,
    N: NoiseGen + ?Sized,
{
    let clip = config.clip_value_min();
    let plain_softmax = stop_gradient(softmax(checked_scores(scorer, x.view(), None)?.view()));

    let sample = noise.sample(x.shape())?;
    if sample.shape() != x.shape() {
        return Err(VatErr::ShapeMismatch {
            what: "noise",
            got: sample.len(),
            expected: x.len(),
        });
    }

    // The starting direction is random; every iteration replaces it with the normalized
    // gradient, and there's always at least one.
    let mut direction = normalize(sample.view(), clip)?;

    for step in 0..config.num_approximation() {
        let perturbation = &direction * config.xi();
        direction = ascent_direction(x.view(), scorer, &plain_softmax, perturbation, weights, clip)?;

        debug!(step = step; "approximated adversarial direction");
    }

    Ok(Approximation {
        plain_softmax,
        direction,
    })
}

/// Computes the normalized gradient, with respect to `perturbation`, of the summed divergence
/// between `plain_softmax` and the distribution at `x + perturbation`.
fn ascent_direction<A: Scorer + ?Sized>(
    x: ArrayViewD<f32>,
    scorer: &A,
    plain_softmax: &Detached<Array2<f32>>,
    perturbation: ArrayD<f32>,
    weights: &Array1<f32>,
    clip: f32,
) -> Result<ArrayD<f32>> {
    let loss_fn = ClippedCrossEntropy::new(clip);
    let probe = &x + &perturbation;

    let classes = plain_softmax.get().ncols();
    let probs = softmax(checked_scores(scorer, probe.view(), Some(classes))?.view());

    debug!(
        divergence = loss_fn.loss(plain_softmax, probs.view(), weights.view()).sum();
        "probe divergence"
    );

    // x is constant, so the gradient with respect to the perturbation is the one with respect
    // to the probe
    let d_scores = loss_fn.loss_prime(plain_softmax, probs.view(), weights.view());
    let grad = scorer.input_grad(probe.view(), d_scores.view())?;

    if grad.shape() != x.shape() {
        return Err(VatErr::ShapeMismatch {
            what: "input gradient",
            got: grad.len(),
            expected: x.len(),
        });
    }

    normalize(grad.view(), clip)
}
