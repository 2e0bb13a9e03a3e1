//! Virtual adversarial loss.
//!
//! The computation has two phases. The approximator searches for the input direction along
//! which the model's predicted distribution changes the most, using a few power iterations on
//! the gradient of a clipped cross-entropy at a vanishingly small probe perturbation. The
//! evaluator then measures the same divergence at the full `epsilon`-scaled perturbation.

mod approximator;
mod evaluator;

use std::ptr;

use log::debug;
use ndarray::{Array1, Array2, ArrayD, ArrayViewD, Axis};

use crate::{Result, VatConfig, VatErr, arch::Scorer, noise::NoiseGen};

/// The result of a virtual adversarial loss computation.
#[derive(Debug, Clone)]
pub struct VatOutput {
    /// The weighted mean of the per-example divergences.
    pub loss: f32,
    /// The adversarial perturbation, `epsilon` times the approximated unit direction. It is a
    /// constant with respect to differentiation.
    pub perturbation: ArrayD<f32>,
    /// The weighted divergence of every example.
    pub divergences: Array1<f32>,
    /// The gradient of `loss` with respect to the scores of the perturbed input. This is the
    /// only path gradients flow through, to be chained into the scorer's parameters.
    pub scores_grad: Array2<f32>,
}

/// Computes the virtual adversarial loss of a batch.
///
/// # Arguments
/// * `x` - The input batch, with the batch along the first axis and rank 2 or more.
/// * `scorer` - The model whose loss is computed.
/// * `approx_scorer` - The model used only to search for the adversarial direction. `None`, or
///   the very same object as `scorer`, means both roles are played by `scorer` and its clean
///   distribution is computed once.
/// * `config` - The parameters of the computation.
/// * `noise` - The source of the random starting direction.
///
/// # Returns
/// The loss and the adversarial perturbation, or an error if the weights don't match the batch
/// or a scorer's output doesn't match its input.
pub fn compute_vat<S, N>(
    x: ArrayViewD<f32>,
    scorer: &S,
    approx_scorer: Option<&dyn Scorer>,
    config: &VatConfig,
    noise: &mut N,
) -> Result<VatOutput>
where
    S: Scorer + ?Sized,
    N: NoiseGen + ?Sized,
{
    if x.ndim() < 2 {
        return Err(VatErr::ShapeMismatch {
            what: "batched input rank",
            got: x.ndim(),
            expected: 2,
        });
    }

    let batch = x.len_of(Axis(0));
    let weights = config.weight().per_example(batch)?;

    let (approximation, same_network) = match approx_scorer {
        Some(approx_scorer) if !ptr::addr_eq(approx_scorer, scorer) => {
            let approximation =
                approximator::approximate(x.view(), approx_scorer, &weights, config, noise)?;
            (approximation, false)
        }
        _ => {
            let approximation =
                approximator::approximate(x.view(), scorer, &weights, config, noise)?;
            (approximation, true)
        }
    };

    let output = evaluator::evaluate(
        x.view(),
        scorer,
        approximation,
        same_network,
        &weights,
        config,
    )?;

    debug!(
        batch = batch,
        same_network = same_network,
        loss = output.loss;
        "computed virtual adversarial loss"
    );

    Ok(output)
}

/// Scores `x` and checks the result has one row per example and, if given, `classes` columns.
fn checked_scores<S: Scorer + ?Sized>(
    scorer: &S,
    x: ArrayViewD<f32>,
    classes: Option<usize>,
) -> Result<Array2<f32>> {
    let batch = x.len_of(Axis(0));
    let scores = scorer.scores(x)?;

    if scores.nrows() != batch {
        return Err(VatErr::ShapeMismatch {
            what: "scores batch size",
            got: scores.nrows(),
            expected: batch,
        });
    }

    match classes {
        Some(classes) if scores.ncols() != classes => Err(VatErr::ShapeMismatch {
            what: "scores classes",
            got: scores.ncols(),
            expected: classes,
        }),
        _ => Ok(scores),
    }
}
