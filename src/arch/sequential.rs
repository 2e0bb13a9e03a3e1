use std::mem;

use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD};

use super::{
    Scorer, flatten,
    layers::{Dense, DenseTrace},
    unflatten,
};
use crate::{Result, VatErr};

/// A sequential model: information flows forward when computing the scores and backward when
/// computing the gradients of its layers.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Dense>,
}

/// The gradients produced by a backward pass through a `Sequential`.
#[derive(Debug)]
pub struct Gradients {
    /// The parameter gradient, laid out layer after layer as weights followed by biases.
    pub params: Vec<f32>,
    /// The gradient with respect to the input, shaped like the input.
    pub input: ArrayD<f32>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance, or an error if there are no layers or the outputs of a
    /// layer don't match the inputs of the next one.
    pub fn new<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Dense>,
    {
        let layers: Vec<_> = layers.into_iter().collect();

        if layers.is_empty() {
            return Err(VatErr::ShapeMismatch {
                what: "layers",
                got: 0,
                expected: 1,
            });
        }

        for pair in layers.windows(2) {
            let (outputs, inputs) = (pair[0].dim().1, pair[1].dim().0);
            if outputs != inputs {
                return Err(VatErr::ShapeMismatch {
                    what: "chained layer inputs",
                    got: inputs,
                    expected: outputs,
                });
            }
        }

        Ok(Self { layers })
    }

    /// Returns the amount of parameters in the model.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Dense::size).sum()
    }

    /// Makes a backward pass through the network.
    ///
    /// # Arguments
    /// * `x` - The input batch.
    /// * `d_scores` - The gradient of some quantity with respect to the scores at `x`.
    ///
    /// # Returns
    /// The gradients of that quantity with respect to the parameters and to the input.
    pub fn backward(&self, x: ArrayViewD<f32>, d_scores: ArrayView2<f32>) -> Result<Gradients> {
        let (scores, traces) = self.forward(&x)?;

        if d_scores.dim() != scores.dim() {
            return Err(VatErr::ShapeMismatch {
                what: "scores gradient",
                got: d_scores.len(),
                expected: scores.len(),
            });
        }

        let mut params = vec![0.; self.size()];
        let mut back = params.as_mut_slice();
        let mut d = d_scores.to_owned();

        for (layer, trace) in self.layers.iter().zip(&traces).rev() {
            let split = back.len() - layer.size();
            let (rest, grad) = mem::take(&mut back).split_at_mut(split);

            d = layer.backward(trace, d, grad)?;
            back = rest;
        }

        let input = unflatten(d.view(), x.shape())?;
        Ok(Gradients { params, input })
    }

    fn forward(&self, x: &ArrayViewD<f32>) -> Result<(Array2<f32>, Vec<DenseTrace>)> {
        let mut a = flatten(x)?.into_owned();
        let mut traces = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let (next, trace) = layer.forward(a)?;
            traces.push(trace);
            a = next;
        }

        Ok((a, traces))
    }
}

impl Scorer for Sequential {
    fn scores(&self, x: ArrayViewD<f32>) -> Result<Array2<f32>> {
        let (scores, _) = self.forward(&x)?;
        Ok(scores)
    }

    fn input_grad(&self, x: ArrayViewD<f32>, d_scores: ArrayView2<f32>) -> Result<ArrayD<f32>> {
        Ok(self.backward(x, d_scores)?.input)
    }
}
