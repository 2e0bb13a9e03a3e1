use ndarray::{Array1, Array2, ArrayD, ArrayView2, ArrayViewD};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use super::{Scorer, flatten, unflatten};
use crate::{Result, VatErr};

/// An affine scorer: every example is flattened and mapped to `x . w + b`.
#[derive(Debug, Clone)]
pub struct Linear {
    w: Array2<f32>,
    b: Array1<f32>,
}

impl Linear {
    /// Creates a new `Linear` scorer.
    ///
    /// # Arguments
    /// * `w` - The weights, shaped `[features, classes]`.
    /// * `b` - The biases, one per class.
    ///
    /// # Returns
    /// A new `Linear` instance or an error if the biases don't match the amount of classes.
    pub fn new(w: Array2<f32>, b: Array1<f32>) -> Result<Self> {
        if b.len() != w.ncols() {
            return Err(VatErr::ShapeMismatch {
                what: "linear biases",
                got: b.len(),
                expected: w.ncols(),
            });
        }

        Ok(Self { w, b })
    }

    /// Creates a `Linear` scorer without biases, i.e. `x . w`.
    pub fn without_bias(w: Array2<f32>) -> Self {
        let b = Array1::zeros(w.ncols());
        Self { w, b }
    }

    /// Creates a `Linear` scorer with standard normal weights and zero biases.
    ///
    /// # Arguments
    /// * `features` - The size of a flattened example.
    /// * `classes` - The amount of classes.
    /// * `rng` - A random number generator.
    pub fn random<R: Rng>(features: usize, classes: usize, rng: &mut R) -> Self {
        let w = Array2::random_using((features, classes), StandardNormal, rng);
        Self::without_bias(w)
    }

    /// Returns the weights.
    pub fn weights(&self) -> &Array2<f32> {
        &self.w
    }

    /// Returns the biases.
    pub fn biases(&self) -> &Array1<f32> {
        &self.b
    }

    fn check_features(&self, features: usize) -> Result<()> {
        if features != self.w.nrows() {
            return Err(VatErr::ShapeMismatch {
                what: "linear input features",
                got: features,
                expected: self.w.nrows(),
            });
        }

        Ok(())
    }
}

impl Scorer for Linear {
    fn scores(&self, x: ArrayViewD<f32>) -> Result<Array2<f32>> {
        let x = flatten(&x)?;
        self.check_features(x.ncols())?;

        let mut scores = x.dot(&self.w);
        scores += &self.b;
        Ok(scores)
    }

    fn input_grad(&self, x: ArrayViewD<f32>, d_scores: ArrayView2<f32>) -> Result<ArrayD<f32>> {
        let flat = flatten(&x)?;
        self.check_features(flat.ncols())?;

        if d_scores.dim() != (flat.nrows(), self.w.ncols()) {
            return Err(VatErr::ShapeMismatch {
                what: "scores gradient",
                got: d_scores.len(),
                expected: flat.nrows() * self.w.ncols(),
            });
        }

        let grad = d_scores.dot(&self.w.t());
        unflatten(grad.view(), x.shape())
    }
}
