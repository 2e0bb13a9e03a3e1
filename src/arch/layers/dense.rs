use ndarray::{linalg, prelude::*};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::{Result, VatErr, arch::activations::ActFn};

/// A fully connected layer, `act_fn(x . w + b)`.
#[derive(Debug, Clone)]
pub struct Dense {
    w: Array2<f32>,
    b: Array1<f32>,
    act_fn: Option<ActFn>,
}

/// The values a forward pass keeps for the backward pass of the same layer.
#[derive(Debug)]
pub struct DenseTrace {
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `w` - The weights, shaped `[inputs, outputs]`.
    /// * `b` - The biases, one per output.
    /// * `act_fn` - An optional activation applied after the affine map.
    ///
    /// # Returns
    /// A new `Dense` instance or an error if the biases don't match the amount of outputs.
    pub fn new(w: Array2<f32>, b: Array1<f32>, act_fn: Option<ActFn>) -> Result<Self> {
        if b.len() != w.ncols() {
            return Err(VatErr::ShapeMismatch {
                what: "dense biases",
                got: b.len(),
                expected: w.ncols(),
            });
        }

        Ok(Self { w, b, act_fn })
    }

    /// Creates a `Dense` layer with normal weights scaled by `1 / sqrt(inputs)` and zero biases.
    ///
    /// # Arguments
    /// * `dim` - The amount of inputs and outputs.
    /// * `act_fn` - An optional activation applied after the affine map.
    /// * `rng` - A random number generator.
    pub fn random<R: Rng>(dim: (usize, usize), act_fn: Option<ActFn>, rng: &mut R) -> Self {
        let scale = 1. / (dim.0.max(1) as f32).sqrt();
        let w = Array2::random_using(dim, StandardNormal, rng) * scale;
        let b = Array1::zeros(dim.1);

        Self { w, b, act_fn }
    }

    /// Returns the amount of inputs and outputs.
    pub fn dim(&self) -> (usize, usize) {
        self.w.dim()
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.w.len() + self.b.len()
    }

    /// Makes a forward pass through the layer.
    ///
    /// # Arguments
    /// * `x` - The input, one example per row.
    ///
    /// # Returns
    /// The activations together with the trace needed by `backward`.
    pub fn forward(&self, x: Array2<f32>) -> Result<(Array2<f32>, DenseTrace)> {
        if x.ncols() != self.w.nrows() {
            return Err(VatErr::ShapeMismatch {
                what: "dense inputs",
                got: x.ncols(),
                expected: self.w.nrows(),
            });
        }

        let mut z = x.dot(&self.w);
        z += &self.b;

        let a = match &self.act_fn {
            Some(act_fn) => z.mapv(|z| act_fn.f(z)),
            None => z.clone(),
        };

        Ok((a, DenseTrace { x, z }))
    }

    /// Makes a backward pass through the layer.
    ///
    /// # Arguments
    /// * `trace` - The trace of the forward pass being differentiated.
    /// * `d` - The gradient with respect to this layer's output.
    /// * `grad` - This layer's slice of the parameter gradient, written as the weights followed
    ///   by the biases.
    ///
    /// # Returns
    /// The gradient with respect to this layer's input.
    pub fn backward(
        &self,
        trace: &DenseTrace,
        mut d: Array2<f32>,
        grad: &mut [f32],
    ) -> Result<Array2<f32>> {
        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&trace.z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &trace.x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        Ok(d.dot(&self.w.t()))
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    ///
    /// # Arguments
    /// * `grad` - A gradient slice.
    ///
    /// # Returns
    /// A tuple containing the delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        let size = self.size();
        let mismatch = |got| VatErr::ShapeMismatch {
            what: "dense gradient",
            got,
            expected: size,
        };

        if grad.len() != size {
            return Err(mismatch(grad.len()));
        }

        let (dw_raw, db_raw) = grad.split_at_mut(self.w.len());
        let dw = ArrayViewMut2::from_shape(self.w.dim(), dw_raw).map_err(|_| mismatch(size))?;
        let db = ArrayViewMut1::from_shape(self.b.len(), db_raw).map_err(|_| mismatch(size))?;
        Ok((dw, db))
    }
}
