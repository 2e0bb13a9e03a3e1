use ndarray::ArrayD;

use super::NoiseGen;
use crate::{Result, VatErr};

/// A noise generator that always yields the same array.
///
/// Useful to pin the starting point of the direction search.
#[derive(Debug, Clone)]
pub struct FixedNoise {
    values: ArrayD<f32>,
}

impl FixedNoise {
    /// Creates a new `FixedNoise` generator.
    ///
    /// # Arguments
    /// * `values` - The array to return on every sample.
    pub fn new(values: ArrayD<f32>) -> Self {
        Self { values }
    }
}

impl NoiseGen for FixedNoise {
    fn sample(&mut self, shape: &[usize]) -> Result<ArrayD<f32>> {
        if self.values.shape() != shape {
            return Err(VatErr::ShapeMismatch {
                what: "fixed noise",
                got: self.values.len(),
                expected: shape.iter().product(),
            });
        }

        Ok(self.values.clone())
    }
}
