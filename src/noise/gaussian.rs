use ndarray::{ArrayD, IxDyn};
use ndarray_rand::RandomExt;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use super::NoiseGen;
use crate::Result;

/// Standard normal noise, drawn independently for every element.
pub struct GaussianNoise<R: Rng> {
    rng: R,
}

impl<R: Rng> GaussianNoise<R> {
    /// Creates a new `GaussianNoise` generator.
    ///
    /// # Arguments
    /// * `rng` - The random number generator to draw from.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl GaussianNoise<StdRng> {
    /// Creates a reproducible `GaussianNoise` generator.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> NoiseGen for GaussianNoise<R> {
    fn sample(&mut self, shape: &[usize]) -> Result<ArrayD<f32>> {
        Ok(ArrayD::random_using(IxDyn(shape), StandardNormal, &mut self.rng))
    }
}
