use ndarray::ArrayD;

use crate::Result;

/// A `NoiseGen` generates the random starting point of the adversarial direction search.
pub trait NoiseGen {
    /// Samples a noise array.
    ///
    /// # Arguments
    /// * `shape` - The shape of the array to generate, batch axis first.
    ///
    /// # Returns
    /// The sampled array or an error if the generator can't produce that shape.
    fn sample(&mut self, shape: &[usize]) -> Result<ArrayD<f32>>;
}

impl<N: NoiseGen + ?Sized> NoiseGen for &mut N {
    fn sample(&mut self, shape: &[usize]) -> Result<ArrayD<f32>> {
        (**self).sample(shape)
    }
}
