mod fixed;
mod gaussian;
mod noise_gen;

pub use fixed::FixedNoise;
pub use gaussian::GaussianNoise;
pub use noise_gen::NoiseGen;
