//! Numeric safeguards shared by both phases of the virtual adversarial computation.
//!
//! Every function here works per example: the batch axis (axis 0) is never reduced over.

mod clip;
mod norm;
mod softmax;

pub use clip::{clip_floor, clipped_ln};
pub use norm::{normalize, per_example_norm};
pub use softmax::softmax;
