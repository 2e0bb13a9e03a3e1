use serde::{Deserialize, Serialize};

use super::Weight;

pub(super) const DEFAULT_XI: f32 = 1e-6;
pub(super) const DEFAULT_EPSILON: f32 = 2.0;
pub(super) const DEFAULT_NUM_APPROXIMATION: usize = 1;
pub(super) const DEFAULT_CLIP_VALUE_MIN: f32 = 1e-30;

/// The raw, unvalidated parameters of a virtual adversarial loss computation.
///
/// Any missing field takes its default value when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VatParams {
    /// Scale of the probe perturbation used while searching for the adversarial direction.
    pub xi: f32,
    /// Scale of the final adversarial perturbation.
    pub epsilon: f32,
    /// Weight of each example in the loss. Weights must be finite and non-negative; all of
    /// them being zero gives a zero loss.
    pub weight: Weight,
    /// Amount of power iterations used to approximate the adversarial direction.
    pub num_approximation: usize,
    /// Floor applied to every divisor and logarithm argument.
    pub clip_value_min: f32,
}

impl Default for VatParams {
    fn default() -> Self {
        Self {
            xi: DEFAULT_XI,
            epsilon: DEFAULT_EPSILON,
            weight: Weight::default(),
            num_approximation: DEFAULT_NUM_APPROXIMATION,
            clip_value_min: DEFAULT_CLIP_VALUE_MIN,
        }
    }
}
