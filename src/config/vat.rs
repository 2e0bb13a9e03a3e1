use std::num::NonZeroUsize;

use super::{
    VatParams, Weight,
    params::{DEFAULT_CLIP_VALUE_MIN, DEFAULT_EPSILON, DEFAULT_XI},
};
use crate::{Result, VatErr};

/// Immutable, validated parameters of a virtual adversarial loss computation.
#[derive(Debug, Clone, PartialEq)]
pub struct VatConfig {
    xi: f32,
    epsilon: f32,
    weight: Weight,
    num_approximation: NonZeroUsize,
    clip_value_min: f32,
}

impl Default for VatConfig {
    fn default() -> Self {
        Self {
            xi: DEFAULT_XI,
            epsilon: DEFAULT_EPSILON,
            weight: Weight::default(),
            num_approximation: NonZeroUsize::MIN,
            clip_value_min: DEFAULT_CLIP_VALUE_MIN,
        }
    }
}

impl TryFrom<VatParams> for VatConfig {
    type Error = VatErr;

    fn try_from(params: VatParams) -> Result<Self> {
        let VatParams {
            xi,
            epsilon,
            weight,
            num_approximation,
            clip_value_min,
        } = params;

        positive_finite("xi", xi)?;
        positive_finite("epsilon", epsilon)?;
        positive_finite("clip_value_min", clip_value_min)?;
        weight.validate()?;

        let num_approximation =
            NonZeroUsize::new(num_approximation).ok_or(VatErr::InvalidConfig {
                what: "num_approximation",
                reason: "at least one approximation step is required",
            })?;

        Ok(Self {
            xi,
            epsilon,
            weight,
            num_approximation,
            clip_value_min,
        })
    }
}

impl VatConfig {
    /// Creates a new configuration.
    ///
    /// # Arguments
    /// * `params` - The raw parameters.
    ///
    /// # Returns
    /// A `VatConfig` instance, or an error if `xi`, `epsilon` or `clip_value_min` isn't a
    /// positive finite number, a weight is negative or not finite, or `num_approximation` is
    /// zero.
    pub fn new(params: VatParams) -> Result<Self> {
        Self::try_from(params)
    }

    /// Parses and validates a configuration from JSON, missing fields take their defaults.
    ///
    /// # Arguments
    /// * `json` - A JSON object with any of the fields of `VatParams`.
    ///
    /// # Returns
    /// A `VatConfig` instance or an error if parsing or validation failed.
    pub fn from_json(json: &str) -> Result<Self> {
        let params: VatParams = serde_json::from_str(json)?;
        Self::try_from(params)
    }

    /// Returns the scale of the probe perturbation.
    pub fn xi(&self) -> f32 {
        self.xi
    }

    /// Returns the scale of the adversarial perturbation.
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Returns the weight of each example.
    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    /// Returns the amount of power iterations.
    pub fn num_approximation(&self) -> usize {
        self.num_approximation.get()
    }

    /// Returns the floor applied to divisors and logarithm arguments.
    pub fn clip_value_min(&self) -> f32 {
        self.clip_value_min
    }
}

fn positive_finite(what: &'static str, value: f32) -> Result<()> {
    if !(value > 0. && value.is_finite()) {
        return Err(VatErr::InvalidConfig {
            what,
            reason: "must be a positive finite number",
        });
    }

    Ok(())
}
