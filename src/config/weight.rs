use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{Result, VatErr};

/// The weight of every example in the loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    /// The same weight for every example.
    Scalar(f32),
    /// One weight per example, in batch order.
    PerExample(Vec<f32>),
}

impl Default for Weight {
    fn default() -> Self {
        Self::Scalar(1.)
    }
}

impl From<f32> for Weight {
    fn from(value: f32) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f32>> for Weight {
    fn from(value: Vec<f32>) -> Self {
        Self::PerExample(value)
    }
}

impl Weight {
    /// Expands the weight to one value per example.
    ///
    /// # Arguments
    /// * `batch` - The amount of examples in the batch.
    ///
    /// # Returns
    /// The per-example weights, or an error if there's a weight per example and their amount
    /// differs from `batch`.
    pub fn per_example(&self, batch: usize) -> Result<Array1<f32>> {
        match self {
            Self::Scalar(w) => Ok(Array1::from_elem(batch, *w)),
            Self::PerExample(ws) if ws.len() == batch => Ok(Array1::from_vec(ws.clone())),
            Self::PerExample(ws) => Err(VatErr::WeightMismatch {
                got: ws.len(),
                expected: batch,
            }),
        }
    }

    /// Checks that every weight is finite and non-negative, so the weighted mean can't divide
    /// by a sum that cancels out to zero.
    pub(super) fn validate(&self) -> Result<()> {
        let valid = |w: &f32| w.is_finite() && *w >= 0.;
        let all_valid = match self {
            Self::Scalar(w) => valid(w),
            Self::PerExample(ws) => ws.iter().all(valid),
        };

        if !all_valid {
            return Err(VatErr::InvalidConfig {
                what: "weight",
                reason: "every weight must be finite and non-negative",
            });
        }

        Ok(())
    }
}
