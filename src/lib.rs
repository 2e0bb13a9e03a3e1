//! Virtual adversarial training loss.
//!
//! Given a batch of inputs and a classifier seen as a [`Scorer`](arch::Scorer), computes the
//! divergence between the classifier's predictions at each input and at the bounded
//! perturbation of that input that changes them the most. No labels are involved, so the
//! loss can regularize a classifier towards locally smooth predictions on unlabeled data.
//!
//! ```no_run
//! use ndarray::{Array, IxDyn};
//! use virtual_adversarial::{VatConfig, arch::Linear, compute_vat, noise::GaussianNoise};
//!
//! let mut noise = GaussianNoise::seeded(0);
//! let scorer = Linear::random(8, 2, &mut rand::rng());
//! let x = Array::zeros(IxDyn(&[4, 8]));
//!
//! let output = compute_vat(x.view(), &scorer, None, &VatConfig::default(), &mut noise)?;
//! println!("loss: {}", output.loss);
//! # Ok::<(), virtual_adversarial::VatErr>(())
//! ```

pub mod arch;
pub mod autodiff;
pub mod config;
pub mod error;
pub mod noise;
pub mod numeric;
pub mod vat;

pub use config::{VatConfig, VatParams, Weight};
pub use error::{Result, VatErr};
pub use vat::{VatOutput, compute_vat};
