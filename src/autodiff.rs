//! Gradient-tape primitives.
//!
//! Gradients in this crate are computed explicitly: the clipped cross-entropy is differentiated
//! by hand down to the class scores, and each `Scorer` maps a scores gradient back into input
//! space. Values that must act as constants in that chain are wrapped in [`Detached`], which is
//! the only way the loss functions accept a reference distribution.

/// A value excluded from differentiation.
///
/// Nothing downstream ever produces a gradient for a `Detached` value, even though it was
/// computed from differentiable quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct Detached<T>(T);

impl<T> Detached<T> {
    /// Returns a reference to the detached value.
    pub fn get(&self) -> &T {
        &self.0
    }

    /// Unwraps the detached value, handing it back as a plain constant.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Marks `value` as a constant for differentiation purposes.
///
/// # Arguments
/// * `value` - The value to detach from the gradient chain.
///
/// # Returns
/// The value wrapped in a `Detached`.
pub fn stop_gradient<T>(value: T) -> Detached<T> {
    Detached(value)
}
