pub mod activations;
pub mod layers;
pub mod loss;
mod linear;
mod scorer;
mod sequential;

use ndarray::{ArrayD, ArrayView2, ArrayViewD, CowArray, Ix2, IxDyn};

pub use linear::Linear;
pub use scorer::Scorer;
pub use sequential::{Gradients, Sequential};

use crate::{Result, VatErr};

/// Views a batch of any rank as a matrix with one flattened example per row.
fn flatten<'a>(x: &'a ArrayViewD<'_, f32>) -> Result<CowArray<'a, f32, Ix2>> {
    if x.ndim() == 0 {
        return Err(VatErr::ShapeMismatch {
            what: "batched input rank",
            got: 0,
            expected: 2,
        });
    }

    let batch = x.len_of(ndarray::Axis(0));
    let features = x.shape()[1..].iter().product::<usize>();
    let len = x.len();

    x.to_shape((batch, features))
        .map_err(|_| VatErr::ShapeMismatch {
            what: "flattened input",
            got: len,
            expected: batch * features,
        })
}

/// Reshapes a `[batch, features]` gradient back into the shape of the input it belongs to.
fn unflatten(grad: ArrayView2<f32>, shape: &[usize]) -> Result<ArrayD<f32>> {
    let len = grad.len();

    grad.to_shape(IxDyn(shape))
        .map(|grad| grad.into_owned())
        .map_err(|_| VatErr::ShapeMismatch {
            what: "input gradient",
            got: len,
            expected: shape.iter().product(),
        })
}
