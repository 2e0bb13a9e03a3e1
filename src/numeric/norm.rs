use ndarray::{Array1, ArrayD, ArrayViewD};

use crate::{Result, VatErr};

/// Computes the euclidean norm of every example over all of its non-batch axes.
///
/// The values are scaled by their maximum magnitude before squaring, so norms of tiny
/// examples don't underflow to zero in `f32`.
///
/// # Arguments
/// * `x` - An array with the batch along the first axis, of rank 2 or more.
///
/// # Returns
/// One norm per example, or an error if the rank of `x` is lower than 2.
pub fn per_example_norm(x: ArrayViewD<f32>) -> Result<Array1<f32>> {
    check_rank(&x)?;

    let norms = x.outer_iter().map(|example| {
        let scale = example.fold(0.0_f32, |m, v| m.max(v.abs()));
        if scale == 0.0 || !scale.is_finite() {
            return scale;
        }

        let sum: f32 = example.iter().map(|v| (v / scale).powi(2)).sum();
        scale * sum.sqrt()
    });

    Ok(Array1::from_iter(norms))
}

/// Scales every example of `x` to unit norm.
///
/// The norm is clipped from below by `clip_value_min` before dividing, so an all-zero example
/// stays at zero instead of turning into `NaN`.
///
/// # Arguments
/// * `x` - An array with the batch along the first axis, of rank 2 or more.
/// * `clip_value_min` - The floor applied to each norm.
///
/// # Returns
/// The normalized array, or an error if the rank of `x` is lower than 2.
pub fn normalize(x: ArrayViewD<f32>, clip_value_min: f32) -> Result<ArrayD<f32>> {
    let norms = per_example_norm(x.view())?;
    let mut normalized = x.to_owned();

    for (mut example, norm) in normalized.outer_iter_mut().zip(norms) {
        let divisor = norm.max(clip_value_min);
        example.mapv_inplace(|v| v / divisor);
    }

    Ok(normalized)
}

fn check_rank(x: &ArrayViewD<f32>) -> Result<()> {
    if x.ndim() < 2 {
        return Err(VatErr::ShapeMismatch {
            what: "batched input rank",
            got: x.ndim(),
            expected: 2,
        });
    }

    Ok(())
}
