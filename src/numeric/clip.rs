use ndarray::{Array, ArrayBase, Data, Dimension};

/// Clips every element of `x` from below.
///
/// # Arguments
/// * `x` - The values to clip.
/// * `clip_value_min` - The floor, used before any division or logarithm.
///
/// # Returns
/// A new array with `max(x, clip_value_min)` elementwise.
pub fn clip_floor<S, D>(x: &ArrayBase<S, D>, clip_value_min: f32) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    x.mapv(|v| v.max(clip_value_min))
}

/// Natural logarithm of the floor-clipped values of `x`.
pub fn clipped_ln<S, D>(x: &ArrayBase<S, D>, clip_value_min: f32) -> Array<f32, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    x.mapv(|v| v.max(clip_value_min).ln())
}
