use super::{Result, SizeMismatchErr};

/// Computes the next value of a parameter tensor out of its gradient.
///
/// An `Optimizer` instance belongs to a single parameter, so it may keep per value
/// state (moments, velocities) between calls.
pub trait Optimizer {
    /// Takes one optimization step.
    ///
    /// # Arguments
    /// * `grad` - The gradient of the parameter.
    /// * `params` - The flattened values of the parameter, updated in place.
    ///
    /// # Returns
    /// A `SizeMismatchErr` if `grad` and `params` have different lengths, `params` is
    /// left untouched in that case.
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()>;
}

/// Fails unless `grad` and `params` are the same length.
pub(super) fn check_len(grad: &[f32], params: &[f32]) -> Result<()> {
    if grad.len() != params.len() {
        return Err(SizeMismatchErr {
            grad: grad.len(),
            params: params.len(),
        });
    }

    Ok(())
}
