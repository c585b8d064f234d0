use comms::{GradientBatch, ParameterSnapshot, Tensor};

use super::Result;

/// A trainable model together with the optimizer that advances it.
///
/// The `ParameterStore` only talks to the model through this trait. The order of
/// `parameters` is fixed when the model is built and must never change, gradients
/// are matched to parameters by position.
pub trait Model: Send {
    /// Returns the learnable parameters in their enumeration order.
    fn parameters(&self) -> &[Tensor];

    /// Attaches `grads` to the parameters, replacing any gradients that weren't stepped yet.
    ///
    /// # Arguments
    /// * `grads` - One gradient per parameter, in enumeration order.
    ///
    /// # Returns
    /// An error if the gradients don't fit the parameters, nothing is attached in that case.
    fn assign_gradients(&mut self, grads: GradientBatch) -> Result<()>;

    /// Runs a single optimization step using the attached gradients, consuming them.
    ///
    /// # Returns
    /// An error if there are no gradients attached or the optimizer failed. A failure
    /// halfway through may leave some parameters already updated.
    fn step(&mut self) -> Result<()>;

    /// Attaches `grads` and steps with them right away.
    ///
    /// # Arguments
    /// * `grads` - One gradient per parameter, in enumeration order.
    ///
    /// # Returns
    /// An error if the gradients were rejected or the step failed.
    fn apply_gradients(&mut self, grads: GradientBatch) -> Result<()> {
        self.assign_gradients(grads)?;
        self.step()
    }

    /// Copies the current parameter values out of the model.
    fn state(&self) -> ParameterSnapshot {
        ParameterSnapshot::new(self.parameters().to_vec())
    }
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn parameters(&self) -> &[Tensor] {
        (**self).parameters()
    }

    fn assign_gradients(&mut self, grads: GradientBatch) -> Result<()> {
        (**self).assign_gradients(grads)
    }

    fn step(&mut self) -> Result<()> {
        (**self).step()
    }

    fn apply_gradients(&mut self, grads: GradientBatch) -> Result<()> {
        (**self).apply_gradients(grads)
    }

    fn state(&self) -> ParameterSnapshot {
        (**self).state()
    }
}
