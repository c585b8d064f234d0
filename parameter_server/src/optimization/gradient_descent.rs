use super::{Optimizer, Result, optimizer::check_len};

/// Plain gradient descent, `p -= lr * g`.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` optimizer.
    ///
    /// # Arguments
    /// * `learning_rate` - The factor applied to every gradient.
    ///
    /// # Returns
    /// A new `GradientDescent` instance.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_len(grad, params)?;

        params
            .iter_mut()
            .zip(grad)
            .for_each(|(p, g)| *p -= self.learning_rate * g);

        Ok(())
    }
}
