use super::{Optimizer, Result, optimizer::check_len};

/// Gradient descent with a velocity term, `v = mu * v + g; p -= lr * v`.
#[derive(Debug, Clone)]
pub struct GradientDescentWithMomentum {
    learning_rate: f32,
    momentum: f32,
    velocity: Vec<f32>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of values of the parameter it optimizes.
    /// * `learning_rate` - The factor applied to the velocity.
    /// * `momentum` - How much of the previous velocity is kept on every step.
    ///
    /// # Returns
    /// A new `GradientDescentWithMomentum` instance.
    pub fn new(len: usize, learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: vec![0.; len],
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        check_len(grad, params)?;
        check_len(grad, &self.velocity)?;

        for ((p, g), v) in params.iter_mut().zip(grad).zip(&mut self.velocity) {
            *v = self.momentum * *v + g;
            *p -= self.learning_rate * *v;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_accumulates_across_steps() {
        let mut optimizer = GradientDescentWithMomentum::new(1, 1., 0.5);
        let mut params = [0.];

        optimizer.update_params(&[1.], &mut params).unwrap();
        assert_eq!(params, [-1.]);

        // v = 0.5 * 1 + 1
        optimizer.update_params(&[1.], &mut params).unwrap();
        assert_eq!(params, [-2.5]);
    }

    #[test]
    fn rejects_gradients_of_another_parameter() {
        let mut optimizer = GradientDescentWithMomentum::new(2, 1., 0.9);
        let mut params = [0.; 3];

        assert!(optimizer.update_params(&[1.; 3], &mut params).is_err());
        assert_eq!(params, [0.; 3]);
    }
}
