use comms::{GradientBatch, Tensor};
use rayon::prelude::*;

use super::{Model, ModelError, Result};
use crate::optimization::Optimizer;

/// A model made of plain parameter tensors, each with its own optimizer instance.
///
/// Gradients are attached by `assign_gradients` and consumed by `step`, every
/// parameter is updated in parallel.
#[derive(Debug)]
pub struct OptimizedModel<O: Optimizer> {
    params: Vec<Tensor>,
    grads: Option<Vec<Tensor>>,
    optimizers: Vec<O>,
}

impl<O: Optimizer> OptimizedModel<O> {
    /// Creates a new `OptimizedModel`.
    ///
    /// # Arguments
    /// * `params` - The initial parameters, in enumeration order.
    /// * `optimizer_factory` - An `Optimizer` factory closure, called with each parameter's length.
    ///
    /// # Returns
    /// A new `OptimizedModel` instance.
    pub fn new<OF>(params: Vec<Tensor>, optimizer_factory: OF) -> Self
    where
        OF: FnMut(usize) -> O,
    {
        let optimizers = params.iter().map(Tensor::len).map(optimizer_factory).collect();

        Self {
            params,
            grads: None,
            optimizers,
        }
    }

    /// Whether gradients were assigned and not stepped yet.
    pub fn has_pending_gradients(&self) -> bool {
        self.grads.is_some()
    }
}

impl<O: Optimizer + Send> Model for OptimizedModel<O> {
    fn parameters(&self) -> &[Tensor] {
        &self.params
    }

    fn assign_gradients(&mut self, grads: GradientBatch) -> Result<()> {
        if grads.len() != self.params.len() {
            return Err(ModelError::GradientCount {
                expected: self.params.len(),
                got: grads.len(),
            });
        }

        let mismatch = self
            .params
            .iter()
            .zip(grads.iter())
            .position(|(p, g)| p.len() != g.len());

        if let Some(index) = mismatch {
            return Err(ModelError::GradientShape {
                index,
                expected: self.params[index].len(),
                got: grads[index].len(),
            });
        }

        self.grads = Some(grads.into_inner());
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        let grads = self.grads.take().ok_or(ModelError::MissingGradients)?;

        self.params
            .par_iter_mut()
            .zip(grads.par_iter())
            .zip(self.optimizers.par_iter_mut())
            .try_for_each(|((param, grad), optimizer)| {
                optimizer.update_params(grad.values(), param.values_mut())
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use comms::ParameterSnapshot;

    use super::*;
    use crate::optimization::GradientDescent;

    fn model(values: &[f32]) -> OptimizedModel<GradientDescent> {
        let params = values.iter().copied().map(Tensor::scalar).collect();
        OptimizedModel::new(params, |_| GradientDescent::new(1.))
    }

    fn grads(values: &[f32]) -> GradientBatch {
        values.iter().copied().map(Tensor::scalar).collect::<Vec<_>>().into()
    }

    #[test]
    fn step_consumes_the_gradients() {
        let mut model = model(&[1., 2.]);

        model.assign_gradients(grads(&[0.5, 0.5])).unwrap();
        assert!(model.has_pending_gradients());

        model.step().unwrap();
        assert!(!model.has_pending_gradients());
        assert_eq!(
            model.state(),
            ParameterSnapshot::new(vec![Tensor::scalar(0.5), Tensor::scalar(1.5)])
        );

        assert!(matches!(model.step(), Err(ModelError::MissingGradients)));
    }

    #[test]
    fn assignment_replaces_pending_gradients() {
        let mut model = model(&[0.]);

        model.assign_gradients(grads(&[1.])).unwrap();
        model.assign_gradients(grads(&[3.])).unwrap();
        model.step().unwrap();

        assert_eq!(model.parameters(), &[Tensor::scalar(-3.)]);
    }

    #[test]
    fn apply_gradients_steps_once() {
        let mut model = model(&[1., 2.]);

        model.apply_gradients(grads(&[1., 1.])).unwrap();
        assert!(!model.has_pending_gradients());
        assert_eq!(model.parameters(), &[Tensor::scalar(0.), Tensor::scalar(1.)]);

        assert!(model.apply_gradients(grads(&[1.])).is_err());
        assert_eq!(model.parameters(), &[Tensor::scalar(0.), Tensor::scalar(1.)]);
    }

    #[test]
    fn rejects_wrong_gradient_count() {
        let mut model = model(&[1., 2.]);

        let err = model.assign_gradients(grads(&[1.])).unwrap_err();
        assert!(matches!(err, ModelError::GradientCount { expected: 2, got: 1 }));
        assert!(!model.has_pending_gradients());
    }

    #[test]
    fn rejects_gradient_of_wrong_size() {
        let params = vec![Tensor::vector(vec![0.; 3]), Tensor::vector(vec![0.; 2])];
        let mut model = OptimizedModel::new(params, |_| GradientDescent::new(1.));

        let batch = vec![Tensor::vector(vec![1.; 3]), Tensor::vector(vec![1.; 4])].into();
        let err = model.assign_gradients(batch).unwrap_err();

        assert!(matches!(
            err,
            ModelError::GradientShape {
                index: 1,
                expected: 2,
                got: 4
            }
        ));
        assert!(!model.has_pending_gradients());
    }

    #[test]
    fn optimizer_per_parameter_is_sized_by_the_factory() {
        let params = vec![Tensor::zeros(vec![2, 2]), Tensor::zeros(vec![3])];
        let mut lens = Vec::new();

        let _ = OptimizedModel::new(params, |len| {
            lens.push(len);
            GradientDescent::new(1.)
        });

        assert_eq!(lens, [4, 3]);
    }
}
