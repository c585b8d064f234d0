use std::sync::Arc;

use comms::{GradientBatch, ParameterSnapshot};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};

use super::{ErrorBudget, Escalation, UpdateError};
use crate::model::Model;

/// The single authoritative copy of a model's parameters.
///
/// Readers get the last published `ParameterSnapshot`, writers push gradients that the
/// model consumes in exactly one optimization step. Every failed update is charged to
/// the store's `ErrorBudget`.
///
/// Gradient assignment, step and publish run as one critical section on the model,
/// so concurrent `apply` calls never consume each other's gradients nor publish out
/// of order. Callers that also need reads ordered against writes must hold a
/// `synchronization::RwLock` around both.
#[derive(Debug)]
pub struct ParameterStore<M: Model> {
    nparams: usize,
    model: Mutex<M>,
    snapshot: RwLock<Arc<ParameterSnapshot>>,
    budget: ErrorBudget,
}

impl<M: Model> ParameterStore<M> {
    /// Creates a new `ParameterStore`.
    ///
    /// # Arguments
    /// * `model` - The model and optimizer to drive, its current state becomes the first snapshot.
    /// * `budget` - The failure budget of this store.
    ///
    /// # Returns
    /// A new `ParameterStore` instance.
    pub fn new(model: M, budget: ErrorBudget) -> Self {
        let snapshot = Arc::new(model.state());

        Self {
            nparams: model.parameters().len(),
            model: Mutex::new(model),
            snapshot: RwLock::new(snapshot),
            budget,
        }
    }

    /// Returns the amount of parameters in the store.
    pub fn len(&self) -> usize {
        self.nparams
    }

    pub fn is_empty(&self) -> bool {
        self.nparams == 0
    }

    pub fn budget(&self) -> &ErrorBudget {
        &self.budget
    }

    /// Returns the last published snapshot, it never blocks on an ongoing update's step.
    pub fn read(&self) -> Arc<ParameterSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Applies `grads` to the model with a single optimization step and publishes the result.
    ///
    /// # Arguments
    /// * `grads` - One gradient per parameter, in enumeration order.
    ///
    /// # Returns
    /// An `UpdateError` if the update wasn't applied. Once the budget is exhausted every
    /// call fails with `UpdateError::BudgetExhausted` without reaching the model.
    pub fn apply(&self, grads: GradientBatch) -> Result<(), UpdateError> {
        if self.budget.is_exhausted() {
            return Err(UpdateError::BudgetExhausted {
                failures: self.budget.failures(),
                cause: None,
            });
        }

        self.try_apply(grads).map_err(|err| self.escalate(err))
    }

    /// Charges a failed update to the budget.
    ///
    /// # Arguments
    /// * `err` - The error that made the update fail.
    ///
    /// # Returns
    /// `err` itself while the failure is recoverable, otherwise `err` wrapped in an
    /// `UpdateError::BudgetExhausted`.
    pub fn escalate(&self, err: UpdateError) -> UpdateError {
        match self.budget.record_failure() {
            Escalation::Recoverable => {
                warn!(
                    failures = self.budget.failures(),
                    max_errors = self.budget.max_errors();
                    "update failed: {err}"
                );
                err
            }
            Escalation::Fatal => UpdateError::BudgetExhausted {
                failures: self.budget.failures(),
                cause: Some(Box::new(err)),
            },
        }
    }

    fn try_apply(&self, grads: GradientBatch) -> Result<(), UpdateError> {
        if grads.len() != self.nparams {
            return Err(UpdateError::ShapeMismatch {
                expected: self.nparams,
                got: grads.len(),
            });
        }

        let mut model = self.model.lock();
        model.apply_gradients(grads)?;
        *self.snapshot.write() = Arc::new(model.state());

        debug!("published a new parameter snapshot");
        Ok(())
    }
}
