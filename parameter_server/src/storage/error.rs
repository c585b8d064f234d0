use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use super::Escalation;
use crate::model::ModelError;

/// The underlying reason an update couldn't be applied.
#[derive(Debug)]
pub enum ApplyFailure {
    /// The payload couldn't be decoded into a `GradientBatch`.
    Decode(io::Error),
    /// The model rejected the gradients or failed to step.
    Model(ModelError),
}

impl Display for ApplyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "malformed gradient payload: {e}"),
            Self::Model(e) => Display::fmt(e, f),
        }
    }
}

/// Error returned when an update request doesn't get applied to the store.
#[derive(Debug)]
pub enum UpdateError {
    /// The amount of gradients doesn't match the amount of parameters, nothing was touched.
    ShapeMismatch { expected: usize, got: usize },
    /// Decoding, assigning or stepping failed.
    ApplyFailed(ApplyFailure),
    /// Too many updates failed, the service must be restarted.
    BudgetExhausted {
        failures: usize,
        cause: Option<Box<UpdateError>>,
    },
}

impl UpdateError {
    /// Tells the hosting layer whether this failure only concerns the current request.
    pub fn escalation(&self) -> Escalation {
        match self {
            Self::BudgetExhausted { .. } => Escalation::Fatal,
            _ => Escalation::Recoverable,
        }
    }
}

impl From<ModelError> for UpdateError {
    fn from(value: ModelError) -> Self {
        Self::ApplyFailed(ApplyFailure::Model(value))
    }
}

impl From<io::Error> for UpdateError {
    fn from(value: io::Error) -> Self {
        Self::ApplyFailed(ApplyFailure::Decode(value))
    }
}

impl Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, got } => {
                write!(f, "expected {expected} gradients, got {got}")
            }
            Self::ApplyFailed(e) => write!(f, "failed to apply update: {e}"),
            Self::BudgetExhausted {
                failures,
                cause: Some(cause),
            } => write!(f, "max errors reached after {failures} failures: {cause}"),
            Self::BudgetExhausted {
                failures,
                cause: None,
            } => write!(f, "max errors reached after {failures} failures"),
        }
    }
}

impl Error for UpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ApplyFailed(ApplyFailure::Decode(e)) => Some(e),
            Self::ApplyFailed(ApplyFailure::Model(e)) => Some(e),
            Self::BudgetExhausted {
                cause: Some(cause), ..
            } => Some(cause.as_ref()),
            _ => None,
        }
    }
}
