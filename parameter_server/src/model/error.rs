use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::optimization::SizeMismatchErr;

/// The specific result type for the operations of a `Model`.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Error returned by a `Model` when it can't consume gradients or advance.
#[derive(Debug)]
pub enum ModelError {
    /// `step` was called without gradients assigned since the last step.
    MissingGradients,
    /// The amount of gradients doesn't match the amount of parameters.
    GradientCount { expected: usize, got: usize },
    /// A gradient doesn't hold as many values as its parameter.
    GradientShape {
        index: usize,
        expected: usize,
        got: usize,
    },
    /// The optimizer was handed buffers of different sizes.
    Optimizer(SizeMismatchErr),
}

impl From<SizeMismatchErr> for ModelError {
    fn from(value: SizeMismatchErr) -> Self {
        Self::Optimizer(value)
    }
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingGradients => f.write_str("Model error: no gradients assigned before step"),
            Self::GradientCount { expected, got } => {
                write!(f, "Model error: expected {expected} gradients, got {got}")
            }
            Self::GradientShape {
                index,
                expected,
                got,
            } => write!(
                f,
                "Model error: gradient {index} holds {got} values, its parameter holds {expected}"
            ),
            Self::Optimizer(e) => write!(f, "Model error: {e}"),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Optimizer(e) => Some(e),
            _ => None,
        }
    }
}
