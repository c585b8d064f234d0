use std::{
    error::Error,
    fmt::{self, Display},
};

/// The specific result type of the optimizers.
pub type Result<T> = std::result::Result<T, SizeMismatchErr>;

/// Error returned by an `Optimizer` when a gradient and the parameters it
/// updates have different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeMismatchErr {
    pub grad: usize,
    pub params: usize,
}

impl Display for SizeMismatchErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "optimizer error: got a gradient of length {} for {} parameters",
            self.grad, self.params
        )
    }
}

impl Error for SizeMismatchErr {}
