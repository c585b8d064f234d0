use comms::{ShapeErr, Tensor};

/// A `ParamGen` generates the initial value of a model's parameter.
pub trait ParamGen {
    /// Generates a tensor of the given shape.
    ///
    /// # Arguments
    /// * `shape` - The dimensions of the parameter.
    ///
    /// # Returns
    /// The generated tensor or a `ShapeErr` if the generator can't fill that shape.
    fn generate(&mut self, shape: Vec<usize>) -> Result<Tensor, ShapeErr>;
}
