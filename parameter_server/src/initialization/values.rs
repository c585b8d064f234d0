use comms::{ShapeErr, Tensor};

use super::ParamGen;

/// A parameter generator that hands out explicitly given values, once.
pub struct ValuesParamGen {
    values: Option<Vec<f32>>,
}

impl ValuesParamGen {
    /// Creates a new `ValuesParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `values` - The flattened values of the parameter.
    ///
    /// # Returns
    /// A new `ValuesParamGen` instance.
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values: Some(values),
        }
    }
}

impl ParamGen for ValuesParamGen {
    fn generate(&mut self, shape: Vec<usize>) -> Result<Tensor, ShapeErr> {
        let values = self.values.take().unwrap_or_default();
        Tensor::new(shape, values)
    }
}
