use comms::{ShapeErr, Tensor};

use super::ParamGen;

/// A parameter generator that fills every parameter with the same value.
pub struct ConstParamGen {
    value: f32,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `value` - The value to always generate.
    ///
    /// # Returns
    /// A new `ConstParamGen` instance.
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl ParamGen for ConstParamGen {
    fn generate(&mut self, shape: Vec<usize>) -> Result<Tensor, ShapeErr> {
        let len = shape.iter().product();
        Tensor::new(shape, vec![self.value; len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar() {
        let mut param_gen = ConstParamGen::new(1.);
        assert_eq!(param_gen.generate(vec![]).unwrap(), Tensor::scalar(1.));
    }

    #[test]
    fn matrix() {
        let mut param_gen = ConstParamGen::new(0.5);
        let tensor = param_gen.generate(vec![2, 3]).unwrap();

        assert_eq!(tensor.shape(), &[2, 3]);
        assert_eq!(tensor.values(), &[0.5; 6]);
    }

    #[test]
    fn empty_dimension() {
        let mut param_gen = ConstParamGen::new(1.);
        assert!(param_gen.generate(vec![0, 4]).unwrap().is_empty());
    }
}
