use std::{cell::RefCell, rc::Rc};

use comms::{ShapeErr, Tensor};
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

use super::{ParamGen, Result};

/// A parameter generator that samples every value from a probabilistic distribution.
///
/// The random number generator is shared, so several generators built from the same
/// seeded rng produce a reproducible model.
pub struct RandParamGen<R: Rng, D: Distribution<f32>> {
    rng: Rc<RefCell<R>>,
    distribution: D,
}

impl<R: Rng, D: Distribution<f32>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the values from.
    pub fn new(rng: Rc<RefCell<R>>, distribution: D) -> Self {
        Self { rng, distribution }
    }
}

impl<R: Rng> RandParamGen<R, Uniform<f32>> {
    /// Uniform distribution over `[low, high)`.
    ///
    /// # Returns
    /// An error if the range is invalid (low >= high).
    pub fn uniform(rng: Rc<RefCell<R>>, low: f32, high: f32) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new(low, high)?))
    }

    /// Uniform distribution over `[low, high]`.
    ///
    /// # Returns
    /// An error if the range is invalid (low > high).
    pub fn uniform_inclusive(rng: Rc<RefCell<R>>, low: f32, high: f32) -> Result<Self> {
        Ok(Self::new(rng, Uniform::new_inclusive(low, high)?))
    }

    /// Xavier uniform initialization, `U(-r, r)` with `r = sqrt(6 / (fan_in + fan_out))`.
    pub fn xavier_uniform(rng: Rc<RefCell<R>>, fan_in: usize, fan_out: usize) -> Result<Self> {
        let range = (6. / (fan_in + fan_out) as f32).sqrt();
        Self::uniform(rng, -range, range)
    }

    /// LeCun uniform initialization, `U(-r, r)` with `r = sqrt(3 / fan_in)`.
    pub fn lecun_uniform(rng: Rc<RefCell<R>>, fan_in: usize) -> Result<Self> {
        let range = (3. / fan_in as f32).sqrt();
        Self::uniform(rng, -range, range)
    }
}

impl<R: Rng> RandParamGen<R, Normal<f32>> {
    /// Normal distribution.
    ///
    /// # Returns
    /// An error if `std_dev` is not finite (Nan or infinite).
    pub fn normal(rng: Rc<RefCell<R>>, mean: f32, std_dev: f32) -> Result<Self> {
        Ok(Self::new(rng, Normal::new(mean, std_dev)?))
    }

    /// Kaiming normal initialization, `N(0, 2 / fan_in)`.
    pub fn kaiming(rng: Rc<RefCell<R>>, fan_in: usize) -> Result<Self> {
        let std_dev = (2. / fan_in as f32).sqrt();
        Self::normal(rng, 0., std_dev)
    }

    /// Xavier normal initialization, `N(0, 2 / (fan_in + fan_out))`.
    pub fn xavier(rng: Rc<RefCell<R>>, fan_in: usize, fan_out: usize) -> Result<Self> {
        Self::kaiming(rng, fan_in + fan_out)
    }

    /// LeCun normal initialization, `N(0, 1 / fan_in)`.
    pub fn lecun(rng: Rc<RefCell<R>>, fan_in: usize) -> Result<Self> {
        let std_dev = (1. / fan_in as f32).sqrt();
        Self::normal(rng, 0., std_dev)
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for RandParamGen<R, D> {
    fn generate(&mut self, shape: Vec<usize>) -> std::result::Result<Tensor, ShapeErr> {
        let len = shape.iter().product();

        let mut rng = self.rng.borrow_mut();
        let values = (0..len).map(|_| self.distribution.sample(&mut *rng)).collect();
        Tensor::new(shape, values)
    }
}
