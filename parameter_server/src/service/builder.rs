use std::{
    cell::RefCell,
    error::Error,
    fmt::{self, Display},
    io,
    rc::Rc,
};

use comms::{
    ShapeErr, Tensor,
    specs::server::{DistributionSpec, InitSpec, OptimizerSpec, ParameterSpec, ServerSpec},
};
use rand::{SeedableRng, rngs::StdRng};

use super::{ParameterService, ServiceConfig};
use crate::{
    initialization::{ConstParamGen, ParamGen, RandErr, RandParamGen, ValuesParamGen},
    model::{Model, OptimizedModel},
    optimization::{Adam, GradientDescent, GradientDescentWithMomentum},
    storage::{ErrorBudget, ParameterStore},
};

/// Error returned when a `ServerSpec` can't be turned into a running service.
#[derive(Debug)]
pub enum BuildError {
    /// A distribution was given invalid parameters.
    Rand(RandErr),
    /// A parameter's initial values don't fill its shape.
    Shape { index: usize, err: ShapeErr },
    /// The service couldn't be started.
    Io(io::Error),
}

impl From<RandErr> for BuildError {
    fn from(value: RandErr) -> Self {
        Self::Rand(value)
    }
}

impl From<io::Error> for BuildError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rand(e) => write!(f, "build error: {e}"),
            Self::Shape { index, err } => write!(f, "build error: parameter {index}: {err}"),
            Self::Io(e) => write!(f, "build error: {e}"),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rand(e) => Some(e),
            Self::Shape { err, .. } => Some(err),
            Self::Io(e) => Some(e),
        }
    }
}

/// Resolves a `RandParamGen` for the given distribution and hands it to `callback`,
/// keeping the concrete generator type instead of boxing it.
///
/// # Arguments
/// * `rng` - A random number generator.
/// * `dist_spec` - A specification for a distribution.
/// * `callback` - The closure to call passing in the created parameter generator.
macro_rules! with_distribution {
    ($rng:expr, $dist_spec:expr, $callback:expr) => {
        match $dist_spec {
            DistributionSpec::Uniform { low, high } => {
                ($callback)(RandParamGen::uniform($rng, low, high)?)
            }
            DistributionSpec::UniformInclusive { low, high } => {
                ($callback)(RandParamGen::uniform_inclusive($rng, low, high)?)
            }
            DistributionSpec::XavierUniform { fan_in, fan_out } => {
                ($callback)(RandParamGen::xavier_uniform($rng, fan_in, fan_out)?)
            }
            DistributionSpec::LecunUniform { fan_in } => {
                ($callback)(RandParamGen::lecun_uniform($rng, fan_in)?)
            }
            DistributionSpec::Normal { mean, std_dev } => {
                ($callback)(RandParamGen::normal($rng, mean, std_dev)?)
            }
            DistributionSpec::Kaiming { fan_in } => {
                ($callback)(RandParamGen::kaiming($rng, fan_in)?)
            }
            DistributionSpec::Xavier { fan_in, fan_out } => {
                ($callback)(RandParamGen::xavier($rng, fan_in, fan_out)?)
            }
            DistributionSpec::Lecun { fan_in } => ($callback)(RandParamGen::lecun($rng, fan_in)?),
        }
    };
}

/// Builds `ParameterService`s given a specification.
#[derive(Debug, Default)]
pub struct ServerBuilder;

impl ServerBuilder {
    /// Creates a new `ServerBuilder`.
    ///
    /// # Returns
    /// A new `ServerBuilder` instance.
    pub fn new() -> Self {
        Self
    }

    /// Builds and starts a new `ParameterService` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification of the parameter server.
    ///
    /// # Returns
    /// The running service or a `BuildError` if `spec` is invalid or the service
    /// couldn't be started.
    pub fn build(&self, spec: &ServerSpec) -> Result<ParameterService, BuildError> {
        let store = self.build_store(spec)?;
        let service = ParameterService::start(&ServiceConfig::from(spec), store)?;
        Ok(service)
    }

    /// Builds the `ParameterStore` described by a spec, without serving it.
    ///
    /// # Arguments
    /// * `spec` - The specification of the parameter server.
    ///
    /// # Returns
    /// A new store or a `BuildError` if `spec` is invalid.
    pub fn build_store(&self, spec: &ServerSpec) -> Result<ParameterStore<Box<dyn Model>>, BuildError> {
        let model = self.build_model(spec)?;
        Ok(ParameterStore::new(model, ErrorBudget::new(spec.max_errors)))
    }

    /// Builds the model described by a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification of the parameter server.
    ///
    /// # Returns
    /// The initialized model or a `BuildError` if `spec` is invalid.
    pub fn build_model(&self, spec: &ServerSpec) -> Result<Box<dyn Model>, BuildError> {
        let rng = self.generate_rng(spec.seed);

        let params = spec
            .parameters
            .iter()
            .enumerate()
            .map(|(index, param)| self.resolve_param(Rc::clone(&rng), index, param))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.resolve_optimizer(spec.optimizer, params))
    }

    /// Generates a random number generator given (or not) a seed.
    ///
    /// # Arguments
    /// * `seed` - An optional seed for the rng.
    ///
    /// # Returns
    /// An clonable random number generator with interior mutability.
    fn generate_rng(&self, seed: Option<u64>) -> Rc<RefCell<StdRng>> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Rc::new(RefCell::new(rng))
    }

    /// Generates the initial value of a single parameter.
    ///
    /// # Arguments
    /// * `rng` - The rng shared by every random parameter.
    /// * `index` - The position of the parameter in the model.
    /// * `spec` - The specification of the parameter.
    ///
    /// # Returns
    /// The initial tensor or a `BuildError` if `spec` is invalid.
    fn resolve_param(
        &self,
        rng: Rc<RefCell<StdRng>>,
        index: usize,
        spec: &ParameterSpec,
    ) -> Result<Tensor, BuildError> {
        let shape = spec.shape.clone();

        let generated = match &spec.init {
            InitSpec::Const { value } => ConstParamGen::new(*value).generate(shape),
            InitSpec::Values { values } => ValuesParamGen::new(values.clone()).generate(shape),
            InitSpec::Rand { distribution } => {
                with_distribution!(rng, *distribution, |mut param_gen: RandParamGen<_, _>| {
                    param_gen.generate(shape)
                })
            }
        };

        generated.map_err(|err| BuildError::Shape { index, err })
    }

    /// Resolves the `Optimizer` of the model.
    ///
    /// # Arguments
    /// * `spec` - The specification of the optimizer.
    /// * `params` - The initial parameters.
    ///
    /// # Returns
    /// The model, with one optimizer per parameter.
    fn resolve_optimizer(&self, spec: OptimizerSpec, params: Vec<Tensor>) -> Box<dyn Model> {
        match spec {
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                let factory = |len| Adam::new(len, learning_rate, beta1, beta2, epsilon);
                Box::new(OptimizedModel::new(params, factory))
            }
            OptimizerSpec::GradientDescent { learning_rate } => {
                let factory = |_| GradientDescent::new(learning_rate);
                Box::new(OptimizedModel::new(params, factory))
            }
            OptimizerSpec::GradientDescentWithMomentum {
                learning_rate,
                momentum,
            } => {
                let factory = |len| GradientDescentWithMomentum::new(len, learning_rate, momentum);
                Box::new(OptimizedModel::new(params, factory))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use comms::GradientBatch;

    use super::*;

    fn spec(json: &str) -> ServerSpec {
        ServerSpec::from_json(json).unwrap()
    }

    #[test]
    fn builds_explicit_parameters() {
        let spec = spec(
            r#"{
                "parameters": [
                    { "init": { "const": { "value": 1.0 } } },
                    { "shape": [2], "init": { "values": { "values": [2.0, 3.0] } } }
                ],
                "optimizer": { "gradient_descent": { "learning_rate": 1.0 } }
            }"#,
        );

        let store = ServerBuilder::new().build_store(&spec).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.read()[0], Tensor::scalar(1.));
        assert_eq!(store.read()[1], Tensor::vector(vec![2., 3.]));

        let grads = GradientBatch::new(vec![Tensor::scalar(1.), Tensor::vector(vec![1., 1.])]);
        store.apply(grads).unwrap();
        assert_eq!(store.read()[1], Tensor::vector(vec![1., 2.]));
    }

    #[test]
    fn seeded_models_are_reproducible() {
        let json = r#"{
            "seed": 7,
            "parameters": [
                { "shape": [3, 2], "init": { "rand": { "distribution": { "xavier_uniform": { "fan_in": 3, "fan_out": 2 } } } } },
                { "shape": [2], "init": { "rand": { "distribution": { "normal": { "mean": 0.0, "std_dev": 1.0 } } } } }
            ],
            "optimizer": { "adam": { "learning_rate": 0.001, "beta1": 0.9, "beta2": 0.999, "epsilon": 1e-8 } }
        }"#;

        let builder = ServerBuilder::new();
        let first = builder.build_model(&spec(json)).unwrap();
        let second = builder.build_model(&spec(json)).unwrap();

        assert_eq!(first.state(), second.state());
        assert_eq!(first.parameters()[0].shape(), &[3, 2]);
        assert_ne!(first.parameters()[0], first.parameters()[1]);
    }

    #[test]
    fn rejects_values_that_dont_fill_the_shape() {
        let spec = spec(
            r#"{
                "parameters": [
                    { "init": { "const": { "value": 1.0 } } },
                    { "shape": [3], "init": { "values": { "values": [1.0] } } }
                ],
                "optimizer": { "gradient_descent": { "learning_rate": 1.0 } }
            }"#,
        );

        let Err(err) = ServerBuilder::new().build_model(&spec) else {
            panic!("the model should have been rejected");
        };
        assert!(matches!(err, BuildError::Shape { index: 1, .. }));
    }

    #[test]
    fn rejects_invalid_distributions() {
        let spec = spec(
            r#"{
                "parameters": [
                    { "shape": [2], "init": { "rand": { "distribution": { "uniform": { "low": 1.0, "high": 0.0 } } } } }
                ],
                "optimizer": { "gradient_descent_with_momentum": { "learning_rate": 0.1, "momentum": 0.9 } }
            }"#,
        );

        let Err(err) = ServerBuilder::new().build_model(&spec) else {
            panic!("the model should have been rejected");
        };
        assert!(matches!(err, BuildError::Rand(RandErr::Uniform(_))));
    }
}
