use serde::{Deserialize, Serialize};

/// The port the parameter server listens on when none is given.
pub const DEFAULT_PORT: u16 = 3000;

/// The amount of failed updates tolerated before the server gives up.
pub const DEFAULT_MAX_ERRORS: usize = 10;

/// The specification for the `Distribution` trait.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionSpec {
    Uniform { low: f32, high: f32 },
    UniformInclusive { low: f32, high: f32 },
    XavierUniform { fan_in: usize, fan_out: usize },
    LecunUniform { fan_in: usize },
    Normal { mean: f32, std_dev: f32 },
    Kaiming { fan_in: usize },
    Xavier { fan_in: usize, fan_out: usize },
    Lecun { fan_in: usize },
}

/// How the initial values of a single parameter are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Const { value: f32 },
    Values { values: Vec<f32> },
    Rand { distribution: DistributionSpec },
}

/// A single learnable parameter of the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(default)]
    pub shape: Vec<usize>,
    pub init: InitSpec,
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
    GradientDescentWithMomentum {
        learning_rate: f32,
        momentum: f32,
    },
}

/// The specification for a parameter server deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSpec {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub acquire_lock: bool,
    #[serde(default = "default_max_errors")]
    pub max_errors: usize,
    #[serde(default = "default_shutdown_on_fatal")]
    pub shutdown_on_fatal: bool,
    pub seed: Option<u64>,
    pub parameters: Vec<ParameterSpec>,
    pub optimizer: OptimizerSpec,
}

impl ServerSpec {
    /// Parses a `ServerSpec` out of a json document.
    ///
    /// # Arguments
    /// * `json` - The raw json text.
    ///
    /// # Returns
    /// The parsed spec or the json error.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_errors() -> usize {
    DEFAULT_MAX_ERRORS
}

fn default_shutdown_on_fatal() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_spec_uses_defaults() {
        let spec = ServerSpec::from_json(
            r#"{
                "parameters": [{ "init": { "const": { "value": 1.0 } } }],
                "optimizer": { "gradient_descent": { "learning_rate": 0.1 } }
            }"#,
        )
        .unwrap();

        assert_eq!(spec.port, DEFAULT_PORT);
        assert!(!spec.acquire_lock);
        assert_eq!(spec.max_errors, DEFAULT_MAX_ERRORS);
        assert!(spec.shutdown_on_fatal);
        assert_eq!(spec.seed, None);
        assert!(spec.parameters[0].shape.is_empty());
    }

    #[test]
    fn full_spec() {
        let spec = ServerSpec::from_json(
            r#"{
                "port": 4000,
                "acquire_lock": true,
                "max_errors": 3,
                "shutdown_on_fatal": false,
                "seed": 42,
                "parameters": [
                    { "shape": [2, 3], "init": { "rand": { "distribution": { "xavier_uniform": { "fan_in": 3, "fan_out": 2 } } } } },
                    { "shape": [2], "init": { "values": { "values": [0.5, -0.5] } } }
                ],
                "optimizer": { "adam": { "learning_rate": 0.001, "beta1": 0.9, "beta2": 0.999, "epsilon": 1e-8 } }
            }"#,
        )
        .unwrap();

        assert_eq!(spec.port, 4000);
        assert!(spec.acquire_lock);
        assert_eq!(spec.parameters.len(), 2);
        assert_eq!(
            spec.parameters[0].init,
            InitSpec::Rand {
                distribution: DistributionSpec::XavierUniform { fan_in: 3, fan_out: 2 }
            }
        );
        assert!(matches!(spec.optimizer, OptimizerSpec::Adam { .. }));
    }
}
