use comms::specs::server::{DEFAULT_PORT, ServerSpec};

/// Runtime settings of a `ParameterService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// The port to bind on every interface, `0` picks a free one.
    pub port: u16,
    /// Whether requests go through the reader-writer lock.
    ///
    /// Without it readers and writers aren't ordered against each other and queued
    /// writers get no preference over new readers. Each update still steps the model
    /// exactly once with its own gradients and a race is never counted as a failure.
    pub acquire_lock: bool,
    /// Whether exhausting the error budget stops the service.
    pub shutdown_on_fatal: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            acquire_lock: false,
            shutdown_on_fatal: true,
        }
    }
}

impl From<&ServerSpec> for ServiceConfig {
    fn from(spec: &ServerSpec) -> Self {
        Self {
            port: spec.port,
            acquire_lock: spec.acquire_lock,
            shutdown_on_fatal: spec.shutdown_on_fatal,
        }
    }
}
