mod address;
mod builder;
mod config;
mod context;
mod handlers;
mod lifecycle;
mod signal;

pub use address::determine_master;
pub use builder::{BuildError, ServerBuilder};
pub use config::ServiceConfig;
pub use context::ServiceContext;
pub use handlers::{SERVICE_NAME, UPDATE_COMPLETED, router};
pub use lifecycle::ParameterService;
pub use signal::ShutdownSignal;
