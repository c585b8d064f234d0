mod budget;
mod error;
mod store;

pub use budget::{ErrorBudget, Escalation};
pub use error::{ApplyFailure, UpdateError};
pub use store::ParameterStore;
