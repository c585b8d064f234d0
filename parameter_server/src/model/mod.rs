mod error;
mod model;
mod optimized;

pub use error::{ModelError, Result};
pub use model::Model;
pub use optimized::OptimizedModel;
