pub mod calculations;
pub mod models;

pub use calculations::{Estimate, Estimator};
pub use models::*;
