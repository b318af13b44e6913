pub mod error;
pub mod models;

pub use error::ValidationError;
pub use models::*;
