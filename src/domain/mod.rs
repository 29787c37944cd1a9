pub mod entities;
pub mod errors;
pub mod ports;
pub mod validation;

pub use entities::*;
pub use errors::{DomainError, Result};
