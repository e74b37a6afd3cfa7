//! # PayWatch Core
//!
//! Domain layer for the PayWatch backend: entities, error taxonomy,
//! repository interfaces and the transaction verification pipeline that
//! turns a classifier verdict into an approved transaction or a one-time
//! code challenge.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
