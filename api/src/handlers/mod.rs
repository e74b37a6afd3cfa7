//! Shared handler helpers

pub mod error;

pub use error::{error_response, handle_domain_error, json_error_handler, path_error_handler, query_error_handler};
