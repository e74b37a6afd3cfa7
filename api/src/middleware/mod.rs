pub mod auth;
pub mod cors;

pub use auth::{AuthContext, Claims, JwtAuth, REVIEWER_ROLE};
pub use cors::create_cors;
