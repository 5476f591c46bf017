pub mod auth;

pub use auth::{JwtAuth, UserId};
