//! Business logic between the HTTP handlers and the store.
//!
//! Services borrow what they need from [`crate::state::AppState`] for the
//! duration of one request.

pub mod auth;
pub mod products;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use products::{ProductError, ProductService};
pub use token::{Claims, TokenError, TokenService};
