//! Domain models for the API.
//!
//! These are validated domain objects, separate from the database row types
//! in [`crate::db`] and the wire types in `catalog_core::dto`.

pub mod product;
pub mod user;

pub use product::{ProductChanges, ProductFields};
pub use user::{NewUser, User};
