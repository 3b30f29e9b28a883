//! Catalog Core - Shared types library.
//!
//! This crate provides the types shared by every catalog component:
//! - `api` - The REST server
//! - `client` - The typed REST client and view models
//! - `cli` - Command-line tools for migrations and catalog management
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, categories and images
//! - [`dto`] - JSON request and response bodies exchanged over the REST API

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dto;
pub mod types;

pub use types::*;
