//! Shelf Core - Shared types library.
//!
//! This crate provides the types used across all Shelf components:
//! - `store` - `PostgreSQL` persistence, the type registry and the resolver
//! - `cli` - Command-line tools for migrations, seeding and tagging
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access.
//! Storage backends live in `shelf-store` and plug into the types defined here.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, statuses and generic
//!   object references
//! - [`models`] - Storefront records (products, customers, orders, carts) and the
//!   generic tag/like relations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;

pub use models::*;
pub use types::*;
