//! Shelf Store - persistence and generic reference resolution.
//!
//! # Overview
//!
//! Tags and likes point at their targets through an
//! [`ObjectRef`](shelf_core::ObjectRef) (content type plus id) instead of a
//! typed foreign key. This crate turns such a reference back into a record:
//!
//! - [`registry`] - an immutable [`TypeRegistry`] mapping content types to
//!   [`TargetTable`] handles, built once at startup
//! - [`resolver`] - the [`Resolver`] that dereferences `ObjectRef`s and builds
//!   them from records
//! - [`relations`] - the [`RelationStore`] trait for tags and likes
//! - [`db`] - `PostgreSQL` repositories for every table
//! - [`memory`] - an in-process store implementing the same seams
//!
//! # Integrity
//!
//! A generic reference is not checked when it is created. Deleting a record
//! through a repository prunes the tags and likes that point at it; a
//! reference left dangling by any other path resolves to
//! [`ResolveError::NotFound`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod memory;
pub mod registry;
pub mod relations;
pub mod resolver;

pub use config::{ConfigError, StoreConfig};
pub use db::RepositoryError;
pub use memory::MemoryStore;
pub use registry::{TargetTable, TypeRegistry, TypeRegistryBuilder};
pub use relations::RelationStore;
pub use resolver::{ResolveError, Resolver};
