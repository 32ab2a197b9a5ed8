//! Core types for Shelf.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod content_type;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use content_type::{ContentType, ContentTypeError, ObjectRef};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use status::*;
