//! Storefront records.
//!
//! Flat records mirror one table each. [`Entity`] wraps any of them so that a
//! generic [`ObjectRef`](crate::ObjectRef) can be resolved to a concrete row
//! without knowing its type up front.

mod entity;

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod relation;

pub use cart::{Cart, CartItem};
pub use catalog::{Collection, NewProduct, Product, Promotion};
pub use customer::{Address, Customer, NewCustomer};
pub use entity::{Entity, Model};
pub use order::{Order, OrderItem};
pub use relation::{LikedItem, Tag, TagLabelError, TaggedItem, User};
