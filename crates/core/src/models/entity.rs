//! The closed set of records a generic reference can point at.

use serde::{Deserialize, Serialize};

use super::{
    Address, Cart, CartItem, Collection, Customer, Order, OrderItem, Product, Promotion, Tag, User,
};
use crate::{ContentType, ObjectRef};

/// A record stored in its own table with an `i32` primary key.
pub trait Model: Clone + Send + Sync + 'static + Into<Entity> {
    /// Content type naming this record's table.
    const CONTENT_TYPE: ContentType;

    /// Human readable name of the record type.
    const VERBOSE_NAME: &'static str;

    /// Primary key.
    fn pk(&self) -> i32;

    /// Return a copy with the primary key replaced.
    #[must_use]
    fn with_pk(self, pk: i32) -> Self;

    /// Unwrap an [`Entity`] of this type.
    fn from_entity(entity: Entity) -> Option<Self>;

    /// Reference to this record.
    fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(Self::CONTENT_TYPE, self.pk())
    }
}

/// Any record that can be the target of a tag or a like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Entity {
    Product(Product),
    Collection(Collection),
    Promotion(Promotion),
    Customer(Customer),
    Address(Address),
    Order(Order),
    OrderItem(OrderItem),
    Cart(Cart),
    CartItem(CartItem),
    User(User),
    Tag(Tag),
}

macro_rules! models {
    ($($variant:ident => ($id:ident, $app:literal, $model:literal, $verbose:literal)),+ $(,)?) => {
        $(
            impl Model for $variant {
                const CONTENT_TYPE: ContentType = ContentType::from_static($app, $model);
                const VERBOSE_NAME: &'static str = $verbose;

                fn pk(&self) -> i32 {
                    self.id.as_i32()
                }

                fn with_pk(self, pk: i32) -> Self {
                    Self {
                        id: crate::$id::new(pk),
                        ..self
                    }
                }

                fn from_entity(entity: Entity) -> Option<Self> {
                    match entity {
                        Entity::$variant(record) => Some(record),
                        _ => None,
                    }
                }
            }

            impl From<$variant> for Entity {
                fn from(record: $variant) -> Self {
                    Self::$variant(record)
                }
            }
        )+

        impl Entity {
            /// Content types of every record type, in declaration order.
            pub const CONTENT_TYPES: &'static [ContentType] = &[
                $(<$variant as Model>::CONTENT_TYPE),+
            ];

            /// Content type of the wrapped record.
            #[must_use]
            pub const fn content_type(&self) -> ContentType {
                match self {
                    $(Self::$variant(_) => <$variant as Model>::CONTENT_TYPE),+
                }
            }

            /// Human readable name of the wrapped record's type.
            #[must_use]
            pub const fn verbose_name(&self) -> &'static str {
                match self {
                    $(Self::$variant(_) => <$variant as Model>::VERBOSE_NAME),+
                }
            }

            /// Primary key of the wrapped record.
            #[must_use]
            pub fn pk(&self) -> i32 {
                match self {
                    $(Self::$variant(record) => record.pk()),+
                }
            }

            /// Return the same record with its primary key replaced.
            #[must_use]
            pub fn with_pk(self, pk: i32) -> Self {
                match self {
                    $(Self::$variant(record) => Self::$variant(record.with_pk(pk))),+
                }
            }
        }
    };
}

models! {
    Product => (ProductId, "store", "product", "Product"),
    Collection => (CollectionId, "store", "collection", "Collection"),
    Promotion => (PromotionId, "store", "promotion", "Promotion"),
    Customer => (CustomerId, "store", "customer", "Customer"),
    Address => (AddressId, "store", "address", "Address"),
    Order => (OrderId, "store", "order", "Order"),
    OrderItem => (OrderItemId, "store", "order_item", "Order item"),
    Cart => (CartId, "store", "cart", "Cart"),
    CartItem => (CartItemId, "store", "cart_item", "Cart item"),
    User => (UserId, "auth", "user", "User"),
    Tag => (TagId, "tags", "tag", "Tag"),
}

impl Entity {
    /// Reference to the wrapped record.
    #[must_use]
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.content_type(), self.pk())
    }

    /// Unwrap into a concrete record type.
    #[must_use]
    pub fn into_model<M: Model>(self) -> Option<M> {
        M::from_entity(self)
    }
}
