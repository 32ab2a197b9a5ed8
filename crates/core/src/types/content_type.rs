//! Generic object references.
//!
//! A [`ContentType`] names a table (`app_label.model`, e.g. `store.product`)
//! and an [`ObjectRef`] pairs it with a row id. Tags and likes store an
//! `ObjectRef` instead of a typed foreign key so they can point at any table.
//!
//! Nothing here checks that the referenced row exists. That happens when the
//! reference is resolved through a type registry in `shelf-store`.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`ContentType`] or [`ObjectRef`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeError {
    /// The input string is empty.
    #[error("content type cannot be empty")]
    Empty,
    /// The input is not of the form `app_label.model`.
    #[error("content type must look like `app_label.model`, got {0:?}")]
    MissingSeparator(String),
    /// One of the two segments has invalid characters.
    #[error("invalid content type segment {0:?}")]
    InvalidSegment(String),
    /// The object id part of an `ObjectRef` is not a valid id.
    #[error("invalid object id {0:?}")]
    InvalidObjectId(String),
}

/// Identifies the table a generic reference points into.
///
/// Segments are lower case ASCII identifiers. Statically known content types
/// are built with [`ContentType::from_static`] and compare equal to parsed
/// ones.
///
/// ```
/// use shelf_core::ContentType;
///
/// const PRODUCT: ContentType = ContentType::from_static("store", "product");
///
/// let parsed: ContentType = "store.product".parse().unwrap();
/// assert_eq!(parsed, PRODUCT);
/// assert_eq!(PRODUCT.to_string(), "store.product");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentType {
    app_label: Cow<'static, str>,
    model: Cow<'static, str>,
}

impl ContentType {
    /// Create a content type from static segments.
    ///
    /// Segments are not validated; use [`ContentType::parse`] for input.
    #[must_use]
    pub const fn from_static(app_label: &'static str, model: &'static str) -> Self {
        Self {
            app_label: Cow::Borrowed(app_label),
            model: Cow::Borrowed(model),
        }
    }

    /// Parse an `app_label.model` string.
    ///
    /// # Errors
    ///
    /// Returns [`ContentTypeError`] if the string is empty, has no `.`
    /// separator, or either segment is not a lower case identifier.
    pub fn parse(s: &str) -> Result<Self, ContentTypeError> {
        if s.is_empty() {
            return Err(ContentTypeError::Empty);
        }

        let (app_label, model) = s
            .split_once('.')
            .ok_or_else(|| ContentTypeError::MissingSeparator(s.to_owned()))?;

        for segment in [app_label, model] {
            if !is_identifier(segment) {
                return Err(ContentTypeError::InvalidSegment(segment.to_owned()));
            }
        }

        Ok(Self {
            app_label: Cow::Owned(app_label.to_owned()),
            model: Cow::Owned(model.to_owned()),
        })
    }

    /// The application label, e.g. `store`.
    #[must_use]
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    /// The model name, e.g. `product`.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model)
    }
}

impl FromStr for ContentType {
    type Err = ContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ContentType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ContentType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ContentType {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.to_string(), buf)
    }
}

/// A reference to a row in any table: content type plus primary key.
///
/// The string form is `app_label.model#id`:
///
/// ```
/// use shelf_core::{ContentType, ObjectRef};
///
/// let target: ObjectRef = "store.product#7".parse().unwrap();
/// assert_eq!(target.content_type, ContentType::from_static("store", "product"));
/// assert_eq!(target.object_id, 7);
/// assert_eq!(target.to_string(), "store.product#7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ObjectRef {
    /// Table the referenced row lives in.
    pub content_type: ContentType,
    /// Primary key of the referenced row.
    pub object_id: i32,
}

impl ObjectRef {
    /// Create a reference from its parts.
    #[must_use]
    pub const fn new(content_type: ContentType, object_id: i32) -> Self {
        Self {
            content_type,
            object_id,
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.content_type, self.object_id)
    }
}

impl FromStr for ObjectRef {
    type Err = ContentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (content_type, object_id) = s
            .split_once('#')
            .ok_or_else(|| ContentTypeError::InvalidObjectId(s.to_owned()))?;

        let object_id = object_id
            .parse::<i32>()
            .ok()
            .filter(|id| *id >= 0)
            .ok_or_else(|| ContentTypeError::InvalidObjectId(object_id.to_owned()))?;

        Ok(Self::new(content_type.parse()?, object_id))
    }
}
