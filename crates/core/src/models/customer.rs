//! Customers and their postal address.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{AddressId, CustomerId, Email, MembershipTier};

/// A storefront customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all customers.
    pub email: Email,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    pub membership: MembershipTier,
}

impl Customer {
    /// First and last name separated by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl std::fmt::Display for Customer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Parameters for creating a customer.
///
/// `membership` falls back to [`MembershipTier::Bronze`] when omitted, both
/// here and in seed files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub membership: MembershipTier,
}

impl NewCustomer {
    /// Create customer parameters with the default membership tier.
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: Email,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email,
            phone: phone.into(),
            birth_date: None,
            membership: MembershipTier::default(),
        }
    }

    /// Set the membership tier.
    #[must_use]
    pub const fn with_membership(mut self, membership: MembershipTier) -> Self {
        self.membership = membership;
        self
    }

    /// Materialize the customer with a primary key.
    #[must_use]
    pub fn build(self, id: CustomerId) -> Customer {
        Customer {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            birth_date: self.birth_date,
            membership: self.membership,
        }
    }
}

/// A customer's postal address. Each customer has at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Address {
    pub id: AddressId,
    pub customer_id: CustomerId,
    pub street: String,
    pub city: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::parse("grace@example.com").unwrap()
    }

    #[test]
    fn test_new_customer_defaults_to_bronze() {
        let customer = NewCustomer::new("Grace", "Hopper", email(), "555-0100");
        assert_eq!(customer.membership, MembershipTier::Bronze);
        assert_eq!(
            customer.build(CustomerId::new(1)).membership,
            MembershipTier::Bronze
        );
    }

    #[test]
    fn test_missing_membership_deserializes_as_bronze() {
        let customer: NewCustomer = serde_json::from_str(
            r#"{"first_name":"Grace","last_name":"Hopper","email":"grace@example.com"}"#,
        )
        .unwrap();
        assert_eq!(customer.membership, MembershipTier::Bronze);
        assert!(customer.phone.is_empty());
    }

    #[test]
    fn test_display_is_full_name() {
        let customer = NewCustomer::new("Grace", "Hopper", email(), "")
            .with_membership(MembershipTier::Gold)
            .build(CustomerId::new(2));
        assert_eq!(customer.to_string(), "Grace Hopper");
        assert_eq!(customer.full_name(), customer.to_string());
    }
}
