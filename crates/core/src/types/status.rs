//! Static choice enumerations used by storefront records.
//!
//! Both enums map to `PostgreSQL` enum types in the `store` schema. Each
//! variant also has a single-letter code, which is the compact form used in
//! seed files and exports.

use serde::{Deserialize, Serialize};

/// Customer membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "store.membership_tier", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    #[default]
    Bronze,
    Silver,
    Gold,
}

impl MembershipTier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 3] = [Self::Bronze, Self::Silver, Self::Gold];

    /// Single-letter code (`B`, `S`, `G`).
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Bronze => 'B',
            Self::Silver => 'S',
            Self::Gold => 'G',
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }
}

impl std::fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for MembershipTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" | "bronze" => Ok(Self::Bronze),
            "S" | "silver" => Ok(Self::Silver),
            "G" | "gold" => Ok(Self::Gold),
            _ => Err(format!("invalid membership tier: {s}")),
        }
    }
}

/// Payment status of an order.
///
/// New orders start out as [`PaymentStatus::Failed`] until a payment is
/// recorded against them, matching the column default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "store.payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Complete,
    #[default]
    Failed,
}

impl PaymentStatus {
    /// Single-letter code (`P`, `C`, `F`).
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Pending => 'P',
            Self::Complete => 'C',
            Self::Failed => 'F',
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "P" | "pending" => Ok(Self::Pending),
            "C" | "complete" => Ok(Self::Complete),
            "F" | "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}
