//! Seed the database from a YAML file.
//!
//! # Usage
//!
//! ```bash
//! shelf-cli seed demos/catalog.yaml
//! ```
//!
//! # File format
//!
//! ```yaml
//! users: [ada, grace]
//! collections:
//!   - title: Kitchen
//!     products:
//!       - title: Mug
//!         price: "12.50"
//!         inventory: 10
//! promotions:
//!   - description: Summer sale
//!     discount: 0.15
//!     products: [Mug]
//! customers:
//!   - first_name: Ada
//!     last_name: Lovelace
//!     email: ada@example.com
//!     membership: gold
//!     address: { street: 1 Main Street, city: London }
//! tags:
//!   - label: sale
//!     products: [Mug]
//! likes:
//!   - user: ada
//!     product: Mug
//! ```
//!
//! Products are referred to by title everywhere else in the file.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use shelf_core::{Model, NewCustomer, NewProduct, Product, Tag};
use shelf_store::RelationStore;
use shelf_store::db::{
    CollectionRepository, CustomerRepository, PgRelations, ProductRepository,
    PromotionRepository, UserRepository,
};

use super::connect;
use super::relations::find_or_create_tag;

/// Parsed seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedFile {
    pub users: Vec<String>,
    pub collections: Vec<SeedCollection>,
    /// Products outside any collection.
    pub products: Vec<NewProduct>,
    pub promotions: Vec<SeedPromotion>,
    pub customers: Vec<SeedCustomer>,
    pub tags: Vec<SeedTag>,
    pub likes: Vec<SeedLike>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCollection {
    pub title: String,
    #[serde(default)]
    pub products: Vec<NewProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedPromotion {
    pub description: String,
    pub discount: f64,
    #[serde(default)]
    pub products: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCustomer {
    #[serde(flatten)]
    pub customer: NewCustomer,
    #[serde(default)]
    pub address: Option<SeedAddress>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAddress {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedTag {
    pub label: String,
    #[serde(default)]
    pub products: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedLike {
    pub user: String,
    pub product: String,
}

/// Counts of what a seed run inserted.
#[derive(Debug, Default)]
pub struct SeedSummary {
    pub users: usize,
    pub collections: usize,
    pub products: usize,
    pub promotions: usize,
    pub customers: usize,
    pub tagged_items: usize,
    pub likes: usize,
}

impl SeedFile {
    fn product_titles(&self) -> impl Iterator<Item = &str> {
        self.collections
            .iter()
            .flat_map(|c| &c.products)
            .chain(&self.products)
            .map(|p| p.title.as_str())
    }

    /// Check cross references inside the file.
    ///
    /// Returns one message per problem; an empty list means the file can be
    /// loaded.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut titles = HashSet::new();
        for title in self.product_titles() {
            if !titles.insert(title) {
                errors.push(format!("duplicate product title {title:?}"));
            }
        }

        let mut users = HashSet::new();
        for user in &self.users {
            if user.trim().is_empty() {
                errors.push("empty username".to_owned());
            } else if !users.insert(user.trim()) {
                errors.push(format!("duplicate user {user:?}"));
            }
        }

        let mut emails = HashSet::new();
        for customer in &self.customers {
            if !emails.insert(customer.customer.email.as_str()) {
                errors.push(format!("duplicate customer email {}", customer.customer.email));
            }
        }

        for promotion in &self.promotions {
            if !promotion.discount.is_finite() {
                errors.push(format!("promotion {:?} has an invalid discount", promotion.description));
            }
            let mut listed = HashSet::new();
            for title in &promotion.products {
                if !titles.contains(title.as_str()) {
                    errors.push(format!(
                        "promotion {:?} refers to unknown product {title:?}",
                        promotion.description
                    ));
                } else if !listed.insert(title.as_str()) {
                    errors.push(format!(
                        "promotion {:?} lists {title:?} more than once",
                        promotion.description
                    ));
                }
            }
        }

        let mut labels = HashSet::new();
        for tag in &self.tags {
            match Tag::normalize_label(&tag.label) {
                Ok(label) => {
                    if !labels.insert(label) {
                        errors.push(format!("duplicate tag {:?}", tag.label));
                    }
                }
                Err(e) => errors.push(format!("tag {:?}: {e}", tag.label)),
            }
            let mut listed = HashSet::new();
            for title in &tag.products {
                if !titles.contains(title.as_str()) {
                    errors.push(format!("tag {:?} refers to unknown product {title:?}", tag.label));
                } else if !listed.insert(title.as_str()) {
                    errors.push(format!("tag {:?} lists {title:?} more than once", tag.label));
                }
            }
        }

        let mut likes = HashSet::new();
        for like in &self.likes {
            if !users.contains(like.user.trim()) {
                errors.push(format!("like by unknown user {:?}", like.user));
            }
            if !titles.contains(like.product.as_str()) {
                errors.push(format!("like of unknown product {:?}", like.product));
            }
            if !likes.insert((like.user.trim(), like.product.as_str())) {
                errors.push(format!("{} likes {:?} more than once", like.user, like.product));
            }
        }

        errors
    }
}

/// Load `file_path` into the database.
///
/// The whole file is validated before connecting.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails.
pub async fn run(file_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!(path = %file_path.display(), "Loading seed file");

    let content = tokio::fs::read_to_string(file_path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Seed file validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = connect().await?;
    let summary = load(&pool, seed).await?;

    info!("Seeding complete!");
    info!("  Users: {}", summary.users);
    info!("  Collections: {}", summary.collections);
    info!("  Products: {}", summary.products);
    info!("  Promotions: {}", summary.promotions);
    info!("  Customers: {}", summary.customers);
    info!("  Tagged items: {}", summary.tagged_items);
    info!("  Likes: {}", summary.likes);
    Ok(())
}

async fn load(pool: &sqlx::PgPool, seed: SeedFile) -> Result<SeedSummary, shelf_store::RepositoryError> {
    let mut summary = SeedSummary::default();
    let products_repo = ProductRepository::new(pool);
    let relations = PgRelations::new(pool.clone());

    let mut users = HashMap::new();
    let user_repo = UserRepository::new(pool);
    for username in &seed.users {
        let user = user_repo.create(username).await?;
        users.insert(user.username.clone(), user);
        summary.users += 1;
    }

    let mut products: HashMap<String, Product> = HashMap::new();
    let collection_repo = CollectionRepository::new(pool);
    for collection in seed.collections {
        let created = collection_repo.create(&collection.title).await?;
        summary.collections += 1;
        for product in collection.products {
            let product = products_repo
                .create(&NewProduct {
                    collection_id: Some(created.id),
                    ..product
                })
                .await?;
            products.insert(product.title.clone(), product);
            summary.products += 1;
        }
    }
    for product in &seed.products {
        let product = products_repo.create(product).await?;
        products.insert(product.title.clone(), product);
        summary.products += 1;
    }

    let promotion_repo = PromotionRepository::new(pool);
    for promotion in &seed.promotions {
        let created = promotion_repo
            .create(&promotion.description, promotion.discount)
            .await?;
        for title in &promotion.products {
            if let Some(product) = products.get(title) {
                products_repo.add_promotion(product.id, created.id).await?;
            }
        }
        summary.promotions += 1;
    }

    let customer_repo = CustomerRepository::new(pool);
    for customer in &seed.customers {
        let created = customer_repo.create(&customer.customer).await?;
        if let Some(address) = &customer.address {
            customer_repo
                .set_address(created.id, &address.street, &address.city)
                .await?;
        }
        summary.customers += 1;
    }

    for tag in &seed.tags {
        let created = find_or_create_tag(&relations, &tag.label).await?;
        for title in &tag.products {
            if let Some(product) = products.get(title) {
                relations.tag(created.id, &product.object_ref()).await?;
                summary.tagged_items += 1;
            }
        }
    }

    for like in &seed.likes {
        if let (Some(user), Some(product)) = (users.get(like.user.trim()), products.get(&like.product)) {
            relations.like(user.id, &product.object_ref()).await?;
            summary.likes += 1;
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shelf_core::MembershipTier;

    use super::*;

    const CATALOG: &str = r#"
users: [ada, grace]
collections:
  - title: Kitchen
    products:
      - title: Mug
        price: "12.50"
        inventory: 10
      - title: Teapot
        price: "30.00"
products:
  - title: Gift card
    price: "25.00"
promotions:
  - description: Summer sale
    discount: 0.15
    products: [Mug]
customers:
  - first_name: Ada
    last_name: Lovelace
    email: ada@example.com
    membership: gold
    address: { street: 1 Main Street, city: London }
  - first_name: Grace
    last_name: Hopper
    email: grace@example.com
tags:
  - label: sale
    products: [Mug, Gift card]
likes:
  - user: ada
    product: Teapot
"#;

    #[test]
    fn test_parse_catalog() {
        let seed: SeedFile = serde_yaml::from_str(CATALOG).unwrap();
        assert!(seed.validate().is_empty(), "{:?}", seed.validate());

        assert_eq!(seed.users, ["ada", "grace"]);
        assert_eq!(seed.collections.len(), 1);
        assert_eq!(seed.product_titles().count(), 3);
        assert_eq!(seed.customers.first().unwrap().customer.membership, MembershipTier::Gold);
        assert_eq!(seed.customers.get(1).unwrap().customer.membership, MembershipTier::Bronze);
        assert!(seed.customers.get(1).unwrap().address.is_none());
        assert_eq!(
            seed.collections.first().unwrap().products.get(1).unwrap().inventory,
            0
        );
    }

    #[test]
    fn test_empty_file_is_valid() {
        let seed: SeedFile = serde_yaml::from_str("{}").unwrap();
        assert!(seed.validate().is_empty());
    }

    #[test]
    fn test_unknown_references_are_reported() {
        let seed: SeedFile = serde_yaml::from_str(
            r#"
users: [ada]
products:
  - title: Mug
    price: "1.00"
tags:
  - label: "  "
    products: [Cup]
likes:
  - user: bob
    product: Mug
  - user: ada
    product: Mug
  - user: ada
    product: Mug
"#,
        )
        .unwrap();

        let errors = seed.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("unknown product \"Cup\"")));
        assert!(errors.iter().any(|e| e.contains("unknown user \"bob\"")));
        assert!(errors.iter().any(|e| e.contains("more than once")));
    }

    #[test]
    fn test_repeated_tag_entries_are_reported() {
        let seed: SeedFile = serde_yaml::from_str(
            r#"
products:
  - title: Mug
    price: "1.00"
promotions:
  - description: Clearance
    discount: 0.5
    products: [Mug, Mug]
tags:
  - label: sale
    products: [Mug, Mug]
  - label: " sale "
"#,
        )
        .unwrap();

        let errors = seed.validate();
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("duplicate tag \" sale \"")));
        assert!(errors.iter().any(|e| e.starts_with("tag \"sale\" lists \"Mug\"")));
        assert!(errors.iter().any(|e| e.starts_with("promotion \"Clearance\" lists")));
    }

    #[test]
    fn test_invalid_price_is_rejected() {
        let result: Result<SeedFile, _> = serde_yaml::from_str(
            r#"
products:
  - title: Mug
    price: "-1.00"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let result: Result<SeedFile, _> = serde_yaml::from_str("orders: []");
        assert!(result.is_err());
    }
}
