//! Integration tests for the flat storefront tables.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `SHELF_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use shelf_core::{MembershipTier, NewProduct, PaymentStatus};
use shelf_integration_tests::{new_customer, new_product, test_pool, unique};
use shelf_store::RepositoryError;
use shelf_store::db::{
    CartRepository, CollectionRepository, CustomerRepository, OrderRepository,
    ProductRepository, PromotionRepository,
};

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_membership_defaults_to_bronze() {
    let pool = test_pool().await;
    let customers = CustomerRepository::new(&pool);

    let customer = customers.create(&new_customer()).await.unwrap();
    assert_eq!(customer.membership, MembershipTier::Bronze);

    // Rows inserted without a membership get the column default.
    let email = format!("{}@example.com", unique("raw"));
    sqlx::query(
        "INSERT INTO store.customer (first_name, last_name, email) VALUES ('Raw', 'Row', $1)",
    )
    .bind(&email)
    .execute(&pool)
    .await
    .unwrap();
    let raw = customers
        .get_by_email(&email.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(raw.membership, MembershipTier::Bronze);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_duplicate_email_is_conflict() {
    let pool = test_pool().await;
    let customers = CustomerRepository::new(&pool);
    let customer = new_customer();

    customers.create(&customer).await.unwrap();
    let err = customers.create(&customer).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_order_lifecycle() {
    let pool = test_pool().await;
    let customer = CustomerRepository::new(&pool)
        .create(&new_customer())
        .await
        .unwrap();
    let product = ProductRepository::new(&pool)
        .create(&new_product(2000))
        .await
        .unwrap();
    let orders = OrderRepository::new(&pool);

    let order = orders.create(customer.id, None).await.unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Failed);

    let order = orders
        .set_payment_status(order.id, PaymentStatus::Complete)
        .await
        .unwrap();
    assert_eq!(order.payment_status, PaymentStatus::Complete);

    orders
        .add_item(order.id, product.id, 3, product.price)
        .await
        .unwrap();
    let err = orders
        .add_item(order.id, product.id, 0, product.price)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidInput(_)));
    assert_eq!(orders.items(order.id).await.unwrap().len(), 1);
    assert_eq!(orders.for_customer(customer.id).await.unwrap(), vec![order.clone()]);

    // Ordered products and customers with orders are protected.
    let err = ProductRepository::new(&pool)
        .delete(product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    let err = CustomerRepository::new(&pool)
        .delete(customer.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    assert!(orders.delete(order.id).await.unwrap());
    assert!(orders.items(order.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_cart_rejects_same_product_twice() {
    let pool = test_pool().await;
    let carts = CartRepository::new(&pool);
    let product = ProductRepository::new(&pool)
        .create(&new_product(300))
        .await
        .unwrap();
    let cart = carts.create().await.unwrap();

    carts.add_item(cart.id, product.id, 1).await.unwrap();
    let err = carts.add_item(cart.id, product.id, 2).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(carts.items(cart.id).await.unwrap().len(), 1);

    assert!(carts.delete(cart.id).await.unwrap());
    assert!(carts.get(cart.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_collections_and_promotions() {
    let pool = test_pool().await;
    let collections = CollectionRepository::new(&pool);
    let products = ProductRepository::new(&pool);
    let promotions = PromotionRepository::new(&pool);

    let collection = collections.create(&unique("collection")).await.unwrap();
    let product = products
        .create(&NewProduct {
            collection_id: Some(collection.id),
            ..new_product(450)
        })
        .await
        .unwrap();
    let listed = products.list(Some(collection.id)).await.unwrap();
    assert_eq!(listed, vec![product.clone()]);

    let collection = collections
        .set_featured_product(collection.id, Some(product.id))
        .await
        .unwrap();
    assert_eq!(collection.featured_product_id, Some(product.id));

    let promotion = promotions.create("Half off", 0.5).await.unwrap();
    products.add_promotion(product.id, promotion.id).await.unwrap();
    let err = products
        .add_promotion(product.id, promotion.id)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(products.promotions(product.id).await.unwrap(), vec![promotion.clone()]);

    // A collection with products cannot be deleted.
    let err = collections.delete(collection.id).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    assert!(products.delete(product.id).await.unwrap());
    assert!(promotions.delete(promotion.id).await.unwrap());
    assert!(collections.delete(collection.id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_unknown_collection_is_not_found() {
    let pool = test_pool().await;
    let err = ProductRepository::new(&pool)
        .create(&NewProduct {
            collection_id: Some(i32::MAX.into()),
            ..new_product(100)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}
