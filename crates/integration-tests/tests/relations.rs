//! Integration tests for tags and likes in `PostgreSQL`.
//!
//! These tests require a running `PostgreSQL` database reachable through
//! `SHELF_DATABASE_URL`.

#![allow(clippy::unwrap_used)]

use shelf_core::{Model, ObjectRef, Product, UserId};
use shelf_integration_tests::{new_customer, new_product, test_pool, unique};
use shelf_store::db::{
    CartRepository, CustomerRepository, PgRelations, ProductRepository, UserRepository, registry,
};
use shelf_store::{RelationStore, RepositoryError, ResolveError, Resolver};

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_duplicate_like_is_conflict() {
    let pool = test_pool().await;
    let relations = PgRelations::new(pool.clone());
    let user = UserRepository::new(&pool).create(&unique("user")).await.unwrap();
    let product = ProductRepository::new(&pool)
        .create(&new_product(500))
        .await
        .unwrap();
    let target = product.object_ref();

    relations.like(user.id, &target).await.unwrap();
    let err = relations.like(user.id, &target).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
    assert_eq!(relations.like_count(&target).await.unwrap(), 1);

    assert!(relations.unlike(user.id, &target).await.unwrap());
    relations.like(user.id, &target).await.unwrap();
    assert_eq!(relations.likes_by(user.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_like_by_missing_user_is_not_found() {
    let pool = test_pool().await;
    let relations = PgRelations::new(pool);
    let target = ObjectRef::new(Product::CONTENT_TYPE, 1);

    let err = relations.like(UserId::new(i32::MAX), &target).await.unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_duplicate_tag_application_is_conflict() {
    let pool = test_pool().await;
    let relations = PgRelations::new(pool.clone());
    let tag = relations.create_tag(&unique("tag")).await.unwrap();
    let product = ProductRepository::new(&pool)
        .create(&new_product(500))
        .await
        .unwrap();

    relations.tag(tag.id, &product.object_ref()).await.unwrap();
    let err = relations.tag(tag.id, &product.object_ref()).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    let tags = relations.tags_for(&product.object_ref()).await.unwrap();
    assert_eq!(tags, vec![tag]);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_deleting_target_prunes_relations() {
    let pool = test_pool().await;
    let relations = PgRelations::new(pool.clone());
    let customers = CustomerRepository::new(&pool);

    let user = UserRepository::new(&pool).create(&unique("user")).await.unwrap();
    let tag = relations.create_tag(&unique("vip")).await.unwrap();
    let customer = customers.create(&new_customer()).await.unwrap();
    let address = customers
        .set_address(customer.id, "1 Main Street", "London")
        .await
        .unwrap();

    relations.tag(tag.id, &customer.object_ref()).await.unwrap();
    relations.tag(tag.id, &address.object_ref()).await.unwrap();
    relations.like(user.id, &customer.object_ref()).await.unwrap();

    assert!(customers.delete(customer.id).await.unwrap());
    assert!(relations.tagged_with(tag.id).await.unwrap().is_empty());
    assert_eq!(relations.like_count(&customer.object_ref()).await.unwrap(), 0);
    assert!(customers.address(customer.id).await.unwrap().is_none());

    assert!(!customers.delete(customer.id).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_deleting_product_prunes_cart_item_relations() {
    let pool = test_pool().await;
    let relations = PgRelations::new(pool.clone());
    let resolver = Resolver::new(registry(&pool));
    let products = ProductRepository::new(&pool);
    let carts = CartRepository::new(&pool);

    let user = UserRepository::new(&pool).create(&unique("user")).await.unwrap();
    let tag = relations.create_tag(&unique("gift")).await.unwrap();
    let product = products.create(&new_product(700)).await.unwrap();
    let cart = carts.create().await.unwrap();
    let item = carts.add_item(cart.id, product.id, 2).await.unwrap();

    relations.tag(tag.id, &item.object_ref()).await.unwrap();
    relations.like(user.id, &item.object_ref()).await.unwrap();

    assert!(products.delete(product.id).await.unwrap());
    assert!(carts.items(cart.id).await.unwrap().is_empty());
    assert!(matches!(
        resolver.resolve(&item.object_ref()).await,
        Err(ResolveError::NotFound(_))
    ));
    assert!(relations.tagged_with(tag.id).await.unwrap().is_empty());
    assert_eq!(relations.like_count(&item.object_ref()).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_delete_tag_removes_applications() {
    let pool = test_pool().await;
    let relations = PgRelations::new(pool.clone());
    let tag = relations.create_tag(&unique("gone")).await.unwrap();
    let product = ProductRepository::new(&pool)
        .create(&new_product(100))
        .await
        .unwrap();
    relations.tag(tag.id, &product.object_ref()).await.unwrap();

    assert!(relations.delete_tag(tag.id).await.unwrap());
    assert!(relations.get_tag(tag.id).await.unwrap().is_none());
    assert!(relations.tagged_with(tag.id).await.unwrap().is_empty());
    assert!(relations.tags_for(&product.object_ref()).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL (SHELF_DATABASE_URL)"]
async fn test_find_tag_by_trimmed_label() {
    let pool = test_pool().await;
    let relations = PgRelations::new(pool);
    let label = unique("find");

    let tag = relations.create_tag(&format!("  {label} ")).await.unwrap();
    assert_eq!(tag.label, label);
    assert_eq!(relations.find_tag(&label).await.unwrap(), Some(tag));

    let err = relations.create_tag(" ").await.unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidInput(_)));
}
