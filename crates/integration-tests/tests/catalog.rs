//! Catalog reads through the real client against the fake BlockFlow API.

use blockflow_core::ProductId;
use blockflow_integration_tests::FakeApi;
use blockflow_storefront::api::{ApiError, BlockflowClient, ProductQuery};
use rust_decimal::Decimal;
use tempfile::TempDir;

async fn client() -> (FakeApi, BlockflowClient) {
    let api = FakeApi::spawn().await;
    let dir = TempDir::new().expect("tempdir");
    let client = BlockflowClient::new(&api.config(dir.path())).expect("client");
    (api, client)
}

#[tokio::test]
async fn test_get_product_normalizes_price_fields() {
    let (_api, client) = client().await;

    let granite = client.get_product(ProductId::new(1)).await.expect("granite");
    assert_eq!(granite.price.amount, Decimal::from(100));
    assert_eq!(granite.category.as_deref(), Some("Stone"));

    let oak = client.get_product(ProductId::new(2)).await.expect("oak");
    assert_eq!(oak.price.amount, Decimal::from(50));
    assert_eq!(oak.image, None);

    let brick = client.get_product(ProductId::new(3)).await.expect("brick");
    assert_eq!(brick.price.amount, Decimal::new(1250, 2));
}

#[tokio::test]
async fn test_get_missing_product() {
    let (_api, client) = client().await;

    let err = client
        .get_product(ProductId::new(404))
        .await
        .expect_err("product should not exist");

    assert!(matches!(err, ApiError::NotFound(ref message) if message.contains("404")));
}

#[tokio::test]
async fn test_search_filters_by_query_and_category() {
    let (_api, client) = client().await;

    let page = client
        .search_products(&ProductQuery {
            q: "b".to_string(),
            ..ProductQuery::default()
        })
        .await
        .expect("search");
    let names: Vec<_> = page.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Granite Block", "Oak Beam", "Clay Brick"]);
    assert_eq!(page.total_pages, 1);

    let page = client
        .search_products(&ProductQuery {
            category: "Masonry".to_string(),
            ..ProductQuery::default()
        })
        .await
        .expect("search");
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].id, ProductId::new(3));
}

#[tokio::test]
async fn test_categories() {
    let (_api, client) = client().await;

    let categories = client.categories().await;
    assert_eq!(categories, ["Masonry", "Stone", "Timber"]);
}
