//! Product collection state against a mock backend.


use std::sync::Arc;
use std::time::Duration;

use fixtures::{json_response, product_json};
use serde_json::json;
use stockroom_client::{ProductCollection, RestAdapter, Session, SyncMode};
use stockroom_core::ProductId;
use stockroom_products::{NewProduct, ProductChanges};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collection(server: &MockServer, mode: SyncMode) -> ProductCollection {
    let session = Arc::new(Session::in_memory());
    session.login("tok").unwrap();
    ProductCollection::new(Arc::new(RestAdapter::new(server.uri())), session, mode)
}

fn router() -> NewProduct {
    NewProduct {
        name: "Router".to_string(),
        description: None,
        price: 12.5,
        stock: 1,
    }
}

#[tokio::test]
async fn failed_fetch_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(json_response(200, json!([product_json(1, "Mouse", 3)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let products = collection(&server, SyncMode::default());
    products.load().await.unwrap();
    assert_eq!(products.products().len(), 1);
    assert_eq!(products.error(), None);

    let err = products.load().await.unwrap_err();
    assert_eq!(err.user_message(), "Failed to fetch products");

    let state = products.snapshot();
    assert_eq!(state.error.as_deref(), Some("Failed to fetch products"));
    assert_eq!(state.products.len(), 1);
    assert!(!state.loading);
}

#[tokio::test]
async fn apply_response_mode_needs_no_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(json_response(200, json!([product_json(1, "Mouse", 3)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(json_response(201, product_json(2, "Router", 1)))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/products/1"))
        .respond_with(json_response(200, product_json(1, "Mouse", 0)))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/products/2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let products = collection(&server, SyncMode::ApplyResponse);
    products.load().await.unwrap();

    products.add(router()).await.unwrap();
    assert_eq!(products.products().len(), 2);

    let changes = ProductChanges {
        stock: Some(0),
        ..Default::default()
    };
    products.edit(ProductId::new(1), changes).await.unwrap();
    assert_eq!(products.find(ProductId::new(1)).unwrap().stock, 0);

    products.remove(ProductId::new(2)).await.unwrap();
    assert!(products.find(ProductId::new(2)).is_none());
    assert_eq!(products.products().len(), 1);
}

#[tokio::test]
async fn full_reload_mode_refetches_after_mutation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(json_response(201, product_json(2, "Router", 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(json_response(
            200,
            json!([product_json(1, "Mouse", 3), product_json(2, "Router", 1)]),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let products = collection(&server, SyncMode::FullReload);
    products.add(router()).await.unwrap();

    let names: Vec<_> = products.products().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Mouse", "Router"]);
}

#[tokio::test]
async fn successful_operation_clears_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(json_response(201, product_json(2, "Router", 1)))
        .mount(&server)
        .await;

    let products = collection(&server, SyncMode::ApplyResponse);

    products.add(router()).await.unwrap_err();
    assert_eq!(products.error().as_deref(), Some("Failed to add product"));
    assert!(products.products().is_empty());

    products.add(router()).await.unwrap();
    assert_eq!(products.error(), None);
    assert_eq!(products.products().len(), 1);
}

#[tokio::test]
async fn full_reload_failure_keeps_mutation_and_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(json_response(200, json!([product_json(1, "Mouse", 3)])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(json_response(201, product_json(2, "Router", 1)))
        .expect(1)
        .mount(&server)
        .await;

    let products = collection(&server, SyncMode::FullReload);
    products.load().await.unwrap();

    let created = products.add(router()).await.unwrap();
    assert_eq!(created.id, ProductId::new(2));

    let state = products.snapshot();
    assert_eq!(state.error.as_deref(), Some("Failed to fetch products"));
    let names: Vec<_> = state.products.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Mouse"]);
    assert!(!state.loading);
}

#[tokio::test]
async fn last_completed_load_wins() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(
            json_response(200, json!([product_json(1, "Slow", 1)]))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(json_response(200, json!([product_json(2, "Fast", 1)])))
        .mount(&server)
        .await;

    let products = collection(&server, SyncMode::default());

    let (slow, (fast, still_loading)) = tokio::join!(products.load(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let result = products.load().await;
        (result, products.is_loading())
    });
    slow.unwrap();
    fast.unwrap();

    // The fast load finished while the slow one was still out.
    assert!(still_loading);

    let names: Vec<_> = products.products().into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Slow"]);
    assert!(!products.is_loading());
}
