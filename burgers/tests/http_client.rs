//! HTTP client behavior against a mock server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use std::sync::Arc;
use stellar_burgers::api::{ApiError, AuthApi, CatalogApi, OrderApi};
use stellar_burgers::types::{LoginData, ProfileUpdate};
use stellar_burgers::{
    ClientConfig, Credentials, HttpApi, IngredientId, IngredientKind, MemoryTokenStorage,
    OrderNumber, TokenStorage,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, credentials: &Credentials) -> HttpApi {
    HttpApi::new(&ClientConfig::new(server.uri()), credentials.clone()).unwrap()
}

fn user_body(name: &str) -> serde_json::Value {
    json!({
        "success": true,
        "user": { "email": "cook@example.com", "name": name }
    })
}

#[tokio::test]
async fn fetches_the_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ingredients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "_id": "B", "name": "Crater bun", "type": "bun", "proteins": 80,
                  "fat": 24, "carbohydrates": 53, "calories": 420, "price": 1255,
                  "image": "b.png", "image_large": "b-l.png", "image_mobile": "b-m.png" },
                { "_id": "X", "name": "Spicy-X", "type": "sauce", "price": 90 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, &Credentials::in_memory());
    let ingredients = api.fetch_ingredients().await.unwrap();

    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0].kind, IngredientKind::Bun);
    assert_eq!(ingredients[0].price, 1255);
    assert_eq!(ingredients[1].id, IngredientId::new("X"));
}

#[tokio::test]
async fn rejection_message_surfaces_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/all"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "Kitchen is closed"
        })))
        .mount(&server)
        .await;

    let api = client(&server, &Credentials::in_memory());
    let error = api.fetch_feed().await.unwrap_err();

    assert_eq!(error, ApiError::Rejected("Kitchen is closed".to_string()));
    assert_eq!(error.to_string(), "Kitchen is closed");
}

#[tokio::test]
async fn non_json_failure_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ingredients"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let api = client(&server, &Credentials::in_memory());
    let error = api.fetch_ingredients().await.unwrap_err();

    assert_eq!(
        error,
        ApiError::UnexpectedResponse {
            status: 502,
            message: "Bad Gateway".to_string(),
        }
    );
}

#[tokio::test]
async fn submits_order_with_verbatim_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_json(json!({ "ingredients": ["B", "X", "B"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "name": "Crater spicy burger",
            "order": {
                "_id": "abc",
                "status": "done",
                "name": "Crater spicy burger",
                "number": 4242,
                "createdAt": "2024-01-01T00:00:00.000Z",
                "updatedAt": "2024-01-01T00:00:01.000Z",
                "ingredients": [{ "_id": "B" }, { "_id": "X" }, { "_id": "B" }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::in_memory();
    credentials.store("Bearer access-1", "refresh-1").unwrap();
    let api = client(&server, &credentials);

    let order = api
        .submit_order(vec![IngredientId::new("B"), IngredientId::new("X"), IngredientId::new("B")])
        .await
        .unwrap();

    assert_eq!(order.number, OrderNumber::new(4242));
    assert_eq!(order.ingredients.len(), 3);
    assert_eq!(order.ingredients[1], IngredientId::new("X"));
}

#[tokio::test]
async fn fetches_order_by_number() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "orders": [{
                "_id": "o-77",
                "status": "pending",
                "name": "Galactic burger",
                "number": 77,
                "ingredients": ["B", "Y", "B"]
            }]
        })))
        .mount(&server)
        .await;

    let api = client(&server, &Credentials::in_memory());
    let orders = api.fetch_order_by_number(OrderNumber::new(77)).await.unwrap();

    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].ingredients[1], IngredientId::new("Y"));
}

#[tokio::test]
async fn expired_access_is_renewed_and_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "message": "jwt expired"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_json(json!({ "token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "accessToken": "Bearer fresh",
            "refreshToken": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body("Cook")))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::in_memory();
    credentials.store("Bearer stale", "refresh-1").unwrap();
    let api = client(&server, &credentials);

    let user = api.fetch_profile().await.unwrap();

    assert_eq!(user.name, "Cook");
    assert_eq!(credentials.access_token().unwrap().as_deref(), Some("Bearer fresh"));
    assert_eq!(credentials.refresh_token().unwrap().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn failed_renewal_returns_the_original_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "message": "jwt expired"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Token is invalid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = Credentials::in_memory();
    credentials.store("Bearer stale", "refresh-1").unwrap();
    let api = client(&server, &credentials);

    let error = api.fetch_profile().await.unwrap_err();

    assert!(error.is_token_expired());
}

#[tokio::test]
async fn other_rejections_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/auth/user"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "message": "User with such email already exists"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let credentials = Credentials::in_memory();
    credentials.store("Bearer access-1", "refresh-1").unwrap();
    let api = client(&server, &credentials);

    let error = api
        .update_profile(ProfileUpdate::default().with_email("taken@example.com"))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        ApiError::Rejected("User with such email already exists".to_string())
    );
}

#[tokio::test]
async fn missing_access_is_renewed_before_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "accessToken": "Bearer fresh",
            "refreshToken": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "orders": [],
            "total": 0,
            "totalToday": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let refresh = Arc::new(MemoryTokenStorage::new());
    refresh.set("refresh-1").unwrap();
    let credentials = Credentials::new(Arc::new(MemoryTokenStorage::new()), refresh);
    let api = client(&server, &credentials);

    let orders = api.fetch_order_history().await.unwrap();

    assert!(orders.is_empty());
    assert_eq!(credentials.refresh_token().unwrap().as_deref(), Some("refresh-2"));
}

#[tokio::test]
async fn no_credentials_fails_without_traffic() {
    let server = MockServer::start().await;

    let api = client(&server, &Credentials::in_memory());
    let error = api.fetch_profile().await.unwrap_err();

    assert_eq!(error, ApiError::MissingCredential);
    assert_eq!(error.to_string(), "You should be authorised");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn login_returns_tokens_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "email": "cook@example.com", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "accessToken": "Bearer access-1",
            "refreshToken": "refresh-1",
            "user": { "email": "cook@example.com", "name": "Cook" }
        })))
        .mount(&server)
        .await;

    let api = client(&server, &Credentials::in_memory());
    let response = api
        .login(LoginData {
            email: "cook@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.tokens.access_token, "Bearer access-1");
    assert_eq!(response.tokens.refresh_token, "refresh-1");
    assert_eq!(response.user.name, "Cook");
}

#[tokio::test]
async fn logout_sends_the_refresh_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(body_json(json!({ "token": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Successful logout"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, &Credentials::in_memory());
    api.logout("refresh-1".to_string()).await.unwrap();
}
