//! End-to-end rental flow over HTTP.
//!
//! Drives the full router (auth, rate limiting, handlers) against an
//! in-memory SQLite database.
//!
//! This test requires the `sqlite` feature flag.

#![cfg(feature = "sqlite")]

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use rental_hex::inbound::{AppState, HttpServer};
use rental_repo::SqliteRepo;
use rental_types::{CatalogSeed, CreateCarRequest, CreatePackageRequest, Money};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn create_app() -> Router {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    let state = AppState::new(Arc::new(repo));

    state
        .catalog
        .import(CatalogSeed {
            packages: vec![
                CreatePackageRequest {
                    name: "Ordinary".into(),
                    price_per_hour: Money::new(1_000).unwrap(),
                },
                CreatePackageRequest {
                    name: "Premium".into(),
                    price_per_hour: Money::new(2_500).unwrap(),
                },
            ],
            cars: vec![
                CreateCarRequest {
                    registration_number: "WX 1001".into(),
                    brand: "Toyota".into(),
                    model: "Corolla".into(),
                    package: "Ordinary".into(),
                },
                CreateCarRequest {
                    registration_number: "WX 2001".into(),
                    brand: "BMW".into(),
                    model: "X5".into(),
                    package: "Premium".into(),
                },
            ],
        })
        .await
        .unwrap();

    HttpServer::with_rate_limit(state, NonZeroU32::new(1_000).unwrap()).router()
}

/// Sends a request and returns the status with the decoded JSON body
/// (`Value::Null` for empty bodies).
async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &Router, username: &str) -> String {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/users",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct-horse",
            "phone": "123456789"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        Method::POST,
        "/api/sessions",
        None,
        Some(json!({ "username": username, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

/// Logs in, attaches a card and tops it up.
async fn funded(app: &Router, username: &str, number: &str, amount: i64) -> String {
    let token = login(app, username).await;

    let (status, card) = send(
        app,
        Method::POST,
        "/api/card",
        Some(&token),
        Some(json!({
            "number": number,
            "expiry_month": 12,
            "expiry_year": 2030,
            "cvv": "123"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(card["balance"], 0);
    assert!(card.get("cvv").is_none());

    let (status, card) = send(
        app,
        Method::POST,
        "/api/card/funds",
        Some(&token),
        Some(json!({ "amount": amount })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["balance"], amount);

    token
}

async fn car_id(app: &Router, registration: &str) -> i64 {
    let (_, page) = send(app, Method::GET, "/api/cars", None, None).await;
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["registration_number"] == registration)
        .unwrap()["id"]
        .as_i64()
        .unwrap()
}

async fn balance(app: &Router, token: &str) -> i64 {
    let (_, card) = send(app, Method::GET, "/api/card", Some(token), None).await;
    card["balance"].as_i64().unwrap()
}

#[tokio::test]
async fn test_order_and_pickup_over_http() {
    let app = create_app().await;
    let token = funded(&app, "alice", "4111111111111111", 100_000).await;

    let (status, reservation) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({ "package": "Ordinary", "hours": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reservation["package"], "Ordinary");
    assert_eq!(balance(&app, &token).await, 90_000);

    let (status, _) = send(&app, Method::GET, "/api/reservation", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let id = car_id(&app, "WX 1001").await;
    let (status, pickup) = send(
        &app,
        Method::POST,
        &format!("/api/cars/{id}/pickup"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(pickup["car"]["available"], false);
    assert_eq!(pickup["rental"]["brand"], "Toyota");

    let (status, body) = send(&app, Method::GET, "/api/reservation", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "no_reservation");

    let (_, rentals) = send(&app, Method::GET, "/api/rentals", Some(&token), None).await;
    assert_eq!(rentals.as_array().unwrap().len(), 1);

    let (_, car) = send(&app, Method::GET, &format!("/api/cars/{id}"), None, None).await;
    assert_eq!(car["available"], false);
}

#[tokio::test]
async fn test_insufficient_funds_over_http() {
    let app = create_app().await;
    let token = funded(&app, "alice", "4111111111111111", 5_000).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({ "package": "Ordinary", "hours": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "insufficient_funds");
    assert_eq!(balance(&app, &token).await, 5_000);
}

#[tokio::test]
async fn test_second_order_conflicts() {
    let app = create_app().await;
    let token = funded(&app, "alice", "4111111111111111", 100_000).await;
    let order = json!({ "package": "Ordinary", "hours": 10 });

    let (status, _) = send(&app, Method::POST, "/api/orders", Some(&token), Some(order.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, "/api/orders", Some(&token), Some(order)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "existing_reservation");
    assert_eq!(balance(&app, &token).await, 90_000);
}

#[tokio::test]
async fn test_concurrent_orders_charge_once() {
    let app = create_app().await;
    let token = funded(&app, "alice", "4111111111111111", 100_000).await;
    let order = json!({ "package": "Ordinary", "hours": 10 });

    let (a, b) = tokio::join!(
        send(&app, Method::POST, "/api/orders", Some(&token), Some(order.clone())),
        send(&app, Method::POST, "/api/orders", Some(&token), Some(order)),
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(balance(&app, &token).await, 90_000);
}

#[tokio::test]
async fn test_package_mismatch_over_http() {
    let app = create_app().await;
    let token = funded(&app, "alice", "4111111111111111", 100_000).await;
    send(
        &app,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({ "package": "Ordinary", "hours": 2 })),
    )
    .await;

    let premium = car_id(&app, "WX 2001").await;
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/cars/{premium}/pickup"),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], "package_mismatch");

    let (status, _) = send(&app, Method::GET, "/api/reservation", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_card_over_http() {
    let app = create_app().await;
    funded(&app, "alice", "4111111111111111", 1_000).await;
    let bob = login(&app, "bob").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/card",
        Some(&bob),
        Some(json!({
            "number": "4111111111111111",
            "expiry_month": 1,
            "expiry_year": 2031,
            "cvv": "999"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], "duplicate_card");

    let (status, _) = send(&app, Method::GET, "/api/card", Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_pickups_over_http() {
    let app = create_app().await;
    let alice = funded(&app, "alice", "4111111111111111", 100_000).await;
    let bob = funded(&app, "bob", "5500000000000004", 100_000).await;
    for token in [&alice, &bob] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/orders",
            Some(token),
            Some(json!({ "package": "Ordinary", "hours": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let uri = format!("/api/cars/{}/pickup", car_id(&app, "WX 1001").await);
    let (a, b) = tokio::join!(
        send(&app, Method::POST, &uri, Some(&alice), None),
        send(&app, Method::POST, &uri, Some(&bob), None),
    );

    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_app().await;

    let (status, body) = send(&app, Method::GET, "/api/card", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["kind"], "unauthorized");

    let (status, _) = send(&app, Method::GET, "/api/rentals", Some("rt_bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = create_app().await;
    let token = login(&app, "alice").await;

    let (status, me) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert!(me.get("password_hash").is_none());

    let (status, _) = send(&app, Method::DELETE, "/api/sessions", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_catalog_listing() {
    let app = create_app().await;

    let (status, packages) = send(&app, Method::GET, "/api/packages", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(packages[0]["name"], "Ordinary");

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/cars?package=Premium&sort=brand&direction=desc",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["model"], "X5");

    let (status, body) = send(&app, Method::GET, "/api/cars?size=0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], "validation");

    let (status, body) = send(&app, Method::GET, "/api/cars/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "car_not_found");
}
