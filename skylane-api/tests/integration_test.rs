use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use skylane_api::{app, state::AuthConfig, AppState};
use skylane_core::CustomerStore;
use skylane_shared::Manager;
use skylane_store::MemoryStore;
use tower::ServiceExt;

// Low bcrypt cost keeps the test fast; production uses DEFAULT_COST.
const TEST_BCRYPT_COST: u32 = 4;

async fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_manager(&Manager {
            employee_id: "M-100".to_string(),
            first_name: "Noa".to_string(),
            last_name: "Peretz".to_string(),
            password_hash: bcrypt::hash("manager-pass", TEST_BCRYPT_COST).unwrap(),
        })
        .await
        .unwrap();

    let state = AppState {
        store: store.clone(),
        auth: AuthConfig {
            secret: "integration-test-secret".to_string(),
            expiration: 3600,
        },
    };
    (app(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn delete_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn login(app: &Router, identifier: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/auth/login",
            None,
            json!({ "identifier": identifier, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Seeds reference data through the manager API and returns the created
/// flight id. Departure is ten days out so both cancellation windows are
/// open.
async fn seed_flight(app: &Router, manager_token: &str) -> i64 {
    let (status, route) = send(
        app,
        post_json(
            "/routes",
            Some(manager_token),
            json!({ "origin": "TLV", "destination": "JFK", "duration_minutes": 400 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "route creation failed: {route}");
    let route_id = route["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        post_json(
            "/fleet",
            Some(manager_token),
            json!({
                "tail_number": "4X-EKA",
                "size": "BIG",
                "manufacturer": "Boeing",
                "purchased_on": "2020-01-01",
                "layout": {
                    "business_rows": 1,
                    "business_columns": 2,
                    "economy_rows": 2,
                    "economy_columns": 2
                }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "fleet registration failed: {body}");

    for id in ["P-1", "P-2", "P-3"] {
        let (status, body) = send(
            app,
            post_json(
                "/crew",
                Some(manager_token),
                json!({
                    "employee_id": id,
                    "role": "PILOT",
                    "first_name": "Dana",
                    "last_name": "Levi",
                    "long_haul_qualified": true,
                    "hired_on": "2021-03-15"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "crew registration failed: {body}");
    }
    for id in ["A-1", "A-2", "A-3", "A-4", "A-5", "A-6"] {
        let (status, _) = send(
            app,
            post_json(
                "/crew",
                Some(manager_token),
                json!({
                    "employee_id": id,
                    "role": "ATTENDANT",
                    "first_name": "Yael",
                    "last_name": "Mizrahi",
                    "long_haul_qualified": true,
                    "hired_on": "2022-01-10"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let departure = Utc::now() + Duration::days(10);

    let (status, eligibility) = send(
        app,
        post_json(
            "/flights/eligibility",
            Some(manager_token),
            json!({
                "route_id": route_id,
                "departure": departure.to_rfc3339(),
                "tail_number": "4X-EKA"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(eligibility["aircraft"].as_array().unwrap().len(), 1);
    assert_eq!(eligibility["crew"]["pilots"].as_array().unwrap().len(), 3);
    assert!(eligibility["warnings"].as_array().unwrap().is_empty());

    let (status, created) = send(
        app,
        post_json(
            "/flights",
            Some(manager_token),
            json!({
                "route_id": route_id,
                "tail_number": "4X-EKA",
                "departure": departure.to_rfc3339(),
                "economy_price_cents": 50_000,
                "business_price_cents": 120_000,
                "pilots": ["P-1", "P-2", "P-3"],
                "attendants": ["A-1", "A-2", "A-3", "A-4", "A-5", "A-6"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "flight creation failed: {created}");
    created["flight_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_manager_endpoints_require_authentication() {
    let (app, _) = test_app().await;

    let (status, _) = send(
        &app,
        post_json(
            "/routes",
            None,
            json!({ "origin": "TLV", "destination": "JFK", "duration_minutes": 400 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_token_is_rejected_on_manager_endpoints() {
    let (app, _) = test_app().await;

    let (status, _) = send(
        &app,
        post_json(
            "/auth/register",
            None,
            json!({
                "email": "dana@example.com",
                "first_name": "Dana",
                "last_name": "Levi",
                "password": "secret-password"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = login(&app, "dana@example.com", "secret-password").await;
    let (status, _) = send(
        &app,
        post_json(
            "/routes",
            Some(&token),
            json!({ "origin": "TLV", "destination": "JFK", "duration_minutes": 400 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (app, _) = test_app().await;

    let payload = json!({
        "email": "dana@example.com",
        "first_name": "Dana",
        "last_name": "Levi",
        "password": "secret-password"
    });
    let (status, _) = send(&app, post_json("/auth/register", None, payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, post_json("/auth/register", None, payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_full_booking_flow() {
    let (app, _) = test_app().await;
    let manager_token = login(&app, "M-100", "manager-pass").await;
    let flight_id = seed_flight(&app, &manager_token).await;

    // Register and log in a customer.
    let (status, _) = send(
        &app,
        post_json(
            "/auth/register",
            None,
            json!({
                "email": "dana@example.com",
                "first_name": "Dana",
                "last_name": "Levi",
                "password": "secret-password"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let customer_token = login(&app, "dana@example.com", "secret-password").await;

    // The flight is visible to the customer.
    let (status, flights) = send(&app, get_req("/flights?origin=TLV", Some(&customer_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(flights.as_array().unwrap().len(), 1);
    assert_eq!(flights[0]["id"].as_i64().unwrap(), flight_id);
    assert_eq!(flights[0]["available_seats"].as_i64().unwrap(), 6);

    // Book the business seat 1A and economy 2A.
    let (status, booking) = send(
        &app,
        post_json(
            "/bookings",
            Some(&customer_token),
            json!({
                "flight_id": flight_id,
                "seats": [
                    { "row": 1, "column": "A" },
                    { "row": 2, "column": "A" }
                ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "booking failed: {booking}");
    assert_eq!(booking["total_price_cents"].as_i64().unwrap(), 170_000);
    let reference = booking["reference"].as_str().unwrap().to_string();

    // Someone else cannot grab the same seat.
    let (status, _) = send(
        &app,
        post_json(
            "/bookings",
            None,
            json!({
                "flight_id": flight_id,
                "email": "guest@example.com",
                "contact": { "first_name": "Guy", "last_name": "Bar" },
                "seats": [ { "row": 1, "column": "A" } ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The seat map marks the booked seats.
    let (status, view) = send(&app, get_req(&format!("/flights/{flight_id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let reserved: Vec<bool> = view["seats"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["reserved"].as_bool().unwrap())
        .collect();
    assert_eq!(reserved.iter().filter(|r| **r).count(), 2);

    // Departure is ten days out, so cancellation succeeds with a 5% fee.
    let (status, cancelled) = send(
        &app,
        delete_req(&format!("/bookings/{reference}"), Some(&customer_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "cancellation failed: {cancelled}");
    assert_eq!(cancelled["status"].as_str().unwrap(), "CANCELLED_BY_CUSTOMER");
    assert_eq!(cancelled["total_price_cents"].as_i64().unwrap(), 8_500);
    assert!(cancelled["seats"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_guest_booking_lookup_and_owner_check() {
    let (app, _) = test_app().await;
    let manager_token = login(&app, "M-100", "manager-pass").await;
    let flight_id = seed_flight(&app, &manager_token).await;

    let (status, booking) = send(
        &app,
        post_json(
            "/bookings",
            None,
            json!({
                "flight_id": flight_id,
                "email": "guest@example.com",
                "contact": { "first_name": "Guy", "last_name": "Bar" },
                "seats": [ { "row": 2, "column": "B" } ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "guest booking failed: {booking}");
    let reference = booking["reference"].as_str().unwrap().to_string();

    // Lookup works with the right email only.
    let (status, found) = send(
        &app,
        post_json(
            "/bookings/lookup",
            None,
            json!({ "reference": reference, "email": "guest@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["flight_id"].as_i64().unwrap(), flight_id);

    let (status, _) = send(
        &app,
        post_json(
            "/bookings/lookup",
            None,
            json!({ "reference": reference, "email": "wrong@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cancellation without owner identification is refused.
    let (status, _) = send(&app, delete_req(&format!("/bookings/{reference}"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // With the owner's email it goes through.
    let (status, _) = send(
        &app,
        delete_req(
            &format!("/bookings/{reference}?email=guest@example.com"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_flight_cancellation_cascades_to_bookings() {
    let (app, store) = test_app().await;
    let manager_token = login(&app, "M-100", "manager-pass").await;
    let flight_id = seed_flight(&app, &manager_token).await;

    let (status, booking) = send(
        &app,
        post_json(
            "/bookings",
            None,
            json!({
                "flight_id": flight_id,
                "email": "guest@example.com",
                "contact": { "first_name": "Guy", "last_name": "Bar" },
                "seats": [ { "row": 2, "column": "A" } ]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let reference = booking["reference"].as_str().unwrap().to_string();

    // Ten days out is beyond the 72-hour gate.
    let (status, _) = send(
        &app,
        delete_req(&format!("/flights/{flight_id}"), Some(&manager_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    use skylane_core::BookingStore;
    let cancelled = store.booking(&reference).await.unwrap().unwrap();
    assert_eq!(cancelled.status.as_str(), "CANCELLED_BY_SYSTEM");
    assert_eq!(cancelled.total_price_cents, 0);
}
