use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post, put};
use axum::Router;
use chrono::{Duration, Utc};
use tower::ServiceExt;

use staybook::config::AppConfig;
use staybook::db;
use staybook::handlers;
use staybook::services::seeding::{self, SeedConfig};
use staybook::state::AppState;

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
    }
}

fn test_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
    })
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/users", post(handlers::users::create_user))
        .route("/api/listings", get(handlers::listings::get_listings))
        .route("/api/listings", post(handlers::listings::create_listing))
        .route("/api/listings/:id", get(handlers::listings::get_listing))
        .route("/api/listings/:id", put(handlers::listings::update_listing))
        .route(
            "/api/listings/:id/reviews",
            get(handlers::listings::get_listing_reviews),
        )
        .route("/api/bookings", get(handlers::bookings::get_bookings))
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route(
            "/api/bookings/:id/confirm",
            post(handlers::bookings::confirm_booking),
        )
        .route(
            "/api/bookings/:id/complete",
            post(handlers::bookings::complete_booking),
        )
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route("/api/reviews", post(handlers::reviews::create_review))
        .with_state(state)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn in_days(days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}

async fn create_host(app: &Router) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "name": "Hanna Host",
                "email": "hanna@example.com",
                "is_host": true,
                "is_guest": false,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

async fn create_guest(app: &Router) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/users",
            serde_json::json!({
                "name": "Gary Guest",
                "email": "gary@example.com",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

async fn create_listing(app: &Router, host_id: &str) -> String {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/listings",
            serde_json::json!({
                "host_id": host_id,
                "title": "Sunny loft",
                "description": "A bright loft near the river.",
                "location": "Lisbon, PT",
                "property_type": "apartment",
                "price_per_night": 100.0,
                "bedrooms": 2,
                "bathrooms": 1,
                "max_guests": 4,
                "amenities": ["WiFi", "Kitchen"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

async fn create_booking(app: &Router, listing_id: &str, guest_id: &str) -> serde_json::Value {
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            serde_json::json!({
                "listing_id": listing_id,
                "guest_id": guest_id,
                "check_in": in_days(10),
                "check_out": in_days(13),
                "guests": 2,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

// ── Tests ──

#[tokio::test]
async fn test_health() {
    let app = test_app(test_state());
    let res = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_booking_computes_total_price() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    let guest = create_guest(&app).await;
    let listing = create_listing(&app, &host).await;

    let booking = create_booking(&app, &listing, &guest).await;
    assert_eq!(booking["status"], "pending");
    // 3 nights at 100.0
    assert_eq!(booking["total_price"], 300.0);
}

#[tokio::test]
async fn test_listing_validation_reports_every_violation() {
    let app = test_app(test_state());
    let host = create_host(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/listings",
            serde_json::json!({
                "host_id": host,
                "title": "Broken",
                "description": "x",
                "location": "Nowhere",
                "property_type": "villa",
                "price_per_night": 0.0,
                "bedrooms": 1,
                "bathrooms": 1,
                "max_guests": 0,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(res).await;
    let violations = json["violations"].as_array().unwrap();
    assert_eq!(violations.len(), 2);
}

#[tokio::test]
async fn test_booking_rejects_equal_dates() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    let guest = create_guest(&app).await;
    let listing = create_listing(&app, &host).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            serde_json::json!({
                "listing_id": listing,
                "guest_id": guest,
                "check_in": in_days(10),
                "check_out": in_days(10),
                "guests": 2,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(res).await;
    let violations = json["violations"].as_array().unwrap();
    assert!(violations
        .iter()
        .any(|v| v["field"] == "check_out" && v["reason"].as_str().unwrap().contains("after")));
}

#[tokio::test]
async fn test_booking_rejects_over_capacity() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    let guest = create_guest(&app).await;
    let listing = create_listing(&app, &host).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            serde_json::json!({
                "listing_id": listing,
                "guest_id": guest,
                "check_in": in_days(10),
                "check_out": in_days(12),
                "guests": 9,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_booking_rejects_unknown_listing() {
    let app = test_app(test_state());
    let guest = create_guest(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            serde_json::json!({
                "listing_id": "no-such-listing",
                "guest_id": guest,
                "check_in": in_days(10),
                "check_out": in_days(12),
                "guests": 1,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(res).await;
    assert!(json["error"].as_str().unwrap().contains("does not exist"));
}

#[tokio::test]
async fn test_booking_rejects_unavailable_listing() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    let guest = create_guest(&app).await;
    let listing = create_listing(&app, &host).await;

    // Soft-disable the listing.
    let res = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/listings/{listing}"),
            serde_json::json!({ "available": false }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            serde_json::json!({
                "listing_id": listing,
                "guest_id": guest,
                "check_in": in_days(10),
                "check_out": in_days(12),
                "guests": 1,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_booking_lifecycle_and_invalid_transition() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    let guest = create_guest(&app).await;
    let listing = create_listing(&app, &host).await;
    let booking = create_booking(&app, &listing, &guest).await;
    let id = booking["id"].as_str().unwrap();

    // pending -> completed is not allowed directly.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/bookings/{id}/complete"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // pending -> confirmed -> completed.
    for step in ["confirm", "complete"] {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/bookings/{id}/{step}"),
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    // completed is terminal.
    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/bookings/{id}/cancel"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let json = body_json(res).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("invalid status transition"));
}

#[tokio::test]
async fn test_review_requires_completed_booking() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    let guest = create_guest(&app).await;
    let listing = create_listing(&app, &host).await;
    let booking = create_booking(&app, &listing, &guest).await;
    let id = booking["id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/reviews",
            serde_json::json!({
                "booking_id": id,
                "rating": 5,
                "comment": "Lovely.",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(res).await;
    let violations = json["violations"].as_array().unwrap();
    assert!(violations
        .iter()
        .any(|v| v["reason"].as_str().unwrap().contains("completed")));
}

#[tokio::test]
async fn test_one_review_per_booking() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    let guest = create_guest(&app).await;
    let listing = create_listing(&app, &host).await;
    let booking = create_booking(&app, &listing, &guest).await;
    let id = booking["id"].as_str().unwrap();

    for step in ["confirm", "complete"] {
        let res = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/bookings/{id}/{step}"),
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let review_body = serde_json::json!({
        "booking_id": id,
        "rating": 4,
        "comment": "Great stay.",
    });

    let res = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", review_body.clone()))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let review = body_json(res).await;
    assert_eq!(review["listing_id"].as_str().unwrap(), listing);

    // Second review against the same booking is rejected.
    let res = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", review_body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // And the listing exposes exactly one review plus its average.
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/listings/{listing}/reviews"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/listings/{listing}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let detail = body_json(res).await;
    assert_eq!(detail["average_rating"], 4.0);
}

#[tokio::test]
async fn test_listing_filters() {
    let app = test_app(test_state());
    let host = create_host(&app).await;
    create_listing(&app, &host).await;

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/listings?property_type=apartment&min_price=50&max_price=150")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/listings?property_type=villa")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(body_json(res).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_seeded_data_is_queryable_over_the_api() {
    let state = test_state();
    {
        let conn = state.db.lock().unwrap();
        seeding::seed(
            &conn,
            &SeedConfig {
                users: 6,
                listings: 5,
                bookings: 20,
                reviews: 10,
                clear: false,
                rng_seed: Some(99),
            },
        )
        .unwrap();
    }
    let app = test_app(state);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/bookings?status=completed&limit=100")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let completed = body_json(res).await;
    for booking in completed.as_array().unwrap() {
        assert_eq!(booking["status"], "completed");
    }

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/listings?available=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 5);
}
