//! End-to-end pipeline behavior through the real router, without a socket.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use restaurant_api::config::AppConfig;

mod common;
use common::{app, app_with, capture_logs, config_with_keys, send, TestRequest};

const BOROUGHS: &str = "/api/restaurants/boroughs";
const QUERY: &str = "/api/restaurants/query";

#[tokio::test]
async fn test_hundred_requests_then_rate_limited() {
    let app = app(&AppConfig::default());

    for i in 0..100 {
        let res = send(&app, TestRequest::get(BOROUGHS).from_client("198.51.100.1")).await;
        assert_eq!(res.status, StatusCode::OK, "request {i}");
    }

    let res = send(&app, TestRequest::get(BOROUGHS).from_client("198.51.100.1")).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.headers[header::RETRY_AFTER], "60");
    res.assert_security_headers();

    let json = res.json();
    assert_eq!(json["error"], "Rate limit exceeded");
    assert_eq!(json["message"], "Too many requests. Please try again later.");
    assert_eq!(json["retryAfter"], 60);

    // Another caller has its own bucket.
    let res = send(&app, TestRequest::get(BOROUGHS).from_client("198.51.100.2")).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_api_key_acceptance_and_rejection() {
    let app = app(&config_with_keys("abc1,abc2"));

    let res = send(&app, TestRequest::get(BOROUGHS).with_key("abc1")).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = send(&app, TestRequest::get(BOROUGHS).with_key(" abc2 ")).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = send(&app, TestRequest::get(BOROUGHS).with_key("abc3")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    res.assert_security_headers();
    let json = res.json();
    assert_eq!(json["error"], "Unauthorized");
    assert_eq!(json["message"], "Invalid API key");
    assert_eq!(json["hint"], "Include X-API-Key header in your request");

    let res = send(&app, TestRequest::get(BOROUGHS)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["message"], "API key is required");
}

#[tokio::test]
async fn test_public_paths_skip_authentication() {
    let app = app(&config_with_keys("abc1"));

    let res = send(&app, TestRequest::get("/api/restaurants/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.text(), "NYC Restaurants API is running");
    res.assert_security_headers();

    let res = send(&app, TestRequest::get("/actuator/health")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["status"], "UP");
}

#[tokio::test]
async fn test_unauthenticated_requests_spend_no_tokens() {
    let mut config = config_with_keys("abc1");
    config.rate_limit.capacity = 2;
    let app = app(&config);

    for _ in 0..5 {
        let res = send(&app, TestRequest::get(BOROUGHS).with_key("wrong")).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    }

    for _ in 0..2 {
        let res = send(&app, TestRequest::get(BOROUGHS).with_key("abc1")).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = send(&app, TestRequest::get(BOROUGHS).with_key("abc1")).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_validation_failure_lists_every_field() {
    let app = app(&AppConfig::default());
    let body = r#"{"borough":"Brooklyn 11","cuisine":"Pizza;","minGrade":"AB","limit":0}"#;

    let res = send(&app, TestRequest::post(QUERY, body)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    res.assert_security_headers();

    let json = res.json();
    assert_eq!(json["status"], 400);
    assert_eq!(json["error"], "Validation Failed");
    assert_eq!(json["message"], "Invalid request parameters");
    assert_eq!(json["path"], QUERY);
    assert!(json["timestamp"].is_string());

    let fields = json["fieldErrors"].as_array().unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[3]["field"], "limit");
    assert_eq!(fields[3]["message"], "Limit must be at least 1");
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = app(&AppConfig::default());

    let res = send(&app, TestRequest::post(QUERY, "{\"borough\": ")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let json = res.json();
    assert_eq!(json["error"], "Bad Request");
    assert!(json.get("fieldErrors").is_none());
}

#[tokio::test]
async fn test_injection_is_rejected() {
    let app = app(&AppConfig::default());

    let res = send(&app, TestRequest::post(QUERY, r#"{"cuisine":"Pizza union select"}"#)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], "Input contains potentially malicious content");
}

#[tokio::test]
async fn test_search_and_details() {
    let app = app(&AppConfig::default());

    let res = send(&app, TestRequest::post(QUERY, r#"{"cuisine":"pizza","limit":10}"#)).await;
    assert_eq!(res.status, StatusCode::OK);
    let json = res.json();
    assert_eq!(json["count"], 4);
    assert_eq!(json["message"], "Found 4 restaurants");
    assert_eq!(json["restaurants"][0]["dba"], "Joe's Pizza");

    let res = send(
        &app,
        TestRequest::post(
            "/api/restaurants/details",
            r#"{"restaurantName":"joe's pizza","borough":"Brooklyn"}"#,
        ),
    )
    .await;
    assert_eq!(res.status, StatusCode::OK);
    let json = res.json();
    assert_eq!(json["inspectionCount"], 1);
    assert_eq!(json["message"], "Found 1 inspections");
}

#[tokio::test]
async fn test_unknown_route_is_not_found_envelope() {
    let app = app(&AppConfig::default());

    let res = send(&app, TestRequest::get("/api/restaurants/nope")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    res.assert_security_headers();
    let json = res.json();
    assert_eq!(json["error"], "Not Found");
    assert_eq!(json["path"], "/api/restaurants/nope");
}

#[tokio::test]
async fn test_wrong_method_is_json_envelope() {
    let app = app(&AppConfig::default());

    let res = send(&app, TestRequest::get(QUERY)).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    res.assert_security_headers();
    assert_eq!(res.headers[header::CONTENT_TYPE], "application/json");

    let json = res.json();
    assert_eq!(json["status"], 405);
    assert_eq!(json["error"], "Method Not Allowed");
    assert_eq!(json["message"], "Method GET is not supported for /api/restaurants/query");
    assert_eq!(json["path"], QUERY);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_panicking_handler_is_generic_500() {
    let extra = Router::new().route(
        "/boom",
        get(|| async {
            if true {
                panic!("password=hunter2 at db-primary");
            }
            "unreachable"
        }),
    );
    let app = app_with(&AppConfig::default(), extra);
    let (logs, _guard) = capture_logs();

    let res = send(&app, TestRequest::get("/boom")).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    res.assert_security_headers();

    let output = logs.contents();
    assert!(output.contains("Incoming request"), "{output}");
    assert!(output.contains("Outgoing response"), "{output}");
    assert!(output.contains("status=500"), "{output}");

    let json = res.json();
    assert_eq!(json["error"], "Internal Server Error");
    assert_eq!(
        json["message"],
        "An unexpected error occurred. Please try again later."
    );
    assert_eq!(json["path"], "/boom");
    assert!(!res.text().contains("hunter2"));
}

#[tokio::test]
async fn test_handler_headers_are_overwritten() {
    let extra = Router::new().route(
        "/framed",
        get(|| async { ([(header::X_FRAME_OPTIONS, "SAMEORIGIN")], "ok").into_response() }),
    );
    let app = app_with(&AppConfig::default(), extra);

    let res = send(&app, TestRequest::get("/framed")).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers.get_all(header::X_FRAME_OPTIONS).iter().count(), 1);
    res.assert_security_headers();
}

#[tokio::test]
async fn test_hsts_follows_config() {
    let res = send(&app(&AppConfig::default()), TestRequest::get(BOROUGHS)).await;
    assert!(res.headers.get(header::STRICT_TRANSPORT_SECURITY).is_none());

    let mut config = AppConfig::default();
    config.security.hsts_enabled = true;
    let res = send(&app(&config), TestRequest::get(BOROUGHS)).await;
    assert_eq!(
        res.headers[header::STRICT_TRANSPORT_SECURITY],
        "max-age=31536000; includeSubDomains"
    );
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let res = send(&app(&AppConfig::default()), TestRequest::get(BOROUGHS)).await;
    let id = res.headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}
