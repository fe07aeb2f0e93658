//! Router tests against the in-memory store

use super::*;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use payscope_common::auth::UserMetadata;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "router-test-secret";

fn test_state() -> AppState {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some(SECRET.to_string());
    AppState::new(Arc::new(config), Arc::new(MemoryStore::new()))
}

fn token_for(state: &AppState, user_id: Uuid, full_name: &str) -> String {
    let metadata = UserMetadata {
        full_name: Some(full_name.to_string()),
        ..Default::default()
    };
    state
        .jwt
        .generate_token(user_id, Some("user@example.com".into()), metadata, 3600)
        .unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn submission() -> Value {
    json!({
        "company": "Acme Corp",
        "role": "Backend Engineer",
        "location": "Pune",
        "totalCompensation": "1800000",
        "baseSalary": "1500000",
        "bonus": "300000",
        "yearsOfExperience": "4",
        "type": "fulltime"
    })
}

async fn create_salary(app: &Router, token: &str) -> String {
    let (status, body) = send(app, Method::POST, "/v1/salaries", Some(token), Some(submission())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = create_router(test_state());
    let (status, body) = send(&app, Method::GET, "/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "up");
}

#[tokio::test]
async fn test_submission_requires_sign_in() {
    let app = create_router(test_state());
    let (status, body) = send(&app, Method::POST, "/v1/salaries", None, Some(submission())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_submission_validation_error_names_field() {
    let state = test_state();
    let token = token_for(&state, Uuid::new_v4(), "Asha Rao");
    let app = create_router(state);

    let mut input = submission();
    input["location"] = json!("   ");
    let (status, body) = send(&app, Method::POST, "/v1/salaries", Some(&token), Some(input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_FIELD");
    assert_eq!(body["error"]["field"], "location");
}

#[tokio::test]
async fn test_malformed_json_uses_error_body() {
    let state = test_state();
    let token = token_for(&state, Uuid::new_v4(), "Asha Rao");
    let app = create_router(state);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/salaries")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"company": "Acme""#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_then_read_detail_and_list() {
    let state = test_state();
    let token = token_for(&state, Uuid::new_v4(), "Asha Rao");
    let app = create_router(state);

    let (status, created) =
        send(&app, Method::POST, "/v1/salaries", Some(&token), Some(submission())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    let url = format!("/salaries/acme-corp/backend-engineer/pune/{}", id);
    assert_eq!(created["url"], url.as_str());
    assert_eq!(created["job_type"], "full-time");

    let (status, detail) = send(&app, Method::GET, &format!("/v1/salaries/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["breakdown"]["total"], 1_800_000.0);
    assert_eq!(detail["breakdown"]["components"][0]["name"], "Base Salary");
    assert_eq!(detail["labels"]["total"], "Rs 18.0L");

    let (status, by_slug) = send(
        &app,
        Method::GET,
        &format!("/v1/salaries/by-slug/old-name/x/y/{}", id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_slug["url"], url.as_str());

    let (status, page) = send(
        &app,
        Method::GET,
        "/v1/salaries?company=ACME&job_type=full-time&limit=500",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["limit"], 100);

    let (status, _) = send(&app, Method::GET, "/v1/salaries?job_type=contract", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/v1/salaries/{}", Uuid::new_v4()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "SALARY_NOT_FOUND");
}

#[tokio::test]
async fn test_vote_round_trip_over_http() {
    let state = test_state();
    let token = token_for(&state, Uuid::new_v4(), "Asha Rao");
    let app = create_router(state);
    let id = create_salary(&app, &token).await;
    let vote_uri = format!("/v1/salaries/{}/vote", id);

    let (status, _) = send(&app, Method::POST, &vote_uri, None, Some(json!({"vote_type": "up"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, tally) =
        send(&app, Method::POST, &vote_uri, Some(&token), Some(json!({"vote_type": "up"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tally, json!({"upvotes": 1, "downvotes": 0, "user_vote": "up"}));

    let (_, tally) =
        send(&app, Method::POST, &vote_uri, Some(&token), Some(json!({"vote_type": "down"}))).await;
    assert_eq!(tally, json!({"upvotes": 0, "downvotes": 1, "user_vote": "down"}));

    let (_, current) = send(&app, Method::GET, &vote_uri, Some(&token), None).await;
    assert_eq!(current["user_vote"], "down");

    let (_, tally) =
        send(&app, Method::POST, &vote_uri, Some(&token), Some(json!({"vote_type": "down"}))).await;
    assert_eq!(tally, json!({"upvotes": 0, "downvotes": 0, "user_vote": null}));
}

#[tokio::test]
async fn test_comment_thread_over_http() {
    let state = test_state();
    let author_id = Uuid::new_v4();
    let author = token_for(&state, author_id, "Priya Nair");
    let other = token_for(&state, Uuid::new_v4(), "Someone Else");
    let app = create_router(state);
    let id = create_salary(&app, &author).await;
    let thread_uri = format!("/v1/salaries/{}/comments", id);

    let (status, signed) = send(
        &app,
        Method::POST,
        &thread_uri,
        Some(&author),
        Some(json!({
            "content": "  Matches my offer letter  ",
            "attachments": [{"type": "file", "url": "https://files.example/o.pdf", "name": "o.pdf", "size": 1536}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(signed["display_name"], "Priya Nair");
    assert_eq!(signed["content"], "Matches my offer letter");
    assert_eq!(signed["attachments"][0]["size_label"], "1.5 KB");

    let (status, anon) = send(&app, Method::POST, &thread_uri, None, Some(json!({"content": "Too low"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(anon["is_author"], false);

    let (status, page) = send(
        &app,
        Method::GET,
        &format!("{}?sort=oldest&per_page=1", thread_uri),
        Some(&author),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["has_more"], true);
    assert_eq!(page["comments"][0]["is_author"], true);

    let comment_id = signed["id"].as_str().unwrap();
    let (_, tally) = send(
        &app,
        Method::POST,
        &format!("/v1/comments/{}/vote", comment_id),
        Some(&other),
        Some(json!({"vote_type": "up"})),
    )
    .await;
    assert_eq!(tally["upvotes"], 1);

    let delete_uri = format!("/v1/comments/{}", comment_id);
    let (status, _) = send(&app, Method::DELETE, &delete_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::DELETE, &delete_uri, Some(&author), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, page) = send(&app, Method::GET, &thread_uri, None, None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["per_page"], 3);
}

#[tokio::test]
async fn test_writes_are_rate_limited() {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some(SECRET.to_string());
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst = 1;
    let state = AppState::new(Arc::new(config), Arc::new(MemoryStore::new()));
    let token = token_for(&state, Uuid::new_v4(), "Asha Rao");
    let app = create_router(state);

    create_salary(&app, &token).await;
    let (status, body) =
        send(&app, Method::POST, "/v1/salaries", Some(&token), Some(submission())).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Reads still pass
    let (status, _) = send(&app, Method::GET, "/v1/salaries", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[test]
fn test_metrics_carry_service_label() {
    let mut config = AppConfig::default();
    config.observability.service_name = "payscope-test".to_string();

    let recorder = prometheus_builder(&config).unwrap().build_recorder();
    let handle = recorder.handle();
    ::metrics::with_local_recorder(&recorder, || {
        payscope_common::metrics::record_comment("create");
    });

    let rendered = handle.render();
    assert!(rendered.contains(r#"service="payscope-test""#), "{}", rendered);
}
