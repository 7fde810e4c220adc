use axum::body::Body;
use axum::http::{Request, StatusCode};
use insta::assert_yaml_snapshot;
use regex::Regex;
use routines_server::auth::decode_jwt;
use routines_server::web::create_app;
use serde_json::{Value, json};

mod common;

use common::{JWT_SECRET, json_request, send, setup_db, test_config};

async fn create_test_app() -> axum::Router {
    let db = setup_db().await.expect("Failed to setup test database");
    create_app(db, &test_config())
}

fn alice() -> Value {
    json!({
        "email": "a@x.com",
        "password": "pw",
        "username": "alice",
        "gender": "F",
        "goal": ["sleep", "read"]
    })
}

fn token_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            username, password
        )))
        .unwrap()
}

#[tokio::test]
async fn can_register_with_empty_response() {
    let app = create_test_app().await;

    let (status, body) = send(&app, json_request("POST", "/auth/register", None, alice())).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn can_reject_duplicate_registration() {
    let app = create_test_app().await;
    send(&app, json_request("POST", "/auth/register", None, alice())).await;

    let (status, body) = send(&app, json_request("POST", "/auth/register", None, alice())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn can_reject_registration_with_missing_field() {
    let app = create_test_app().await;
    let payload = json!({ "email": "a@x.com", "password": "pw" });

    let (status, body) = send(&app, json_request("POST", "/auth/register", None, payload)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn can_check_whether_email_is_registered() {
    let app = create_test_app().await;
    send(&app, json_request("POST", "/auth/register", None, alice())).await;

    let (status, known) = send(
        &app,
        json_request("POST", "/auth/check", None, json!({ "email": "a@x.com" })),
    )
    .await;
    let (_, unknown) = send(
        &app,
        json_request("POST", "/auth/check", None, json!({ "email": "b@x.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&known).unwrap(),
        json!({ "registered": "true" })
    );
    assert_eq!(
        serde_json::from_str::<Value>(&unknown).unwrap(),
        json!({ "registered": "false" })
    );
}

#[tokio::test]
async fn can_verify_registered_user() {
    let app = create_test_app().await;
    send(&app, json_request("POST", "/auth/register", None, alice())).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/verify",
            None,
            json!({ "email": "a@x.com", "pwd": "pw" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&body).unwrap(),
        json!({
            "result": "success",
            "username": "alice",
            "gender": "F",
            "goal": ["sleep", "read"]
        })
    );
}

#[tokio::test]
async fn failed_verification_does_not_reveal_which_field_was_wrong() {
    let app = create_test_app().await;
    send(&app, json_request("POST", "/auth/register", None, alice())).await;

    let (wrong_password_status, wrong_password) = send(
        &app,
        json_request(
            "POST",
            "/auth/verify",
            None,
            json!({ "email": "a@x.com", "pwd": "nope" }),
        ),
    )
    .await;
    let (unknown_email_status, unknown_email) = send(
        &app,
        json_request(
            "POST",
            "/auth/verify",
            None,
            json!({ "email": "z@x.com", "pwd": "pw" }),
        ),
    )
    .await;

    assert_eq!(wrong_password_status, unknown_email_status);
    assert_eq!(wrong_password, unknown_email);
    let body: Value = serde_json::from_str(&wrong_password).unwrap();
    assert_yaml_snapshot!(body, @"result: fail");
}

#[tokio::test]
async fn can_issue_token_for_valid_form_credentials() {
    let app = create_test_app().await;
    send(&app, json_request("POST", "/auth/register", None, alice())).await;

    let (status, body) = send(&app, token_request("alice", "pw")).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    let token = body["token"].as_str().expect("token should be a string");
    let jwt_shape = Regex::new(r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$").unwrap();
    assert!(jwt_shape.is_match(token));
    assert_eq!(decode_jwt(token, JWT_SECRET).unwrap().sub, "alice");
}

#[tokio::test]
async fn can_reject_token_request_with_bad_credentials() {
    let app = create_test_app().await;
    send(&app, json_request("POST", "/auth/register", None, alice())).await;

    let response = tower::ServiceExt::oneshot(app.clone(), token_request("alice", "nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers().get("www-authenticate").unwrap(), "Bearer");

    let (status, body) = send(&app, token_request("nobody", "pw")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_yaml_snapshot!(body, @r#"
    error: UNAUTHORIZED
    message: Could not validate credentials
    "#);
}
