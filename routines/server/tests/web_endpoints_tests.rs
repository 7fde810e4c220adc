use axum::http::StatusCode;
use routines_server::web::create_app;
use serde_json::{Value, json};

mod common;

use common::{empty_request, json_request, send, setup_db, test_config};

async fn create_test_router() -> axum::Router {
    let db = setup_db().await.expect("Failed to setup test database");
    create_app(db, &test_config())
}

#[tokio::test]
async fn can_check_health_endpoint() {
    let app = create_test_router().await;

    let (status, body) = send(&app, empty_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn can_serve_openapi_document() {
    let app = create_test_router().await;

    let (status, body) = send(&app, empty_request("GET", "/api-docs/openapi.json", None)).await;

    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&body).unwrap();
    assert!(doc["paths"]["/routines/"].is_object());
    assert!(doc["paths"]["/auth/token"].is_object());
}

#[tokio::test]
async fn can_walk_through_registration_to_first_routine() {
    let app = create_test_router().await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            None,
            json!({
                "email": "a@x.com",
                "password": "pw",
                "username": "alice",
                "gender": "F",
                "goal": ["sleep"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        json_request("POST", "/auth/check", None, json!({ "email": "a@x.com" })),
    )
    .await;
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["registered"], "true");

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/verify",
            None,
            json!({ "email": "a@x.com", "pwd": "pw" }),
        ),
    )
    .await;
    let verified: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(verified["result"], "success");
    assert_eq!(verified["username"], "alice");

    let token_request = axum::http::Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("username=alice&password=pw"))
        .unwrap();
    let (status, body) = send(&app, token_request).await;
    assert_eq!(status, StatusCode::OK);
    let token = serde_json::from_str::<Value>(&body).unwrap()["token"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/routines/add-routine",
            Some(&token),
            json!({ "title": "Gym", "priority": 1, "complete": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, empty_request("GET", "/routines/", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let routines: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(routines.as_array().unwrap().len(), 1);
    assert_eq!(routines[0]["title"], "Gym");
}
