use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use taskgate_api::{AppState, BookCatalog, create_router};
use taskgate_auth::{AuthSettings, TokenIssuer};
use taskgate_db::Database;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

async fn app() -> Router {
    let db = Database::in_memory().await.unwrap();
    let tokens = Arc::new(TokenIssuer::new(&AuthSettings {
        secret_key: SECRET.to_string(),
        access_token_expire_minutes: 60,
    }));
    let state = AppState::new(db, tokens, Arc::new(BookCatalog::seeded())).unwrap();
    create_router(state, None)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/register",
            None,
            json!({ "username": username, "password": password }),
        ),
    )
    .await
}

async fn login(app: &Router, path: &str, username: &str, password: &str) -> (StatusCode, Value) {
    let form = format!("grant_type=password&username={}&password={}", username, password);
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap(),
    )
    .await
}

async fn token_for(app: &Router, username: &str, password: &str) -> String {
    let (status, _) = register(app, username, password).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = login(app, "/token", username, password).await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn register_login_and_access_own_tasks() {
    let app = app().await;

    let (status, body) = register(&app, "alice", "pw123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User created");

    let (status, body) = login(&app, "/token", "alice", "pw123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 3600);
    let alice = body["access_token"].as_str().unwrap().to_string();

    let bob = token_for(&app, "bob", "hunter22").await;

    let (status, _) = send(
        &app,
        json_request("POST", "/tasks", Some(&alice), json!({ "title": "alice task" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        json_request("POST", "/tasks", Some(&bob), json!({ "title": "bob task" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/tasks", Some(&format!("Bearer {}", alice)))).await;
    assert_eq!(status, StatusCode::OK);
    let tasks = body.as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "alice task");
    assert_eq!(tasks[0]["completed"], false);

    let (status, body) = send(&app, get("/tasks", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Could not validate credentials");

    let (unsigned, signature) = alice.rsplit_once('.').unwrap();
    let first = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{}.{}{}", unsigned, first, &signature[1..]);
    let (status, _) = send(&app, get("/tasks", Some(&format!("Bearer {}", tampered)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_alias_and_me() {
    let app = app().await;
    let (status, _) = register(&app, "carol", "s3cret-pass").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(&app, "/login", "carol", "s3cret-pass").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap();

    let (status, body) = send(&app, get("/me", Some(&format!("Bearer {}", token)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "carol");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = app().await;

    let (status, _) = register(&app, "alice", "pw123").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = register(&app, "alice", "other-password").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already taken");
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let app = app().await;

    let (status, body) = register(&app, "alice", "pw123").await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(
        &app,
        json_request("POST", "/register", None, json!({ "username": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("password"));

    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=alice"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, token) = login(&app, "/token", "alice", "pw123").await;
    let token = token["access_token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, get("/tasks/abc", Some(&format!("Bearer {}", token)))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, get("/books/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn look_alike_usernames_are_rejected() {
    let app = app().await;

    let (status, body) = register(&app, "\u{430}lice", "pw123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let app = app().await;
    register(&app, "alice", "pw123").await;

    let wrong_password = login(&app, "/token", "alice", "nope").await;
    let unknown_user = login(&app, "/token", "nobody", "pw123").await;

    assert_eq!(wrong_password.0, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn gate_rejects_malformed_headers_and_foreign_tokens() {
    let app = app().await;
    token_for(&app, "alice", "pw123").await;

    for value in ["Basic YWxpY2U6cHcxMjM=", "Bearer", "Bearer not.a.jwt"] {
        let (status, _) = send(&app, get("/tasks", Some(value))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "header: {}", value);
    }

    let foreign = TokenIssuer::new(&AuthSettings {
        secret_key: "someone-else".to_string(),
        access_token_expire_minutes: 60,
    })
    .issue_default("alice")
    .unwrap();
    let (status, _) = send(&app, get("/tasks", Some(&format!("Bearer {}", foreign)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correctly signed, but nobody by that name was ever registered
    let ghost = TokenIssuer::new(&AuthSettings {
        secret_key: SECRET.to_string(),
        access_token_expire_minutes: 60,
    })
    .issue_default("ghost")
    .unwrap();
    let (status, _) = send(&app, get("/tasks", Some(&format!("Bearer {}", ghost)))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn task_lifecycle_and_ownership() {
    let app = app().await;
    let alice = token_for(&app, "alice", "pw123").await;
    let bob = token_for(&app, "bob", "hunter22").await;

    let (status, task) = send(
        &app,
        json_request(
            "POST",
            "/tasks",
            Some(&alice),
            json!({ "title": "write report", "description": "quarterly" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = task["id"].as_i64().unwrap();
    let path = format!("/tasks/{}", id);

    let (status, _) = send(&app, get(&path, Some(&format!("Bearer {}", bob)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request("PUT", &path, Some(&bob), json!({ "title": "mine now" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            &path,
            Some(&alice),
            json!({ "title": "write report", "completed": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["description"], Value::Null);

    let (status, _) = send(
        &app,
        json_request("POST", "/tasks", Some(&alice), json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let delete = |token: &str| {
        Request::builder()
            .method("DELETE")
            .uri(&path)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&app, delete(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, delete(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let (status, _) = send(&app, get(&path, Some(&format!("Bearer {}", alice)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn books_are_public() {
    let app = app().await;

    let (status, body) = send(&app, get("/books", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let book = json!({ "id": 3, "title": "MAHABHARATA", "author": "VYASA", "year": 0 });
    let (status, _) = send(&app, json_request("POST", "/books", None, book.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, json_request("POST", "/books", None, book)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/books/3", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"], "VYASA");

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/books/3",
            None,
            json!({ "id": 3, "title": "MAHABHARATA", "author": "VYASA", "year": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year"], 1);

    let (status, body) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/books/3")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["id"], 3);

    let (status, body) = send(&app, get("/books/3", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book not found");
}

#[tokio::test]
async fn health_endpoints() {
    let app = app().await;

    for path in ["/health", "/healthz"] {
        let (status, body) = send(&app, get(path, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
