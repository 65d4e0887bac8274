use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use todo_core::{TitlePolicy, TodoItem};
use todo_server::{app, app_with, AppState};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn error_message(response: axum::response::Response) -> String {
    let body: serde_json::Value = body_json(response).await;
    body["error"].as_str().unwrap().to_string()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<TodoItem> = body_json(resp).await;
    assert!(todos.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_trimmed_title() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"title":"  Buy milk  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: TodoItem = body_json(resp).await;
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
    assert!(todo.created_at.is_some());
}

#[tokio::test]
async fn create_todo_ignores_client_completed_flag() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Sneaky","completed":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: TodoItem = body_json(resp).await;
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_without_title_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Title is required");
}

#[tokio::test]
async fn create_todo_blank_title_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"title":"   "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Title is required");
}

#[tokio::test]
async fn create_todo_over_length_returns_400() {
    let body = serde_json::json!({ "title": "x".repeat(41) }).to_string();
    let resp = app()
        .oneshot(json_request("POST", "/todos", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Title must be at most 40 characters");
}

#[tokio::test]
async fn create_todo_respects_configured_policy() {
    let state = AppState {
        policy: TitlePolicy::unbounded(),
        ..AppState::default()
    };
    let body = serde_json::json!({ "title": "x".repeat(200) }).to_string();
    let resp = app_with(state)
        .oneshot(json_request("POST", "/todos", &body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn create_todo_malformed_json_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(resp).await.starts_with("Invalid request body"));
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos", r#"{"id":12345,"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Todo not found");
}

#[tokio::test]
async fn update_todo_without_id_returns_400() {
    let resp = app()
        .oneshot(json_request("PUT", "/todos", r#"{"completed":true}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_missing_id_returns_400() {
    let resp = app().oneshot(empty_request("DELETE", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "ID is required");
}

#[tokio::test]
async fn delete_todo_non_numeric_id_returns_400() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/todos?id=abc"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "ID must be an integer");
}

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/todos?id=12345"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create two
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Walk dog"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let first: TodoItem = body_json(resp).await;

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Feed cat"}"#))
        .await
        .unwrap();
    let second: TodoItem = body_json(resp).await;
    assert!(second.id > first.id);

    // list keeps creation order
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos"))
        .await
        .unwrap();
    let todos: Vec<TodoItem> = body_json(resp).await;
    assert_eq!(todos, vec![first.clone(), second.clone()]);

    // update: only completed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            "/todos",
            &format!(r#"{{"id":{},"completed":true}}"#, first.id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: TodoItem = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog"); // unchanged
    assert!(updated.completed);
    assert_eq!(updated.created_at, first.created_at);

    // update: full item, title trimmed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            "/todos",
            &format!(r#"{{"id":{},"title":" Walk cat ","completed":true}}"#, first.id),
        ))
        .await
        .unwrap();
    let updated: TodoItem = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");

    // update: blank title refused, item untouched
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            "/todos",
            &format!(r#"{{"id":{},"title":""}}"#, first.id),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/todos?id={}", first.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ack: serde_json::Value = body_json(resp).await;
    assert_eq!(ack, serde_json::json!({"success": true}));

    // delete again: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/todos?id={}", first.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos"))
        .await
        .unwrap();
    let todos: Vec<TodoItem> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, second.id);
    assert_eq!(todos[0].title, "Feed cat");
}
