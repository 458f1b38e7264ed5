use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::json;
use todo_server::{app, ErrorResponse, TodoItemRepresentation};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn patch_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json-patch+json")
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

/// Send through a clone of `app`; clones share the same store.
async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create(app: &Router, body: &str) -> TodoItemRepresentation {
    let resp = send(app, json_request("POST", "/todos", body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = send(&app(), empty_request("GET", "/todos")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<TodoItemRepresentation> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_sets_url_on_every_item() {
    let app = app();
    create(&app, r#"{"title":"Task one","order":10}"#).await;
    create(&app, r#"{"title":"Task two","order":15}"#).await;
    create(&app, r#"{"title":"Task three","order":20}"#).await;

    let resp = send(&app, empty_request("GET", "/todos")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<TodoItemRepresentation> = body_json(resp).await;
    assert_eq!(todos.len(), 3);
    for todo in &todos {
        assert_eq!(todo.url, format!("http://localhost/todos/{}", todo.id));
    }
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_url() {
    let resp = send(
        &app(),
        json_request(
            "POST",
            "/todos",
            r#"{"title":"Task one","completed":false,"order":10}"#,
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: serde_json::Value = body_json(resp).await;
    assert_eq!(
        todo,
        json!({
            "id": 1,
            "title": "Task one",
            "completed": false,
            "order": 10,
            "url": "http://localhost/todos/1"
        })
    );
}

#[tokio::test]
async fn create_todo_defaults_completed_and_order() {
    let todo = create(&app(), r#"{"title":"Buy milk"}"#).await;
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
    assert_eq!(todo.order, 0);
}

#[tokio::test]
async fn create_todo_url_follows_host_header() {
    let request = Request::builder()
        .method("POST")
        .uri("/todos")
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::HOST, "todos.example.org:8443")
        .header("x-forwarded-proto", "https")
        .body(r#"{"title":"Remote"}"#.to_string())
        .unwrap();
    let resp = send(&app(), request).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(todo.url, "https://todos.example.org:8443/todos/1");
}

#[tokio::test]
async fn create_todo_with_null_title_returns_400_and_persists_nothing() {
    let app = app();
    let resp = send(
        &app,
        json_request(
            "POST",
            "/todos",
            r#"{"title":null,"completed":false,"order":0}"#,
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = body_json(resp).await;
    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(error.field.as_deref(), Some("title"));

    let resp = send(&app, empty_request("GET", "/todos")).await;
    let todos: Vec<TodoItemRepresentation> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn create_todo_with_missing_title_returns_400() {
    let resp = send(&app(), json_request("POST", "/todos", r#"{"completed":true}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_todo_with_wrong_field_type_returns_422() {
    let resp = send(&app(), json_request("POST", "/todos", r#"{"title":1}"#)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- get ---

#[tokio::test]
async fn get_todo_not_found() {
    let resp = send(&app(), empty_request("GET", "/todos/2")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = body_json(resp).await;
    assert_eq!(error.code, "TODO_NOT_FOUND");
}

#[tokio::test]
async fn get_todo_bad_id_returns_400() {
    let resp = send(&app(), empty_request("GET", "/todos/not-a-number")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_todo_replaces_all_fields() {
    let app = app();
    let created = create(&app, r#"{"title":"Task","completed":false,"order":1}"#).await;

    let resp = send(
        &app,
        json_request(
            "PUT",
            &format!("/todos/{}", created.id),
            r#"{"title":"Updated Task","completed":true,"order":12}"#,
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let updated: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(
        updated,
        TodoItemRepresentation {
            id: created.id,
            title: "Updated Task".to_string(),
            completed: true,
            order: 12,
            url: format!("http://localhost/todos/{}", created.id),
        }
    );
}

#[tokio::test]
async fn update_todo_is_an_overwrite_not_a_merge() {
    let app = app();
    let created = create(&app, r#"{"title":"Task","completed":true,"order":7}"#).await;

    let resp = send(
        &app,
        json_request("PUT", &format!("/todos/{}", created.id), r#"{"title":"Only title"}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let updated: TodoItemRepresentation = body_json(resp).await;
    assert!(!updated.completed);
    assert_eq!(updated.order, 0);
}

#[tokio::test]
async fn update_todo_not_found() {
    let resp = send(&app(), json_request("PUT", "/todos/1", r#"{"title":"Nope"}"#)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_todo_with_null_title_returns_400() {
    let app = app();
    let created = create(&app, r#"{"title":"Task"}"#).await;

    let resp = send(
        &app,
        json_request("PUT", &format!("/todos/{}", created.id), r#"{"title":null}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- patch ---

#[tokio::test]
async fn patch_completed_leaves_other_fields_unchanged() {
    let app = app();
    let created = create(&app, r#"{"title":"Task one","completed":false,"order":10}"#).await;

    let resp = send(
        &app,
        patch_request(
            &format!("/todos/{}", created.id),
            r#"[{"op":"replace","path":"/completed","value":true}]"#,
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let patched: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(
        patched,
        TodoItemRepresentation {
            completed: true,
            ..created
        }
    );
}

#[tokio::test]
async fn patch_accepts_plain_json_content_type() {
    let app = app();
    let created = create(&app, r#"{"title":"Updated Task","completed":true,"order":12}"#).await;

    let resp = send(
        &app,
        json_request(
            "PATCH",
            &format!("/todos/{}", created.id),
            r#"[{"op":"replace","path":"/completed","value":false},{"op":"replace","path":"/order","value":101}]"#,
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let patched: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(patched.title, "Updated Task");
    assert!(!patched.completed);
    assert_eq!(patched.order, 101);
}

#[tokio::test]
async fn patch_with_failing_test_returns_422_and_keeps_item() {
    let app = app();
    let created = create(&app, r#"{"title":"Task"}"#).await;
    let uri = format!("/todos/{}", created.id);

    let resp = send(
        &app,
        patch_request(
            &uri,
            r#"[{"op":"replace","path":"/title","value":"Changed"},{"op":"test","path":"/completed","value":true}]"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = body_json(resp).await;
    assert_eq!(error.code, "PATCH_FAILED");

    let resp = send(&app, empty_request("GET", &uri)).await;
    let stored: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(stored, created);
}

#[tokio::test]
async fn patch_with_unknown_operation_is_rejected() {
    let app = app();
    let created = create(&app, r#"{"title":"Task"}"#).await;

    let resp = send(
        &app,
        patch_request(
            &format!("/todos/{}", created.id),
            r#"[{"op":"frobnicate","path":"/title"}]"#,
        ),
    )
    .await;
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn patch_not_found() {
    let resp = send(
        &app(),
        patch_request("/todos/3", r#"[{"op":"replace","path":"/completed","value":true}]"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = send(&app(), empty_request("DELETE", "/todos/2")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_then_get_returns_404() {
    let app = app();
    create(&app, r#"{"title":"Task one"}"#).await;

    let resp = send(&app, empty_request("DELETE", "/todos/1")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&app, empty_request("GET", "/todos/1")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_all_twice_returns_204_and_empties_list() {
    let app = app();
    create(&app, r#"{"title":"a"}"#).await;
    create(&app, r#"{"title":"b"}"#).await;

    for _ in 0..2 {
        let resp = send(&app, empty_request("DELETE", "/todos")).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = send(&app, empty_request("GET", "/todos")).await;
        let todos: Vec<TodoItemRepresentation> = body_json(resp).await;
        assert!(todos.is_empty());
    }
}

// --- middleware ---

#[tokio::test]
async fn cors_preflight_is_permitted() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/todos/1")
        .header(http::header::ORIGIN, "http://frontend.example")
        .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .body(String::new())
        .unwrap();
    let resp = send(&app(), request).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
    let methods = resp
        .headers()
        .get(http::header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("PATCH"));
}

#[tokio::test]
async fn cors_preflight_lists_only_the_collection_methods() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/todos")
        .header(http::header::ORIGIN, "http://frontend.example")
        .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .body(String::new())
        .unwrap();
    let resp = send(&app(), request).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let methods = resp
        .headers()
        .get(http::header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    for method in ["GET", "POST", "DELETE"] {
        assert!(methods.contains(method), "{method} missing from {methods}");
    }
    assert!(!methods.contains("PATCH"));
    assert!(!methods.contains("PUT"));
}

#[tokio::test]
async fn simple_cors_request_gets_allow_origin() {
    let request = Request::builder()
        .uri("/todos")
        .header(http::header::ORIGIN, "http://frontend.example")
        .body(String::new())
        .unwrap();
    let resp = send(&app(), request).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(http::header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let resp = send(&app(), empty_request("GET", "/todos")).await;
    assert!(resp.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/todos")
        .header("x-request-id", "abc-123")
        .body(String::new())
        .unwrap();
    let resp = send(&app(), request).await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
}

#[tokio::test]
async fn health_returns_ok() {
    let resp = send(&app(), empty_request("GET", "/health")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "OK");
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    let app = app();

    // create
    let created = create(&app, r#"{"title":"Walk dog","order":3}"#).await;
    assert_eq!(created.title, "Walk dog");
    assert!(!created.completed);
    let uri = format!("/todos/{}", created.id);

    // list
    let resp = send(&app, empty_request("GET", "/todos")).await;
    let todos: Vec<TodoItemRepresentation> = body_json(resp).await;
    assert_eq!(todos, vec![created.clone()]);

    // get
    let resp = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(fetched, created);

    // full update
    let resp = send(
        &app,
        json_request("PUT", &uri, r#"{"title":"Walk cat","completed":false,"order":4}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.title, "Walk cat");

    // partial update
    let resp = send(
        &app,
        patch_request(&uri, r#"[{"op":"replace","path":"/completed","value":true}]"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: TodoItemRepresentation = body_json(resp).await;
    assert_eq!(patched.title, "Walk cat"); // unchanged
    assert_eq!(patched.order, 4); // unchanged
    assert!(patched.completed);

    // delete
    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // get after delete
    let resp = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // delete again
    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete
    let resp = send(&app, empty_request("GET", "/todos")).await;
    let todos: Vec<TodoItemRepresentation> = body_json(resp).await;
    assert!(todos.is_empty());
}
