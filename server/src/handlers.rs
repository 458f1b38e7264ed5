//! HTTP handlers: extract, validate, call the service, attach `url`.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use json_patch::Patch;

use crate::error::TodoError;
use crate::model::{TodoItemRepresentation, TodoPayload};
use crate::service::TodoService;
use crate::storage::TodoRepository;
use crate::validation::validate_todo_input;

pub struct AppState<R> {
    pub service: Arc<TodoService<R>>,
}

impl<R> AppState<R> {
    pub fn new(service: TodoService<R>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

/// `<scheme>://<host>` of the current request, without a trailing slash.
///
/// The host comes from the `Host` header (falling back to the URI authority,
/// then `localhost`); the scheme from `X-Forwarded-Proto`, else `http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(pub String);

impl BaseUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for BaseUrl
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
        };

        let scheme = header_value("x-forwarded-proto").unwrap_or("http");
        let host = header_value("host")
            .or_else(|| parts.uri.authority().map(|authority| authority.as_str()))
            .unwrap_or("localhost");

        Ok(BaseUrl(format!("{scheme}://{host}")))
    }
}

pub async fn create_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    base_url: BaseUrl,
    Json(payload): Json<TodoPayload>,
) -> Result<(StatusCode, Json<TodoItemRepresentation>), TodoError> {
    let input = validate_todo_input(payload)?;
    let created = state.service.add_todo(input).await?;
    Ok((StatusCode::CREATED, Json(created.with_url(base_url.as_str()))))
}

pub async fn list_todos<R: TodoRepository>(
    State(state): State<AppState<R>>,
    base_url: BaseUrl,
) -> Result<Json<Vec<TodoItemRepresentation>>, TodoError> {
    let todos = state.service.retrieve_all_todos().await?;
    Ok(Json(
        todos
            .into_iter()
            .map(|todo| todo.with_url(base_url.as_str()))
            .collect(),
    ))
}

pub async fn get_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
    base_url: BaseUrl,
) -> Result<Json<TodoItemRepresentation>, TodoError> {
    let todo = state.service.retrieve_one_todo(id).await?;
    Ok(Json(todo.with_url(base_url.as_str())))
}

pub async fn update_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
    base_url: BaseUrl,
    Json(payload): Json<TodoPayload>,
) -> Result<Json<TodoItemRepresentation>, TodoError> {
    let input = validate_todo_input(payload)?;
    let updated = state.service.update_all_fields_of_todo(id, input).await?;
    Ok(Json(updated.with_url(base_url.as_str())))
}

/// Accepts `application/json-patch+json` as well as plain `application/json`.
pub async fn patch_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
    base_url: BaseUrl,
    Json(patch): Json<Patch>,
) -> Result<Json<TodoItemRepresentation>, TodoError> {
    let patched = state.service.patch_todo(id, &patch).await?;
    Ok(Json(patched.with_url(base_url.as_str())))
}

pub async fn delete_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, TodoError> {
    state.service.remove_todo(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_all_todos<R: TodoRepository>(
    State(state): State<AppState<R>>,
) -> Result<StatusCode, TodoError> {
    state.service.remove_all_todos().await?;
    Ok(StatusCode::NO_CONTENT)
}
