//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is a `build_*` method
//! producing an `HttpRequest` and a `parse_*` method consuming the matching
//! `HttpResponse`; the caller performs the I/O in between.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{PatchOperation, Todo, TodoInput};

const JSON: &str = "application/json";
const JSON_PATCH: &str = "application/json-patch+json";

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The URL the server is expected to report in `Todo::url` for `id`.
    pub fn todo_url(&self, id: i64) -> String {
        format!("{}/todos/{id}", self.base_url)
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        bodiless(HttpMethod::Get, self.collection_url())
    }

    pub fn build_get_todo(&self, id: i64) -> HttpRequest {
        bodiless(HttpMethod::Get, self.todo_url(id))
    }

    pub fn build_create_todo(&self, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        with_body(HttpMethod::Post, self.collection_url(), JSON, input)
    }

    pub fn build_update_todo(&self, id: i64, input: &TodoInput) -> Result<HttpRequest, ApiError> {
        with_body(HttpMethod::Put, self.todo_url(id), JSON, input)
    }

    pub fn build_patch_todo(
        &self,
        id: i64,
        operations: &[PatchOperation],
    ) -> Result<HttpRequest, ApiError> {
        with_body(HttpMethod::Patch, self.todo_url(id), JSON_PATCH, operations)
    }

    pub fn build_delete_todo(&self, id: i64) -> HttpRequest {
        bodiless(HttpMethod::Delete, self.todo_url(id))
    }

    pub fn build_delete_all_todos(&self) -> HttpRequest {
        bodiless(HttpMethod::Delete, self.collection_url())
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        parse_body(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }

    pub fn parse_patch_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_delete_all_todos(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

fn bodiless(method: HttpMethod, path: String) -> HttpRequest {
    HttpRequest {
        method,
        path,
        headers: Vec::new(),
        body: None,
    }
}

fn with_body<T: serde::Serialize + ?Sized>(
    method: HttpMethod,
    path: String,
    content_type: &str,
    payload: &T,
) -> Result<HttpRequest, ApiError> {
    let body =
        serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        path,
        headers: vec![("content-type".to_string(), content_type.to_string())],
        body: Some(body),
    })
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        status @ (400 | 422) => Err(ApiError::BadRequest {
            status,
            body: response.body.clone(),
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
