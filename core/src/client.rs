//! Stateless HTTP request builder and response parser for the todo service.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`; the caller executes the round trip in between.
//!
//! The service exposes a single `/todos` resource: updates carry the id in
//! the body and deletes carry it in the query string.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, DeleteAck, ErrorBody, TodoId, TodoItem, UpdateTodo};

/// Synchronous, stateless codec for the todo service.
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

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.todos_url(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, title: &str) -> Result<HttpRequest, ApiError> {
        let input = CreateTodo {
            title: title.to_string(),
        };
        json_request(HttpMethod::Post, self.todos_url(), &input)
    }

    /// PUT the full item; the server merges every field present.
    pub fn build_update_todo(&self, item: &TodoItem) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, self.todos_url(), &UpdateTodo::from(item))
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: format!("{}?id={id}", self.todos_url()),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    /// Accepts 201, and 200 from older servers.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        check_status(&response, &[201, 200])?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        check_status(&response, &[200])?;
        decode(&response.body)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, &[200])?;
        let ack: DeleteAck = decode(&response.body)?;
        if !ack.success {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}

fn json_request<T: serde::Serialize>(
    method: HttpMethod,
    url: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body = serde_json::to_string(input).map_err(|e| ApiError::Serialize(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialize(e.to_string()))
}

/// Map non-success status codes to the matching `ApiError` variant.
fn check_status(response: &HttpResponse, expected: &[u16]) -> Result<(), ApiError> {
    if expected.contains(&response.status) {
        return Ok(());
    }
    match response.status {
        404 => Err(ApiError::NotFound),
        400 => {
            let message = serde_json::from_str::<ErrorBody>(&response.body)
                .map(|b| b.error)
                .unwrap_or_else(|_| response.body.clone());
            Err(ApiError::Rejected(message))
        }
        status => Err(ApiError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}
