//! The remote todo service seen from the client side.
//!
//! `RemoteTodoService` is the CRUD contract the sync layer talks to.
//! `HttpTodoService` implements it by pairing the [`TodoClient`] codec with a
//! [`Transport`] that performs the actual round trip.

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{TodoId, TodoItem};

/// CRUD operations offered by a todo service.
pub trait RemoteTodoService {
    fn list(&self) -> Result<Vec<TodoItem>, ApiError>;
    /// Create an item; the returned item carries the server-assigned id.
    fn create(&self, title: &str) -> Result<TodoItem, ApiError>;
    fn update(&self, item: &TodoItem) -> Result<TodoItem, ApiError>;
    fn delete(&self, id: TodoId) -> Result<(), ApiError>;
}

impl<S: RemoteTodoService + ?Sized> RemoteTodoService for &S {
    fn list(&self) -> Result<Vec<TodoItem>, ApiError> {
        (**self).list()
    }

    fn create(&self, title: &str) -> Result<TodoItem, ApiError> {
        (**self).create(title)
    }

    fn update(&self, item: &TodoItem) -> Result<TodoItem, ApiError> {
        (**self).update(item)
    }

    fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        (**self).delete(id)
    }
}

/// Executes one HTTP round trip. Non-2xx statuses are data, not errors; only
/// a failure to obtain a response at all is `Err`.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `RemoteTodoService` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTodoService<T> {
    client: TodoClient,
    transport: T,
}

impl<T: Transport> HttpTodoService<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            client: TodoClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }
}

impl<T: Transport> RemoteTodoService for HttpTodoService<T> {
    fn list(&self) -> Result<Vec<TodoItem>, ApiError> {
        let response = self.transport.execute(self.client.build_list_todos())?;
        self.client.parse_list_todos(response)
    }

    fn create(&self, title: &str) -> Result<TodoItem, ApiError> {
        let request = self.client.build_create_todo(title)?;
        self.client.parse_create_todo(self.transport.execute(request)?)
    }

    fn update(&self, item: &TodoItem) -> Result<TodoItem, ApiError> {
        let request = self.client.build_update_todo(item)?;
        self.client.parse_update_todo(self.transport.execute(request)?)
    }

    fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_todo(id))?;
        self.client.parse_delete_todo(response)
    }
}

/// Blocking transport backed by ureq.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        // Status interpretation belongs to TodoClient, so 4xx/5xx come back
        // as responses.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let agent = &self.agent;
        let url = request.url.as_str();
        let result = match (request.method, request.body) {
            (HttpMethod::Get, _) => agent.get(url).call(),
            (HttpMethod::Delete, _) => agent.delete(url).call(),
            (HttpMethod::Post, Some(body)) => agent
                .post(url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => agent.post(url).send_empty(),
            (HttpMethod::Put, Some(body)) => agent
                .put(url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => agent.put(url).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(HttpResponse::new(status, body))
    }
}
