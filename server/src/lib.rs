//! HTTP todo service.
//!
//! A single `/todos` resource:
//!
//! | Method | Request | Success |
//! |---|---|---|
//! | GET | — | 200, array of items in creation order |
//! | POST | `{title}` | 201, the new item |
//! | PUT | `{id, title?, completed?}` | 200, the merged item |
//! | DELETE | `?id=<id>` | 200, `{success: true}` |
//!
//! Every 4xx carries `{error: "<message>"}`. State lives in a [`TodoStore`]
//! created per [`app`] call, so each router (and each test) gets its own list.

pub mod config;
pub mod error;
pub mod store;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use todo_core::{DeleteAck, TitlePolicy, TodoId, TodoItem, UpdateTodo};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::AppError;
pub use store::TodoStore;

#[derive(Clone, Default)]
pub struct AppState {
    pub store: TodoStore,
    pub policy: TitlePolicy,
}

/// POST body. A missing title is treated like an empty one.
#[derive(Deserialize)]
struct NewTodo {
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct DeleteParams {
    id: Option<String>,
}

pub fn app() -> Router {
    app_with(AppState::default())
}

pub fn app_with(state: AppState) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos)
                .post(create_todo)
                .put(update_todo)
                .delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve with `policy` until ctrl-c.
pub async fn serve(listener: TcpListener, policy: TitlePolicy) -> Result<(), std::io::Error> {
    let state = AppState {
        store: TodoStore::new(),
        policy,
    };
    axum::serve(listener, app_with(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler failed");
            }
            tracing::info!("shutting down");
        })
        .await
}

async fn list_todos(State(state): State<AppState>) -> Json<Vec<TodoItem>> {
    Json(state.store.list().await)
}

async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoItem>), AppError> {
    let Json(input) = payload?;
    let title = state.policy.validate(&input.title)?;
    let todo = state.store.create(title).await.ok_or(AppError::IdsExhausted)?;
    tracing::debug!(id = todo.id, "todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<TodoItem>, AppError> {
    let Json(input) = payload?;
    let title = input
        .title
        .as_deref()
        .map(|t| state.policy.validate(t))
        .transpose()?;
    let todo = state
        .store
        .update(input.id, title, input.completed)
        .await
        .ok_or(AppError::NotFound)?;
    tracing::debug!(id = todo.id, completed = todo.completed, "todo updated");
    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteAck>, AppError> {
    let raw = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or(AppError::MissingId)?;
    let id: TodoId = raw.trim().parse().map_err(|_| AppError::InvalidId)?;
    if !state.store.delete(id).await {
        return Err(AppError::NotFound);
    }
    tracing::debug!(id, "todo deleted");
    Ok(Json(DeleteAck { success: true }))
}
