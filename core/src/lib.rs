//! Todo list core: the collection, its persistence, and its remote sync.
//!
//! # Overview
//! - [`collection`]: `TodoCollection` and its pure operations (add, toggle,
//!   remove, clear-completed, filter, sort, search).
//! - [`store`]: a key-value `PersistentStore` and `PersistedTodos`, which
//!   writes the whole list back after every change.
//! - [`client`] / [`http`]: request building and response parsing for the
//!   todo service, with the network round trip left to the caller.
//! - [`remote`]: the `RemoteTodoService` contract and its HTTP implementation.
//! - [`sync`]: `SyncedTodos`, optimistic updates with per-item compensation.
//!
//! # Design
//! - Everything that decides *what* the list looks like is a pure function
//!   of the current list and its arguments; I/O lives at the edges.
//! - The wire types are defined here and shared with the server crate so the
//!   title policy and entity shape exist once.

pub mod client;
pub mod collection;
pub mod error;
pub mod http;
pub mod ids;
pub mod policy;
pub mod remote;
pub mod store;
pub mod sync;
pub mod types;

pub use client::TodoClient;
pub use collection::{FilterMode, ParseModeError, SortKey, Stamp, TodoCollection, View};
pub use error::{ApiError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use ids::{IdSource, TempIds};
pub use policy::{TitleError, TitlePolicy, DEFAULT_MAX_TITLE_LEN};
pub use remote::{HttpTodoService, RemoteTodoService, Transport, UreqTransport};
pub use store::{FileStore, MemoryStore, PersistedTodos, PersistentStore, STORAGE_KEY};
pub use sync::{Pending, Reply, SyncedTodos};
pub use types::{CreateTodo, DeleteAck, ErrorBody, TodoId, TodoItem, UpdateTodo};
