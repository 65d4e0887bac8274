//! Error types for the todo client and local storage.
//!
//! # Design
//! `NotFound` and `Rejected` get dedicated variants because the service uses
//! 404 and 400 to say something specific (unknown id, refused input). All
//! other non-success responses land in `Http` with the raw status and body.
//! Failures to reach the service at all are `Transport`.

use thiserror::Error;

/// Errors returned by `TodoClient` parse methods and `RemoteTodoService`
/// implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404: the todo does not exist.
    #[error("todo not found")]
    NotFound,

    /// The server returned 400 with the given message.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The server returned a status other than the expected one, 400 or 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialize(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// Errors from a [`PersistentStore`](crate::store::PersistentStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}
