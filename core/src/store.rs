//! Key-value persistence and the locally persisted todo list.
//!
//! # Design
//! A `PersistentStore` holds whole string blobs under string keys, the same
//! shape as browser local storage. The todo list is stored as one JSON array
//! under [`STORAGE_KEY`]; there are no partial writes.
//!
//! Storage problems never reach the caller of `PersistedTodos`: an unreadable
//! or corrupt blob is treated as a first run, and a failed write is logged
//! and dropped. The in-memory list stays authoritative either way.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::collection::{Stamp, TodoCollection};
use crate::error::StoreError;
use crate::ids::{now_millis, IdSource};
use crate::policy::TitlePolicy;
use crate::types::{TodoId, TodoItem};

/// Key the todo list is stored under.
pub const STORAGE_KEY: &str = "todos";

/// Synchronous string key-value store.
pub trait PersistentStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

/// In-process store; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

impl<S: PersistentStore + ?Sized> PersistentStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // write-then-rename so a crash never leaves half a blob behind
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Read the collection stored under `key`, falling back to empty.
pub fn load_collection<S: PersistentStore + ?Sized>(store: &S, key: &str) -> TodoCollection {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return TodoCollection::new(),
        Err(e) => {
            tracing::warn!(key, error = %e, "reading stored todos failed, starting empty");
            return TodoCollection::new();
        }
    };
    match serde_json::from_str::<TodoCollection>(&raw) {
        Ok(collection) => collection,
        Err(e) => {
            tracing::warn!(key, error = %e, "stored todos unparsable, starting empty");
            TodoCollection::new()
        }
    }
}

/// Overwrite `key` with the serialized collection. Failures are logged only.
pub fn save_collection<S: PersistentStore + ?Sized>(
    store: &mut S,
    key: &str,
    collection: &TodoCollection,
) {
    let blob = match serde_json::to_string(collection) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::warn!(key, error = %e, "serializing todos failed");
            return;
        }
    };
    if let Err(e) = store.set(key, blob) {
        tracing::warn!(key, error = %e, "writing todos failed");
    }
}

/// Todo list mirrored to a `PersistentStore` after every change.
#[derive(Debug)]
pub struct PersistedTodos<S> {
    store: S,
    todos: TodoCollection,
    policy: TitlePolicy,
    ids: IdSource,
}

impl<S: PersistentStore> PersistedTodos<S> {
    /// Hydrate from `store`, or start empty if nothing usable is stored.
    pub fn open(store: S, policy: TitlePolicy) -> Self {
        let todos = load_collection(&store, STORAGE_KEY);
        tracing::debug!(count = todos.len(), "hydrated todos");
        let ids = IdSource::resume_after(todos.max_id());
        Self {
            store,
            todos,
            policy,
            ids,
        }
    }

    pub fn todos(&self) -> &TodoCollection {
        &self.todos
    }

    pub fn policy(&self) -> &TitlePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Add an item. Returns the new item, or `None` if the title was refused
    /// or no id is left.
    pub fn add(&mut self, title: &str) -> Option<&TodoItem> {
        self.policy.accept(title)?;
        let Some(id) = self.ids.next_id() else {
            tracing::warn!("no todo ids left, not adding");
            return None;
        };
        let stamp = Stamp {
            id,
            created_at: now_millis(),
        };
        let next = self.todos.add(title, &self.policy, stamp);
        if !self.commit(next) {
            return None;
        }
        self.todos.get(stamp.id)
    }

    /// Flip `completed` on `id`. Returns false if the id is unknown.
    pub fn toggle(&mut self, id: TodoId) -> bool {
        let next = self.todos.toggle(id);
        self.commit(next)
    }

    pub fn remove(&mut self, id: TodoId) -> bool {
        let next = self.todos.remove(id);
        self.commit(next)
    }

    /// Drop completed items. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.todos.len();
        let next = self.todos.clear_completed();
        self.commit(next);
        before - self.todos.len()
    }

    fn commit(&mut self, next: TodoCollection) -> bool {
        if next == self.todos {
            return false;
        }
        self.todos = next;
        tracing::debug!(count = self.todos.len(), "todos changed");
        save_collection(&mut self.store, STORAGE_KEY, &self.todos);
        true
    }
}
