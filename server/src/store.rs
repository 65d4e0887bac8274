//! In-memory todo storage owned by one running app.

use std::sync::Arc;

use tokio::sync::RwLock;
use todo_core::ids::now_millis;
use todo_core::{IdSource, TodoId, TodoItem};

/// Shared handle to the todo list. Cloning shares the same list; a fresh
/// `TodoStore::new()` starts empty.
#[derive(Clone, Default)]
pub struct TodoStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    todos: Vec<TodoItem>,
    ids: IdSource,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All items in creation order.
    pub async fn list(&self) -> Vec<TodoItem> {
        self.inner.read().await.todos.clone()
    }

    /// Append an item. `title` must already be validated. `None` once ids
    /// are exhausted.
    pub async fn create(&self, title: String) -> Option<TodoItem> {
        let mut inner = self.inner.write().await;
        let now = now_millis();
        let todo = TodoItem {
            id: inner.ids.next_at(now)?,
            title,
            completed: false,
            created_at: Some(now),
        };
        inner.todos.push(todo.clone());
        Some(todo)
    }

    /// Merge the given fields into `id`. `None` if the id is unknown.
    pub async fn update(
        &self,
        id: TodoId,
        title: Option<String>,
        completed: Option<bool>,
    ) -> Option<TodoItem> {
        let mut inner = self.inner.write().await;
        let todo = inner.todos.iter_mut().find(|t| t.id == id)?;
        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(completed) = completed {
            todo.completed = completed;
        }
        Some(todo.clone())
    }

    /// Remove `id`. Returns false if it was not there.
    pub async fn delete(&self, id: TodoId) -> bool {
        let mut inner = self.inner.write().await;
        let before = inner.todos.len();
        inner.todos.retain(|t| t.id != id);
        inner.todos.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_increasing_ids() {
        let store = TodoStore::new();
        let a = store.create("a".to_string()).await.unwrap();
        let b = store.create("b".to_string()).await.unwrap();
        assert!(b.id > a.id);
        assert!(!a.completed);
        assert!(a.created_at.is_some());
        assert_eq!(store.list().await, vec![a, b]);
    }

    #[tokio::test]
    async fn update_merges_present_fields_only() {
        let store = TodoStore::new();
        let a = store.create("a".to_string()).await.unwrap();
        let updated = store.update(a.id, None, Some(true)).await.unwrap();
        assert_eq!(updated.title, "a");
        assert!(updated.completed);
        assert_eq!(updated.created_at, a.created_at);
        assert!(store.update(a.id + 1, None, Some(true)).await.is_none());
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = TodoStore::new();
        let a = store.create("a".to_string()).await.unwrap();
        assert!(store.delete(a.id).await);
        assert!(!store.delete(a.id).await);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn separate_stores_do_not_share_state() {
        let first = TodoStore::new();
        first.create("a".to_string()).await.unwrap();
        assert!(TodoStore::new().list().await.is_empty());
        assert_eq!(first.clone().list().await.len(), 1);
    }
}
