//! Optimistic synchronization with a remote todo service.
//!
//! # Design
//! Every remote-backed operation has two phases. `begin_*` applies the change
//! to the local collection right away and returns a [`Pending`] describing
//! the remote call still owed. Once that call has an answer, [`settle`]
//! folds it back in. Hosts may keep several `Pending`s in flight and settle
//! them in any order.
//!
//! Failures are compensated per item: a failed create removes only its own
//! placeholder, a failed delete re-inserts only that item, and a failed
//! toggle touches only that item's flag. Toggles on one item are numbered;
//! only the failure of the most recent one resets the flag, and it resets it
//! to the last value the service confirmed. Nothing is restored from a whole-list snapshot,
//! so a late failure never discards other changes made in the meantime.
//!
//! [`settle`]: SyncedTodos::settle

use std::collections::HashMap;

use crate::collection::{Stamp, TodoCollection};
use crate::error::ApiError;
use crate::ids::{now_millis, TempIds};
use crate::policy::TitlePolicy;
use crate::remote::RemoteTodoService;
use crate::store::{save_collection, PersistentStore, STORAGE_KEY};
use crate::types::{TodoId, TodoItem};

/// A remote call owed for a change already applied locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// A placeholder with `temp_id` is waiting for its server id.
    Create { temp_id: TodoId, title: String },
    /// `updated` is shown locally. `seq` numbers the toggles on this item.
    Update { updated: TodoItem, seq: u64 },
    /// `item` was removed from `position`. `restore` says whether a failed
    /// delete puts it back.
    Delete {
        item: TodoItem,
        position: usize,
        restore: bool,
    },
}

/// Successful answer to a [`Pending`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Created(TodoItem),
    Updated(TodoItem),
    Deleted,
}

impl Pending {
    /// Perform the remote call.
    pub fn send<S: RemoteTodoService + ?Sized>(&self, service: &S) -> Result<Reply, ApiError> {
        match self {
            Pending::Create { title, .. } => service.create(title).map(Reply::Created),
            Pending::Update { updated, .. } => service.update(updated).map(Reply::Updated),
            Pending::Delete { item, .. } => service.delete(item.id).map(|()| Reply::Deleted),
        }
    }

    /// Local id of the item this call concerns.
    pub fn id(&self) -> TodoId {
        match self {
            Pending::Create { temp_id, .. } => *temp_id,
            Pending::Update { updated, .. } => updated.id,
            Pending::Delete { item, .. } => item.id,
        }
    }

    fn failure_label(&self) -> &'static str {
        match self {
            Pending::Create { .. } => "Failed to add todo",
            Pending::Update { .. } => "Failed to update todo",
            Pending::Delete { .. } => "Failed to delete todo",
        }
    }
}

/// Todo list kept in step with a [`RemoteTodoService`] through optimistic
/// updates, optionally mirrored to a local store.
pub struct SyncedTodos {
    todos: TodoCollection,
    policy: TitlePolicy,
    temp_ids: TempIds,
    error: Option<String>,
    toggles: HashMap<TodoId, Toggles>,
    mirror: Option<Box<dyn PersistentStore>>,
}

/// Updates in flight for one item. The service is assumed to apply them in
/// the order they were issued, so its flag is the one from the newest toggle
/// it accepted.
#[derive(Debug, Clone, Copy)]
struct Toggles {
    issued: u64,
    outstanding: u64,
    confirmed: bool,
    confirmed_seq: u64,
    newest_failed: bool,
}

impl Default for SyncedTodos {
    fn default() -> Self {
        Self::new(TitlePolicy::default())
    }
}

impl std::fmt::Debug for SyncedTodos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncedTodos")
            .field("todos", &self.todos)
            .field("policy", &self.policy)
            .field("error", &self.error)
            .field("mirrored", &self.mirror.is_some())
            .finish()
    }
}

impl SyncedTodos {
    pub fn new(policy: TitlePolicy) -> Self {
        Self {
            todos: TodoCollection::new(),
            policy,
            temp_ids: TempIds::default(),
            error: None,
            toggles: HashMap::new(),
            mirror: None,
        }
    }

    /// Also write the list to `store` after every change. Placeholders for
    /// unconfirmed creates are left out.
    pub fn with_mirror(mut self, store: impl PersistentStore + 'static) -> Self {
        self.mirror = Some(Box::new(store));
        self
    }

    pub fn todos(&self) -> &TodoCollection {
        &self.todos
    }

    pub fn policy(&self) -> &TitlePolicy {
        &self.policy
    }

    /// Last failure message meant for the user, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Replace the local list with the service's. On failure the list is
    /// emptied and an error is recorded.
    pub fn load<S: RemoteTodoService + ?Sized>(&mut self, service: &S) -> bool {
        match service.list() {
            Ok(items) => {
                self.toggles.clear();
                self.commit(TodoCollection::from(items));
                self.error = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "fetching todos failed");
                self.toggles.clear();
                self.commit(TodoCollection::new());
                self.error = Some(format!("Failed to fetch todos: {e}"));
                false
            }
        }
    }

    /// Show a placeholder for `title` immediately. `None` if the title is
    /// refused by the policy.
    pub fn begin_create(&mut self, title: &str) -> Option<Pending> {
        let title = self.policy.accept(title)?;
        let stamp = Stamp {
            id: self.temp_ids.next_id(),
            created_at: now_millis(),
        };
        let next = self.todos.add(&title, &self.policy, stamp);
        self.commit(next);
        Some(Pending::Create {
            temp_id: stamp.id,
            title,
        })
    }

    /// Flip `completed` on `id` immediately. `None` for unknown ids and for
    /// placeholders the server has not acknowledged yet.
    pub fn begin_toggle(&mut self, id: TodoId) -> Option<Pending> {
        let confirmed = self.settled_item(id)?.completed;
        let next = self.todos.toggle(id);
        let updated = next.get(id)?.clone();
        self.commit(next);
        let toggles = self.toggles.entry(id).or_insert(Toggles {
            issued: 0,
            outstanding: 0,
            confirmed,
            confirmed_seq: 0,
            newest_failed: false,
        });
        toggles.issued += 1;
        toggles.outstanding += 1;
        toggles.newest_failed = false;
        Some(Pending::Update {
            updated,
            seq: toggles.issued,
        })
    }

    /// Remove `id` immediately. A failed delete puts it back.
    pub fn begin_remove(&mut self, id: TodoId) -> Option<Pending> {
        let item = self.settled_item(id)?.clone();
        let position = self.todos.position(id)?;
        let next = self.todos.remove(id);
        self.commit(next);
        Some(Pending::Delete {
            item,
            position,
            restore: true,
        })
    }

    /// Drop all completed items immediately; one delete is owed per item.
    /// Failed deletes are reported but the items stay gone.
    pub fn begin_clear_completed(&mut self) -> Vec<Pending> {
        let pending: Vec<Pending> = self
            .todos
            .iter()
            .enumerate()
            .filter(|(_, item)| item.completed && !item.is_temporary())
            .map(|(position, item)| Pending::Delete {
                item: item.clone(),
                position,
                restore: false,
            })
            .collect();
        if !pending.is_empty() {
            let next = self.todos.clear_completed();
            self.commit(next);
        }
        pending
    }

    /// Fold the answer to `pending` back into the list.
    pub fn settle(&mut self, pending: Pending, outcome: Result<Reply, ApiError>) {
        let e = match outcome {
            Ok(reply) => {
                self.confirm(pending, reply);
                return;
            }
            Err(e) => e,
        };
        tracing::warn!(id = pending.id(), error = %e, "remote call failed, compensating");
        self.error = Some(format!("{}: {e}", pending.failure_label()));
        let next = match pending {
            Pending::Create { temp_id, .. } => self.todos.remove(temp_id),
            Pending::Update { updated, seq } => {
                // a newer toggle still owed an answer decides the flag
                match self.finish_toggle(updated.id, seq, None) {
                    Some(confirmed) => self.todos.set_completed(updated.id, confirmed),
                    None => return,
                }
            }
            Pending::Delete {
                item,
                position,
                restore: true,
            } => self.todos.restore(item, position),
            Pending::Delete { restore: false, .. } => return,
        };
        self.commit(next);
    }

    /// Add `title` and wait for the service. Returns whether it stuck.
    pub fn create<S: RemoteTodoService + ?Sized>(&mut self, service: &S, title: &str) -> bool {
        match self.begin_create(title) {
            Some(pending) => self.round_trip(service, pending),
            None => false,
        }
    }

    pub fn toggle<S: RemoteTodoService + ?Sized>(&mut self, service: &S, id: TodoId) -> bool {
        match self.begin_toggle(id) {
            Some(pending) => self.round_trip(service, pending),
            None => false,
        }
    }

    pub fn remove<S: RemoteTodoService + ?Sized>(&mut self, service: &S, id: TodoId) -> bool {
        match self.begin_remove(id) {
            Some(pending) => self.round_trip(service, pending),
            None => false,
        }
    }

    /// Clear completed items, one delete per item. Returns how many deletes
    /// the service confirmed.
    pub fn clear_completed<S: RemoteTodoService + ?Sized>(&mut self, service: &S) -> usize {
        self.begin_clear_completed()
            .into_iter()
            .map(|pending| self.round_trip(service, pending))
            .filter(|ok| *ok)
            .count()
    }

    fn round_trip<S: RemoteTodoService + ?Sized>(&mut self, service: &S, pending: Pending) -> bool {
        let outcome = pending.send(service);
        let ok = outcome.is_ok();
        self.settle(pending, outcome);
        ok
    }

    fn confirm(&mut self, pending: Pending, reply: Reply) {
        let next = match (pending, reply) {
            (Pending::Create { temp_id, .. }, Reply::Created(mut item)) => {
                let Some(placeholder) = self.todos.get(temp_id) else {
                    tracing::debug!(temp_id, id = item.id, "placeholder gone before create settled");
                    return;
                };
                item.created_at = item.created_at.or(placeholder.created_at);
                self.todos.replace(temp_id, item)
            }
            (Pending::Update { updated, seq }, Reply::Updated(mut item)) => {
                let Some(completed) = self.finish_toggle(updated.id, seq, Some(item.completed))
                else {
                    return;
                };
                match self.todos.get(updated.id) {
                    Some(current) => {
                        item.completed = completed;
                        item.created_at = item.created_at.or(current.created_at);
                        self.todos.replace(updated.id, item)
                    }
                    None => return,
                }
            }
            (Pending::Delete { .. }, Reply::Deleted) => return,
            (pending, reply) => {
                tracing::warn!(id = pending.id(), ?reply, "reply does not match pending call");
                return;
            }
        };
        self.commit(next);
    }

    /// Book the answer to toggle `seq` on `id`; `reply` is the service's flag
    /// on success. Returns the flag to show, or `None` while a newer toggle
    /// is still pending and its optimistic flag should stay.
    fn finish_toggle(&mut self, id: TodoId, seq: u64, reply: Option<bool>) -> Option<bool> {
        let toggles = self.toggles.get_mut(&id)?;
        toggles.outstanding = toggles.outstanding.saturating_sub(1);
        match reply {
            Some(completed) if seq > toggles.confirmed_seq => {
                toggles.confirmed = completed;
                toggles.confirmed_seq = seq;
            }
            Some(_) => {}
            None if seq == toggles.issued => toggles.newest_failed = true,
            None => {}
        }
        let shown = (seq == toggles.issued || toggles.newest_failed).then_some(toggles.confirmed);
        if toggles.outstanding == 0 {
            self.toggles.remove(&id);
        }
        shown
    }

    fn settled_item(&self, id: TodoId) -> Option<&TodoItem> {
        self.todos.get(id).filter(|item| !item.is_temporary())
    }

    fn commit(&mut self, next: TodoCollection) {
        if next == self.todos {
            return;
        }
        self.todos = next;
        tracing::debug!(count = self.todos.len(), "todos changed");
        if let Some(store) = self.mirror.as_mut() {
            // placeholders only exist until the service answers
            let settled: Vec<TodoItem> = self
                .todos
                .iter()
                .filter(|item| !item.is_temporary())
                .cloned()
                .collect();
            save_collection(store.as_mut(), STORAGE_KEY, &TodoCollection::from(settled));
        }
    }
}
