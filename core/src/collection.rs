//! The todo collection and the pure operations over it.
//!
//! # Design
//! `TodoCollection` has value semantics: every mutation borrows the current
//! collection and returns a fresh one, leaving the original untouched. An
//! operation that does not apply (blank title, unknown id) returns an equal
//! copy rather than an error. Ids stay unique: constructors drop duplicate ids
//! and `add` refuses a stamp whose id is already taken.
//!
//! Read-side operations (`filter`, `search`, `sort`) produce a [`View`] of
//! borrowed items that can be chained without cloning anything.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::TitlePolicy;
use crate::types::{TodoId, TodoItem};

/// Id and creation time for an item about to be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamp {
    pub id: TodoId,
    pub created_at: i64,
}

/// Which items a view keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    All,
    Active,
    Completed,
}

impl FilterMode {
    pub fn matches(self, item: &TodoItem) -> bool {
        match self {
            FilterMode::All => true,
            FilterMode::Active => !item.completed,
            FilterMode::Completed => item.completed,
        }
    }
}

/// Ordering applied to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Case-insensitive ascending title.
    Title,
    /// Newest first by creation time; items without one go last.
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`, expected one of: {expected}")]
pub struct ParseModeError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FromStr for FilterMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(FilterMode::All),
            "active" => Ok(FilterMode::Active),
            "completed" => Ok(FilterMode::Completed),
            _ => Err(ParseModeError {
                kind: "filter",
                value: s.to_string(),
                expected: "all, active, completed",
            }),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterMode::All => "all",
            FilterMode::Active => "active",
            FilterMode::Completed => "completed",
        })
    }
}

impl FromStr for SortKey {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "date" => Ok(SortKey::Date),
            _ => Err(ParseModeError {
                kind: "sort key",
                value: s.to_string(),
                expected: "title, date",
            }),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortKey::Title => "title",
            SortKey::Date => "date",
        })
    }
}

/// Ordered set of todo items with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TodoItem>", into = "Vec<TodoItem>")]
pub struct TodoCollection {
    items: Vec<TodoItem>,
}

impl From<Vec<TodoItem>> for TodoCollection {
    fn from(items: Vec<TodoItem>) -> Self {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        let items = items.into_iter().filter(|item| seen.insert(item.id)).collect();
        Self { items }
    }
}

impl From<TodoCollection> for Vec<TodoItem> {
    fn from(collection: TodoCollection) -> Self {
        collection.items
    }
}

impl TodoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: TodoId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn contains(&self, id: TodoId) -> bool {
        self.position(id).is_some()
    }

    /// Number of items not yet completed.
    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    pub fn max_id(&self) -> Option<TodoId> {
        self.items.iter().map(|item| item.id).max()
    }

    pub fn completed_ids(&self) -> Vec<TodoId> {
        self.items
            .iter()
            .filter(|item| item.completed)
            .map(|item| item.id)
            .collect()
    }

    /// Append a new, not-yet-completed item. Returns an unchanged copy when
    /// the title is refused by `policy` or `stamp.id` is already in use.
    pub fn add(&self, title: &str, policy: &TitlePolicy, stamp: Stamp) -> Self {
        let Some(title) = policy.accept(title) else {
            return self.clone();
        };
        if self.contains(stamp.id) {
            tracing::debug!(id = stamp.id, "add skipped, id already present");
            return self.clone();
        }
        let mut items = self.items.clone();
        items.push(TodoItem {
            id: stamp.id,
            title,
            completed: false,
            created_at: Some(stamp.created_at),
        });
        Self { items }
    }

    pub fn toggle(&self, id: TodoId) -> Self {
        self.map_one(id, |item| item.completed = !item.completed)
    }

    pub fn remove(&self, id: TodoId) -> Self {
        Self {
            items: self.items.iter().filter(|item| item.id != id).cloned().collect(),
        }
    }

    pub fn clear_completed(&self) -> Self {
        Self {
            items: self.items.iter().filter(|item| !item.completed).cloned().collect(),
        }
    }

    /// Set `completed` on one item, leaving everything else alone.
    pub fn set_completed(&self, id: TodoId, completed: bool) -> Self {
        self.map_one(id, |item| item.completed = completed)
    }

    /// Swap the item with `id` for `replacement`, in place.
    ///
    /// If `replacement` carries an id that some other item already has, the
    /// old item is dropped instead so ids stay unique.
    pub fn replace(&self, id: TodoId, replacement: TodoItem) -> Self {
        if replacement.id != id && self.contains(replacement.id) {
            return self.remove(id);
        }
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    replacement.clone()
                } else {
                    item.clone()
                }
            })
            .collect();
        Self { items }
    }

    /// Put `item` back at `position` (clamped to the end) unless its id is
    /// already present.
    pub fn restore(&self, item: TodoItem, position: usize) -> Self {
        if self.contains(item.id) {
            return self.clone();
        }
        let mut items = self.items.clone();
        let at = position.min(items.len());
        items.insert(at, item);
        Self { items }
    }

    pub fn view(&self) -> View<'_> {
        View {
            items: self.items.iter().collect(),
        }
    }

    pub fn filter(&self, mode: FilterMode) -> View<'_> {
        self.view().filter(mode)
    }

    pub fn search(&self, query: &str) -> View<'_> {
        self.view().search(query)
    }

    pub fn sort(&self, key: SortKey) -> View<'_> {
        self.view().sort(key)
    }

    fn map_one(&self, id: TodoId, f: impl Fn(&mut TodoItem)) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if item.id == id {
                    f(&mut item);
                }
                item
            })
            .collect();
        Self { items }
    }
}

impl<'a> IntoIterator for &'a TodoCollection {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Borrowed, ordered selection of items from a [`TodoCollection`].
#[derive(Debug, Clone)]
pub struct View<'a> {
    items: Vec<&'a TodoItem>,
}

impl<'a> View<'a> {
    pub fn filter(mut self, mode: FilterMode) -> Self {
        self.items.retain(|item| mode.matches(item));
        self
    }

    /// Keep items whose title contains `query`, ignoring case.
    pub fn search(mut self, query: &str) -> Self {
        if query.is_empty() {
            return self;
        }
        let needle = query.to_lowercase();
        self.items.retain(|item| item.title.to_lowercase().contains(&needle));
        self
    }

    /// Stable sort; ties keep their current relative order.
    pub fn sort(mut self, key: SortKey) -> Self {
        match key {
            SortKey::Title => self.items.sort_by_cached_key(|item| item.title.to_lowercase()),
            SortKey::Date => self.items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a TodoItem> + '_ {
        self.items.iter().copied()
    }

    pub fn ids(&self) -> Vec<TodoId> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn titles(&self) -> Vec<&'a str> {
        self.items.iter().map(|item| item.title.as_str()).collect()
    }

    pub fn to_vec(&self) -> Vec<TodoItem> {
        self.items.iter().map(|item| (*item).clone()).collect()
    }
}

impl<'a> IntoIterator for View<'a> {
    type Item = &'a TodoItem;
    type IntoIter = std::vec::IntoIter<&'a TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
