//! Id generation.
//!
//! `IdSource` keeps ids roughly chronological (they start from the wall clock
//! in milliseconds) but never hands out the same id twice: when two ids are
//! requested within one millisecond the second is bumped past the first.

use crate::types::TodoId;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Strictly increasing, non-negative id source.
#[derive(Debug, Clone, Default)]
pub struct IdSource {
    last: TodoId,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after the largest id already in use.
    pub fn resume_after(max_existing: Option<TodoId>) -> Self {
        Self {
            last: max_existing.unwrap_or(0).max(0),
        }
    }

    /// `None` once every id up to `i64::MAX` has been handed out.
    pub fn next_id(&mut self) -> Option<TodoId> {
        self.next_at(now_millis())
    }

    /// Next id given an explicit clock reading.
    pub fn next_at(&mut self, now: i64) -> Option<TodoId> {
        let id = now.max(self.last.checked_add(1)?);
        self.last = id;
        Some(id)
    }
}

/// Negative placeholder ids for items the server has not acknowledged yet.
#[derive(Debug, Clone)]
pub struct TempIds {
    next: TodoId,
}

impl Default for TempIds {
    fn default() -> Self {
        Self { next: -1 }
    }
}

impl TempIds {
    pub fn next_id(&mut self) -> TodoId {
        let id = self.next;
        self.next -= 1;
        id
    }
}
