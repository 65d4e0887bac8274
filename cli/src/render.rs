//! Human-readable output for todo listings.

use std::io::{self, Write};

use todo_core::TodoItem;

/// One line per item: `[x] <id>  <title>`.
pub fn item_line(item: &TodoItem) -> String {
    let mark = if item.completed { 'x' } else { ' ' };
    format!("[{mark}] {}  {}", item.id, item.title)
}

pub fn footer(active: usize) -> String {
    let noun = if active == 1 { "item" } else { "items" };
    format!("{active} {noun} left")
}

/// Write `items` followed by the active-count footer.
pub fn write_list<'a, W: Write>(
    out: &mut W,
    items: impl IntoIterator<Item = &'a TodoItem>,
    active: usize,
) -> io::Result<()> {
    for item in items {
        writeln!(out, "{}", item_line(item))?;
    }
    writeln!(out, "{}", footer(active))
}
