//! Splice-out, splice-in moves shared by columns and rows

use dbv_core::{Axis, ReorderIntent, TableError, TableResult};

/// Apply `intent` to `items`.
///
/// The item at `source` is removed and reinserted at `destination` in the
/// remaining sequence. Returns `false` when nothing moved: a cancelled
/// intent or a drop on the item's own position.
pub(crate) fn apply<T>(items: &mut Vec<T>, intent: ReorderIntent, axis: Axis) -> TableResult<bool> {
    let Some(destination) = intent.destination else {
        return Ok(false);
    };

    let len = items.len();
    for index in [intent.source, destination] {
        if index >= len {
            return Err(TableError::IndexOutOfRange { axis, index, len });
        }
    }

    if intent.source == destination {
        return Ok(false);
    }

    let item = items.remove(intent.source);
    items.insert(destination, item);
    Ok(true)
}
