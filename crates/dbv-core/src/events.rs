//! Change notification for the view layer
//!
//! The engine publishes one event after every successful in-memory mutation;
//! the view re-reads engine state in response.

use crate::model::{SortDirection, TagColor};

/// Events published by the table engine
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    ColumnAdded { index: usize, name: String },
    ColumnRenamed { index: usize, old_name: String, new_name: String },
    ColumnDeleted { index: usize, name: String },
    ColumnMoved { from: usize, to: usize },
    RowAdded { index: usize },
    RowDeleted { index: usize },
    RowMoved { from: usize, to: usize },
    CellEdited { row: usize, column: String },
    TagsChanged { row: usize },
    TagColorAssigned { tag: String, color: TagColor },
    RowsSorted { column: String, direction: SortDirection },
    TitleChanged { title: String },

    /// A snapshot write failed; the engine runs in memory only
    PersistenceFailed { key: String },

    /// A snapshot write succeeded after an earlier failure
    PersistenceRestored,
}

/// Handler trait for event handlers
pub trait EventHandler {
    fn handle(&mut self, event: &TableEvent);
}

/// Synchronous, in-order event bus
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; handlers run in registration order
    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Publish an event
    pub fn publish(&mut self, event: TableEvent) {
        for handler in self.handlers.iter_mut() {
            handler.handle(&event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&TableEvent),
{
    fn handle(&mut self, event: &TableEvent) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&TableEvent) + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_handlers_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            bus.subscribe(handler_from_fn(move |event| {
                seen.borrow_mut().push((tag, event.clone()));
            }));
        }

        bus.publish(TableEvent::RowAdded { index: 0 });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1], ("second", TableEvent::RowAdded { index: 0 }));
    }
}
