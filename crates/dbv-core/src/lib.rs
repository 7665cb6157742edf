//! Core vocabulary for the database view
//!
//! This crate provides the types shared by the table state engine and its
//! collaborators: column and cell model, reorder intents, the error taxonomy,
//! the storage and color-source ports, change events and configuration.

pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod ports;

// Re-export commonly used types
pub use config::{StorageKeys, TableConfig};
pub use error::{Axis, StoreError, StoreResult, TableError, TableResult};
pub use events::{handler_from_fn, EventBus, EventHandler, TableEvent};
pub use model::{
    CellValue, ColumnDefinition, ColumnType, ReorderIntent, RowRecord, SortDirection, TagColor,
};
pub use ports::{ColorSource, KeyValueStore};
