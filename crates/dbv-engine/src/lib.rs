//! Table state engine for the database view
//!
//! [`TableEngine`] composes the column schema, row store and tag color
//! registry behind one operation surface and writes a full snapshot through
//! the injected key/value store after every mutation.

pub mod engine;
pub mod snapshot;

pub use engine::TableEngine;
pub use snapshot::TableSnapshot;

pub use dbv_core::{
    handler_from_fn, Axis, CellValue, ColorSource, ColumnDefinition, ColumnType, KeyValueStore,
    ReorderIntent, RowRecord, SortDirection, StorageKeys, StoreError, TableConfig, TableError,
    TableEvent, TableResult, TagColor,
};
pub use dbv_data::{
    FixedColorSource, HashedColorSource, JsonFileStore, MemoryStore, RandomColorSource,
    SeededColorSource,
};
