//! Table data structures for the database view
//!
//! Column schema, row storage, pure sort/filter, the tag color registry and
//! concrete key/value stores.

pub mod query;
pub mod rows;
pub mod schema;
pub mod stores;
pub mod tags;

mod reorder;

// Re-exports
pub use query::{filter_by_text, sort_by, sort_order};
pub use rows::RowStore;
pub use schema::TableSchema;
pub use stores::{JsonFileStore, MemoryStore};
pub use tags::{
    FixedColorSource, HashedColorSource, RandomColorSource, SeededColorSource, TagColorRegistry,
    TagLookup,
};
