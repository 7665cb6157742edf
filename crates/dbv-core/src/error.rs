//! Error types for table operations

use std::fmt;

use thiserror::Error;

/// Which sequence an index referred to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Column,
    Row,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Column => f.write_str("column"),
            Axis::Row => f.write_str("row"),
        }
    }
}

/// Errors raised by a key/value store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        StoreError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Serialization(error.to_string())
    }
}

/// Errors that can occur in table operations.
///
/// None of these are fatal: the engine stays usable after any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("{axis} index {index} out of range (len: {len})")]
    IndexOutOfRange { axis: Axis, index: usize, len: usize },

    #[error("Invalid column type: {0:?}")]
    InvalidType(String),

    #[error("Column name already in use: {0:?}")]
    DuplicateColumnName(String),

    #[error("Row order is not a permutation of {len} rows")]
    InvalidRowOrder { len: usize },

    #[error("Failed to persist {key:?}: {source}")]
    PersistenceWriteFailed { key: String, source: StoreError },

    #[error("Failed to read {key:?}: {source}")]
    PersistenceReadFailed { key: String, source: StoreError },
}

impl TableError {
    pub fn column_out_of_range(index: usize, len: usize) -> Self {
        TableError::IndexOutOfRange {
            axis: Axis::Column,
            index,
            len,
        }
    }

    pub fn row_out_of_range(index: usize, len: usize) -> Self {
        TableError::IndexOutOfRange {
            axis: Axis::Row,
            index,
            len,
        }
    }

    /// Whether the in-memory state still reflects the requested mutation
    pub fn is_degraded_persistence(&self) -> bool {
        matches!(self, TableError::PersistenceWriteFailed { .. })
    }
}

pub type TableResult<T> = Result<T, TableError>;
pub type StoreResult<T> = Result<T, StoreError>;
