//! Persisted table snapshot

use dbv_core::{
    ColumnDefinition, KeyValueStore, RowRecord, StorageKeys, StoreError, TableConfig, TableError,
    TableResult, TagColor,
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Encoding failure, tagged with the key being encoded
pub type EncodeResult<T> = Result<T, (String, StoreError)>;

/// Everything the engine persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<RowRecord>,
    pub tag_colors: IndexMap<String, TagColor>,
    pub title: String,
}

impl TableSnapshot {
    /// Snapshot a fresh table starts from
    pub fn defaults(config: &TableConfig) -> Self {
        Self {
            columns: config.default_columns.clone(),
            rows: Vec::new(),
            tag_colors: IndexMap::new(),
            title: config.default_title.clone(),
        }
    }

    /// Read the snapshot stored under `config`'s keys.
    ///
    /// Keys that are missing, or hold something that does not decode, fall
    /// back to the defaults. Only a failing store read is an error.
    pub fn load(store: &dyn KeyValueStore, config: &TableConfig) -> TableResult<Self> {
        Self::load_with_report(store, config).map(|(snapshot, _)| snapshot)
    }

    /// Like [`Self::load`], also returning the keys whose stored value could
    /// not be decoded in full.
    ///
    /// Rows are decoded one by one, so a bad row only drops itself; its key
    /// is still reported since writing the loaded rows back would lose it.
    pub fn load_with_report(
        store: &dyn KeyValueStore,
        config: &TableConfig,
    ) -> TableResult<(Self, Vec<String>)> {
        let keys = &config.storage;
        let defaults = Self::defaults(config);
        let mut loader = Loader {
            store,
            unreadable: Vec::new(),
        };

        let snapshot = Self {
            columns: loader.decode(&keys.columns_key())?.unwrap_or(defaults.columns),
            rows: loader.rows(&keys.rows_key())?.unwrap_or(defaults.rows),
            tag_colors: loader.decode(&keys.tag_colors_key())?.unwrap_or(defaults.tag_colors),
            title: loader.decode(&keys.title_key())?.unwrap_or(defaults.title),
        };
        Ok((snapshot, loader.unreadable))
    }

    /// `(key, value)` pairs to write, in write order
    pub fn entries(&self, keys: &StorageKeys) -> EncodeResult<Vec<(String, Value)>> {
        SnapshotRef {
            columns: &self.columns,
            rows: &self.rows,
            tag_colors: &self.tag_colors,
            title: &self.title,
        }
        .entries(keys)
    }
}

/// Borrowed view of live engine state, encoded without cloning it first
pub(crate) struct SnapshotRef<'a> {
    pub columns: &'a [ColumnDefinition],
    pub rows: &'a [RowRecord],
    pub tag_colors: &'a IndexMap<String, TagColor>,
    pub title: &'a str,
}

impl SnapshotRef<'_> {
    pub fn entries(&self, keys: &StorageKeys) -> EncodeResult<Vec<(String, Value)>> {
        Ok(vec![
            encode(keys.columns_key(), &self.columns)?,
            encode(keys.rows_key(), &self.rows)?,
            encode(keys.tag_colors_key(), &self.tag_colors)?,
            encode(keys.title_key(), &self.title)?,
        ])
    }
}

fn encode<T: Serialize>(key: String, value: &T) -> EncodeResult<(String, Value)> {
    match serde_json::to_value(value) {
        Ok(value) => Ok((key, value)),
        Err(e) => Err((key, e.into())),
    }
}

struct Loader<'a> {
    store: &'a dyn KeyValueStore,
    unreadable: Vec<String>,
}

impl Loader<'_> {
    fn raw(&self, key: &str) -> TableResult<Option<Value>> {
        self.store
            .get(key)
            .map_err(|source| TableError::PersistenceReadFailed {
                key: key.to_string(),
                source,
            })
    }

    fn decode<T: DeserializeOwned>(&mut self, key: &str) -> TableResult<Option<T>> {
        let Some(value) = self.raw(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                warn!(
                    "Ignoring undecodable value under {:?} in {}: {}",
                    key,
                    self.store.store_name(),
                    e
                );
                self.unreadable.push(key.to_string());
                Ok(None)
            }
        }
    }

    fn rows(&mut self, key: &str) -> TableResult<Option<Vec<RowRecord>>> {
        let items = match self.raw(key)? {
            None => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(_) => return self.decode(key),
        };

        let mut rows = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<RowRecord>(item) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!("Skipping undecodable row {} under {:?}: {}", index, key, e);
                    if !self.unreadable.iter().any(|k| k == key) {
                        self.unreadable.push(key.to_string());
                    }
                }
            }
        }
        Ok(Some(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbv_core::{CellValue, StoreResult};
    use dbv_data::MemoryStore;
    use serde_json::json;

    struct UnreadableStore;

    impl KeyValueStore for UnreadableStore {
        fn get(&self, _key: &str) -> StoreResult<Option<Value>> {
            Err(StoreError::Unavailable("locked".to_string()))
        }

        fn set(&mut self, _key: &str, _value: Value) -> StoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let config = TableConfig::default();
        let snapshot = TableSnapshot::load(&MemoryStore::new(), &config).unwrap();
        assert_eq!(snapshot, TableSnapshot::defaults(&config));
        assert_eq!(snapshot.title, "Database");
        assert_eq!(snapshot.columns.len(), 4);
    }

    #[test]
    fn test_load_stored_values() {
        let store = MemoryStore::with_entries([
            ("tableData", json!([{"Name": "Draft", "Count": 2}])),
            ("badgeColors", json!({"urgent": "red"})),
            ("tableHeading", json!("Tasks")),
        ]);
        let snapshot = TableSnapshot::load(&store, &TableConfig::default()).unwrap();

        assert_eq!(snapshot.rows.len(), 1);
        assert_eq!(snapshot.rows[0]["Count"], CellValue::Number(2.0));
        assert_eq!(snapshot.tag_colors.get("urgent"), Some(&TagColor::Red));
        assert_eq!(snapshot.title, "Tasks");
        assert_eq!(snapshot.columns[0].name, "Name");
    }

    #[test]
    fn test_undecodable_value_falls_back() {
        let store = MemoryStore::with_entries([("tableColumns", json!("not a list"))]);
        let snapshot = TableSnapshot::load(&store, &TableConfig::default()).unwrap();
        assert_eq!(snapshot.columns, TableConfig::default().default_columns);
    }

    #[test]
    fn test_null_cell_keeps_the_row() {
        let store = MemoryStore::with_entries([(
            "tableData",
            json!([{"Name": "Keep me", "Count": 3}, {"Name": "Also keep", "Count": null}]),
        )]);
        let (snapshot, unreadable) =
            TableSnapshot::load_with_report(&store, &TableConfig::default()).unwrap();

        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.rows[1]["Name"], CellValue::from("Also keep"));
        assert_eq!(snapshot.rows[1]["Count"], CellValue::empty());
        assert!(unreadable.is_empty());
    }

    #[test]
    fn test_bad_row_is_dropped_and_reported() {
        let store = MemoryStore::with_entries([
            ("tableData", json!([{"Name": "ok"}, 5, {"Name": "also ok"}])),
            ("tableColumns", json!("not a list")),
        ]);
        let (snapshot, unreadable) =
            TableSnapshot::load_with_report(&store, &TableConfig::default()).unwrap();

        assert_eq!(snapshot.rows.len(), 2);
        assert_eq!(snapshot.rows[1]["Name"], CellValue::from("also ok"));
        assert_eq!(unreadable, vec!["tableColumns", "tableData"]);
    }

    #[test]
    fn test_read_failure_is_reported() {
        let err = TableSnapshot::load(&UnreadableStore, &TableConfig::default()).unwrap_err();
        assert_eq!(
            err,
            TableError::PersistenceReadFailed {
                key: "tableColumns".to_string(),
                source: StoreError::Unavailable("locked".to_string()),
            }
        );
    }

    #[test]
    fn test_entries_use_scoped_keys() {
        let config = TableConfig::default().with_namespace("tasks");
        let entries = TableSnapshot::defaults(&config).entries(&config.storage).unwrap();
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["tasks:tableColumns", "tasks:tableData", "tasks:badgeColors", "tasks:tableHeading"]
        );
        assert_eq!(entries[3].1, json!("Database"));
    }
}
