//! Key/value store backed by a single JSON file

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dbv_core::{KeyValueStore, StoreError, StoreResult};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Key/value store persisted as one JSON object on disk.
///
/// Every `set` rewrites the whole file into a synced temporary file and
/// renames it over the old one, so a crash leaves either the old or the new
/// contents. A failed write removes the temporary file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            match serde_json::from_str::<Value>(&contents)? {
                Value::Object(map) => map,
                other => {
                    return Err(StoreError::Serialization(format!(
                        "expected a JSON object in {}, found {}",
                        path.display(),
                        json_kind(&other)
                    )))
                }
            }
        } else {
            Map::new()
        };

        info!("Opened JSON store {:?} with {} keys", path, entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(&self.entries)?;
        let written =
            write_synced(&tmp, contents.as_bytes()).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                debug!("Could not remove {:?}: {}", tmp, cleanup);
            }
            return Err(e.into());
        }
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> StoreResult<()> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            // keep memory and disk in step
            match previous {
                Some(previous) => self.entries.insert(key.to_string(), previous),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        debug!("Wrote {:?} to {:?}", key, self.path);
        Ok(())
    }

    fn store_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("json-store")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reopen_sees_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("tableData").unwrap(), None);
        store.set("tableData", json!([{"Name": "Draft"}])).unwrap();
        store.set("tableHeading", json!("Tasks")).unwrap();
        assert_eq!(store.store_name(), "table.json");

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("tableData").unwrap(), Some(json!([{"Name": "Draft"}])));
        assert_eq!(reopened.get("tableHeading").unwrap(), Some(json!("Tasks")));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set("k", json!(1)).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_rejects_non_object_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(msg) if msg.contains("an array")));
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // The store path is a directory, so the final rename fails
        let path = dir.path().join("occupied");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let mut store = JsonFileStore {
            path: path.clone(),
            entries: Map::new(),
        };
        assert!(store.set("k", json!(1)).is_err());
        assert_eq!(store.get("k").unwrap(), None);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
