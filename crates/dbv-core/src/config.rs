//! Table configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::model::{ColumnDefinition, ColumnType, TagColor};

/// Keys the table snapshot is stored under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Optional scope prefix, keys become `"<namespace>:<key>"`
    pub namespace: Option<String>,

    /// Column definition sequence
    pub columns: String,

    /// Row record sequence
    pub rows: String,

    /// Tag to color map
    pub tag_colors: String,

    /// Free-text display title
    pub title: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            namespace: None,
            columns: "tableColumns".to_string(),
            rows: "tableData".to_string(),
            tag_colors: "badgeColors".to_string(),
            title: "tableHeading".to_string(),
        }
    }
}

impl StorageKeys {
    /// Keys scoped under `namespace`
    pub fn scoped(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    fn resolve(&self, key: &str) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}:{}", ns, key),
            _ => key.to_string(),
        }
    }

    pub fn columns_key(&self) -> String {
        self.resolve(&self.columns)
    }

    pub fn rows_key(&self) -> String {
        self.resolve(&self.rows)
    }

    pub fn tag_colors_key(&self) -> String {
        self.resolve(&self.tag_colors)
    }

    pub fn title_key(&self) -> String {
        self.resolve(&self.title)
    }
}

/// Configuration for a table engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Schema used when the store holds no column definitions
    pub default_columns: Vec<ColumnDefinition>,

    /// Title used when the store holds none
    pub default_title: String,

    /// Column the text filter matches against
    pub anchor_column: String,

    /// Column holding comma-joined tag tokens
    pub tags_column: String,

    /// Separator used when joining tags into the tags cell
    pub tag_separator: String,

    /// Colors new tags are drawn from
    pub palette: Vec<TagColor>,

    /// Choices offered by select cells
    pub select_options: Vec<String>,

    /// Storage keys
    pub storage: StorageKeys,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            default_columns: vec![
                ColumnDefinition::new("Name", ColumnType::Text),
                ColumnDefinition::new("Date", ColumnType::Date),
                ColumnDefinition::new("Tags", ColumnType::Select),
                ColumnDefinition::new("Status", ColumnType::Select),
            ],
            default_title: "Database".to_string(),
            anchor_column: "Name".to_string(),
            tags_column: "Tags".to_string(),
            tag_separator: ", ".to_string(),
            palette: TagColor::PALETTE.to_vec(),
            select_options: vec![
                "Option 1".to_string(),
                "Option 2".to_string(),
                "Option 3".to_string(),
            ],
            storage: StorageKeys::default(),
        }
    }
}

impl TableConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Builder-style namespace override
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.storage.namespace = Some(namespace.into());
        self
    }

    /// Palette to draw from; an empty configured palette falls back to the reference one
    pub fn effective_palette(&self) -> &[TagColor] {
        if self.palette.is_empty() {
            &TagColor::PALETTE
        } else {
            &self.palette
        }
    }
}
