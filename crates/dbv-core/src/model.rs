//! Column, cell and row model

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::TableError;

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Select,
    Date,
}

impl ColumnType {
    /// Every type offered when adding a column, in menu order
    pub const ALL: [ColumnType; 4] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Select,
        ColumnType::Date,
    ];

    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Select => "select",
            ColumnType::Date => "date",
        }
    }

    /// Capitalized name, used as the default name of a new column
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Text => "Text",
            ColumnType::Number => "Number",
            ColumnType::Select => "Select",
            ColumnType::Date => "Date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| TableError::InvalidType(s.to_string()))
    }
}

/// A named, typed slot in the table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Value stored in a single cell
///
/// Persisted as a bare JSON string or number. Reading is lenient: `null`
/// loads as the empty cell and any other JSON value as its text, so one odd
/// cell never makes a stored row unreadable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// The empty cell every new row and column starts with
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    /// Coerce raw input for a number column.
    ///
    /// Blank, unparsable and non-finite input all become `0`.
    pub fn coerce_number(raw: &str) -> f64 {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return 0.0;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => 0.0,
        }
    }

    /// Build the stored value for `raw` according to the column's declared type
    pub fn from_input(raw: &str, column_type: Option<ColumnType>) -> Self {
        match column_type {
            Some(ColumnType::Number) => CellValue::Number(Self::coerce_number(raw)),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => CellValue::empty(),
            Value::String(s) => CellValue::Text(s),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
            Value::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        })
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            // -0 prints as 0, integral values without a trailing ".0"
            CellValue::Number(n) if *n == 0.0 => f.write_str("0"),
            CellValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One line item: column name to cell value, in insertion order.
///
/// A record need not carry every schema column; a missing key reads as empty.
pub type RowRecord = IndexMap<String, CellValue>;

/// A resolved "move item from `source` to `destination`" request.
///
/// A `None` destination means the gesture was dropped outside any valid
/// target and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderIntent {
    pub source: usize,
    pub destination: Option<usize>,
}

impl ReorderIntent {
    pub fn new(source: usize, destination: usize) -> Self {
        Self {
            source,
            destination: Some(destination),
        }
    }

    pub fn cancelled(source: usize) -> Self {
        Self {
            source,
            destination: None,
        }
    }
}

/// Sort direction for a column sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Badge color drawn from the fixed tag palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Red,
    Green,
    Blue,
    Purple,
    Yellow,
    Orange,
    Teal,
    Pink,
}

impl TagColor {
    /// The reference palette
    pub const PALETTE: [TagColor; 8] = [
        TagColor::Red,
        TagColor::Green,
        TagColor::Blue,
        TagColor::Purple,
        TagColor::Yellow,
        TagColor::Orange,
        TagColor::Teal,
        TagColor::Pink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TagColor::Red => "red",
            TagColor::Green => "green",
            TagColor::Blue => "blue",
            TagColor::Purple => "purple",
            TagColor::Yellow => "yellow",
            TagColor::Orange => "orange",
            TagColor::Teal => "teal",
            TagColor::Pink => "pink",
        }
    }
}

impl fmt::Display for TagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
