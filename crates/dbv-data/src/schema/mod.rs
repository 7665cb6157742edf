//! Ordered column definitions

use dbv_core::{Axis, ColumnDefinition, ColumnType, ReorderIntent, TableError, TableResult};
use tracing::debug;

use crate::reorder;

/// Ordered list of column definitions with unique names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a stored column sequence as-is
    pub fn from_columns(columns: Vec<ColumnDefinition>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColumnDefinition> {
        self.columns.get(index)
    }

    /// Index of the column called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Declared type of the column called `name`
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Append a column.
    ///
    /// Without a name the column is called after its type ("Number"), with a
    /// numeric suffix if that name is taken. An explicit name that is taken
    /// is rejected.
    pub fn add_column(
        &mut self,
        column_type: ColumnType,
        name: Option<&str>,
    ) -> TableResult<ColumnDefinition> {
        let name = match name {
            Some(name) => {
                if self.position(name).is_some() {
                    return Err(TableError::DuplicateColumnName(name.to_string()));
                }
                name.to_string()
            }
            None => self.unique_name(column_type.label()),
        };

        let column = ColumnDefinition::new(name, column_type);
        debug!("Adding column {:?} ({})", column.name, column.column_type);
        self.columns.push(column.clone());
        Ok(column)
    }

    /// Append a column whose type is given by its wire name
    pub fn add_column_named(
        &mut self,
        type_name: &str,
        name: Option<&str>,
    ) -> TableResult<ColumnDefinition> {
        let column_type = type_name.parse::<ColumnType>()?;
        self.add_column(column_type, name)
    }

    /// Rename the column at `index`, returning its previous name.
    ///
    /// Blank names are accepted.
    pub fn rename_column(&mut self, index: usize, new_name: &str) -> TableResult<String> {
        let len = self.columns.len();
        if index >= len {
            return Err(TableError::column_out_of_range(index, len));
        }

        match self.position(new_name) {
            Some(existing) if existing != index => {
                return Err(TableError::DuplicateColumnName(new_name.to_string()));
            }
            _ => {}
        }

        let old_name = std::mem::replace(&mut self.columns[index].name, new_name.to_string());
        debug!("Renamed column {} from {:?} to {:?}", index, old_name, new_name);
        Ok(old_name)
    }

    /// Remove and return the column at `index`
    pub fn delete_column(&mut self, index: usize) -> TableResult<ColumnDefinition> {
        let len = self.columns.len();
        if index >= len {
            return Err(TableError::column_out_of_range(index, len));
        }
        let column = self.columns.remove(index);
        debug!("Deleted column {} ({:?})", index, column.name);
        Ok(column)
    }

    /// Move a column; returns whether the order changed
    pub fn reorder_column(&mut self, intent: ReorderIntent) -> TableResult<bool> {
        reorder::apply(&mut self.columns, intent, Axis::Column)
    }

    fn unique_name(&self, base: &str) -> String {
        if self.position(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{} {}", base, n))
            .find(|candidate| self.position(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }
}
