//! Ordered row records

use dbv_core::{Axis, CellValue, ColumnType, ReorderIntent, RowRecord, TableError, TableResult};
use tracing::debug;

use crate::reorder;

/// Ordered list of row records.
///
/// The only owner of row keys: every key insertion, removal and rename
/// goes through here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowStore {
    rows: Vec<RowRecord>,
}

impl RowStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a stored row sequence as-is
    pub fn from_rows(rows: Vec<RowRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RowRecord> {
        self.rows.get(index)
    }

    /// Cell at (`index`, `column`); a missing key reads as empty
    pub fn cell(&self, index: usize, column: &str) -> Option<CellValue> {
        self.rows
            .get(index)
            .map(|row| row.get(column).cloned().unwrap_or_default())
    }

    /// Append a row with every known column mapped to an empty value
    pub fn add_row<'a, I>(&mut self, columns: I) -> RowRecord
    where
        I: IntoIterator<Item = &'a str>,
    {
        let row: RowRecord = columns
            .into_iter()
            .map(|name| (name.to_string(), CellValue::empty()))
            .collect();
        self.rows.push(row.clone());
        debug!("Added row {} with {} keys", self.rows.len() - 1, row.len());
        row
    }

    /// Remove and return the row at `index`
    pub fn delete_row(&mut self, index: usize) -> TableResult<RowRecord> {
        self.check_index(index)?;
        debug!("Deleting row {}", index);
        Ok(self.rows.remove(index))
    }

    /// Move a row; returns whether the order changed
    pub fn reorder_row(&mut self, intent: ReorderIntent) -> TableResult<bool> {
        reorder::apply(&mut self.rows, intent, Axis::Row)
    }

    /// Store `raw` in one cell.
    ///
    /// `declared_type` is the schema type of `column`, `None` when the column
    /// is not in the schema. Number columns coerce, everything else is kept
    /// verbatim. An unknown column becomes an ad hoc key on this row only.
    pub fn edit_cell(
        &mut self,
        index: usize,
        column: &str,
        raw: &str,
        declared_type: Option<ColumnType>,
    ) -> TableResult<CellValue> {
        self.check_index(index)?;
        let value = CellValue::from_input(raw, declared_type);
        if declared_type.is_none() {
            debug!("Row {} gets ad hoc key {:?}", index, column);
        }
        self.rows[index].insert(column.to_string(), value.clone());
        Ok(value)
    }

    /// Replace the tags cell of a row.
    ///
    /// Tokens are trimmed and empty ones dropped before joining with
    /// `separator`. Returns the stored tokens.
    pub fn set_tags<S: AsRef<str>>(
        &mut self,
        index: usize,
        tags_column: &str,
        tags: &[S],
        separator: &str,
    ) -> TableResult<Vec<String>> {
        self.check_index(index)?;
        let tokens: Vec<String> = tags
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self.rows[index].insert(tags_column.to_string(), CellValue::Text(tokens.join(separator)));
        Ok(tokens)
    }

    /// Tag tokens stored in a row's tags cell
    pub fn tags_in(&self, index: usize, tags_column: &str) -> TableResult<Vec<String>> {
        self.check_index(index)?;
        Ok(parse_tags(&self.rows[index], tags_column))
    }

    /// Give every row an empty value for a newly added column
    pub fn on_column_added(&mut self, name: &str) {
        for row in &mut self.rows {
            row.insert(name.to_string(), CellValue::empty());
        }
    }

    /// Drop a deleted column's key from every row
    pub fn on_column_deleted(&mut self, name: &str) {
        for row in &mut self.rows {
            row.shift_remove(name);
        }
    }

    /// Move a renamed column's values to the new key, keeping key order
    pub fn on_column_renamed(&mut self, old_name: &str, new_name: &str) {
        if old_name == new_name {
            return;
        }
        for row in &mut self.rows {
            if let Some((position, _, value)) = row.shift_remove_full(old_name) {
                row.shift_remove(new_name);
                let position = position.min(row.len());
                row.shift_insert(position, new_name.to_string(), value);
            }
        }
    }

    /// Install a new row order. `order[i]` is the current index of the row
    /// that ends up at position `i`; anything but a permutation of `0..len`
    /// is rejected and leaves the rows as they were.
    pub fn apply_order(&mut self, order: &[usize]) -> TableResult<()> {
        let len = self.rows.len();
        let mut seen = vec![false; len];
        let is_permutation = order.len() == len
            && order
                .iter()
                .all(|&i| i < len && !std::mem::replace(&mut seen[i], true));
        if !is_permutation {
            return Err(TableError::InvalidRowOrder { len });
        }

        let mut slots: Vec<Option<RowRecord>> = self.rows.drain(..).map(Some).collect();
        self.rows = order.iter().filter_map(|&i| slots[i].take()).collect();
        Ok(())
    }

    fn check_index(&self, index: usize) -> TableResult<()> {
        if index >= self.rows.len() {
            return Err(TableError::row_out_of_range(index, self.rows.len()));
        }
        Ok(())
    }
}

/// Split a tags cell into trimmed, non-empty tokens
pub fn parse_tags(row: &RowRecord, tags_column: &str) -> Vec<String> {
    match row.get(tags_column) {
        Some(value) => value
            .to_string()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const COLUMNS: [&str; 4] = ["Name", "Date", "Tags", "Status"];

    fn store_with_names(names: &[&str]) -> RowStore {
        let mut store = RowStore::new();
        for (i, name) in names.iter().enumerate() {
            store.add_row(COLUMNS);
            store.edit_cell(i, "Name", name, Some(ColumnType::Text)).unwrap();
        }
        store
    }

    #[test]
    fn test_add_row_has_every_column() {
        let mut store = RowStore::new();
        let row = store.add_row(COLUMNS);
        assert_eq!(row.keys().map(String::as_str).collect::<Vec<_>>(), COLUMNS);
        assert!(row.values().all(CellValue::is_empty));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_edit_cell_coerces_numbers() {
        let mut store = RowStore::new();
        store.add_row(COLUMNS);

        let value = store.edit_cell(0, "Count", "abc", Some(ColumnType::Number)).unwrap();
        assert_eq!(value, CellValue::Number(0.0));

        store.edit_cell(0, "Count", "42", Some(ColumnType::Number)).unwrap();
        assert_eq!(store.cell(0, "Count"), Some(CellValue::Number(42.0)));

        store.edit_cell(0, "Date", "2024-05-01", Some(ColumnType::Date)).unwrap();
        assert_eq!(store.cell(0, "Date"), Some(CellValue::from("2024-05-01")));
    }

    #[test]
    fn test_edit_unknown_column_touches_one_row() {
        let mut store = store_with_names(&["a", "b"]);
        store.edit_cell(1, "Notes", "only here", None).unwrap();

        assert!(store.get(0).unwrap().get("Notes").is_none());
        assert_eq!(store.cell(1, "Notes"), Some(CellValue::from("only here")));
        // Missing keys read as empty
        assert_eq!(store.cell(0, "Notes"), Some(CellValue::empty()));
    }

    #[test]
    fn test_edit_cell_out_of_range() {
        let mut store = RowStore::new();
        let err = store.edit_cell(0, "Name", "x", Some(ColumnType::Text)).unwrap_err();
        assert_eq!(err, TableError::row_out_of_range(0, 0));
    }

    #[test]
    fn test_delete_row() {
        let mut store = store_with_names(&["a", "b", "c"]);
        let removed = store.delete_row(1).unwrap();
        assert_eq!(removed["Name"], CellValue::from("b"));
        assert_eq!(store.len(), 2);
        assert!(store.delete_row(2).is_err());
    }

    #[test]
    fn test_set_and_parse_tags() {
        let mut store = store_with_names(&["a"]);
        let tokens = store.set_tags(0, "Tags", &[" urgent", "", "home "], ", ").unwrap();
        assert_eq!(tokens, vec!["urgent", "home"]);
        assert_eq!(store.cell(0, "Tags"), Some(CellValue::from("urgent, home")));
        assert_eq!(store.tags_in(0, "Tags").unwrap(), vec!["urgent", "home"]);
    }

    #[test]
    fn test_column_cascades() {
        let mut store = store_with_names(&["a", "b"]);

        store.on_column_added("Priority");
        assert!(store.rows().iter().all(|r| r.get("Priority") == Some(&CellValue::empty())));

        store.on_column_renamed("Name", "Title");
        for row in store.rows() {
            assert!(row.get("Name").is_none());
            assert_eq!(row.get_index_of("Title"), Some(0));
        }
        assert_eq!(store.cell(1, "Title"), Some(CellValue::from("b")));

        store.on_column_deleted("Date");
        assert!(store.rows().iter().all(|r| !r.contains_key("Date")));
    }

    #[test]
    fn test_apply_order() {
        let mut store = store_with_names(&["a", "b", "c"]);
        store.apply_order(&[2, 0, 1]).unwrap();
        let names: Vec<String> = store.rows().iter().map(|r| r["Name"].to_string()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_apply_order_rejects_non_permutations() {
        let mut store = store_with_names(&["a", "b", "c"]);
        let before = store.clone();

        for order in [&[0, 0, 1][..], &[0, 1], &[0, 1, 3], &[0, 1, 2, 2]] {
            assert_eq!(store.apply_order(order), Err(TableError::InvalidRowOrder { len: 3 }));
            assert_eq!(store, before);
        }
    }

    proptest! {
        #[test]
        fn reorder_row_is_a_permutation(len in 1usize..10, from in 0usize..10, to in 0usize..10) {
            let (from, to) = (from % len, to % len);
            let names: Vec<String> = (0..len).map(|i| format!("r{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut store = store_with_names(&refs);

            store.reorder_row(ReorderIntent::new(from, to)).unwrap();

            prop_assert_eq!(store.len(), len);
            let mut after: Vec<String> =
                store.rows().iter().map(|r| r["Name"].to_string()).collect();
            prop_assert_eq!(after[to].clone(), names[from].clone());
            after.sort();
            let mut before = names.clone();
            before.sort();
            prop_assert_eq!(before, after);
        }
    }
}
