//! Table engine implementation

use dbv_core::{
    CellValue, ColorSource, ColumnDefinition, ColumnType, EventBus, EventHandler, KeyValueStore,
    ReorderIntent, RowRecord, SortDirection, TableConfig, TableError, TableEvent, TableResult,
    TagColor,
};
use dbv_data::{query, RowStore, TableSchema, TagColorRegistry};
use tracing::{debug, info, warn};

use crate::snapshot::{SnapshotRef, TableSnapshot};

/// The table state engine.
///
/// Every mutating call runs to completion on live state, then writes the
/// whole snapshot (columns, rows, tag colors, title) through the store
/// before returning. A failed write leaves the mutation in place, puts the
/// engine in degraded mode and is reported as
/// [`TableError::PersistenceWriteFailed`]; the next successful write ends
/// degraded mode.
///
/// Keys whose stored value could not be decoded at open are never written
/// over until [`TableEngine::discard_unreadable`] is called.
pub struct TableEngine {
    schema: TableSchema,
    rows: RowStore,
    tags: TagColorRegistry,
    title: String,

    /// Text filter over the anchor column; view state, never persisted
    filter_text: String,

    config: TableConfig,
    store: Box<dyn KeyValueStore>,
    colors: Box<dyn ColorSource>,
    events: EventBus,
    degraded: bool,
    unreadable: Vec<String>,
}

impl TableEngine {
    /// Load the table stored in `store`, or start a fresh one
    pub fn open<S, C>(store: S, colors: C, config: TableConfig) -> TableResult<Self>
    where
        S: KeyValueStore + 'static,
        C: ColorSource + 'static,
    {
        let (snapshot, unreadable) = TableSnapshot::load_with_report(&store, &config)?;
        if !unreadable.is_empty() {
            warn!(
                "Keys {:?} in {} did not load cleanly and will not be written",
                unreadable,
                store.store_name()
            );
        }
        info!(
            "Opened table {:?} from {}: {} columns, {} rows, {} tags",
            snapshot.title,
            store.store_name(),
            snapshot.columns.len(),
            snapshot.rows.len(),
            snapshot.tag_colors.len()
        );

        Ok(Self {
            schema: TableSchema::from_columns(snapshot.columns),
            rows: RowStore::from_rows(snapshot.rows),
            tags: TagColorRegistry::from_map(snapshot.tag_colors, config.effective_palette()),
            title: snapshot.title,
            filter_text: String::new(),
            config,
            store: Box::new(store),
            colors: Box::new(colors),
            events: EventBus::new(),
            degraded: false,
            unreadable,
        })
    }

    /// Register a change handler
    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    // --- read surface ---

    pub fn columns(&self) -> &[ColumnDefinition] {
        self.schema.columns()
    }

    pub fn rows(&self) -> &[RowRecord] {
        self.rows.rows()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tag_colors(&self) -> &TagColorRegistry {
        &self.tags
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Cell at (`row`, `column`); a missing key reads as empty
    pub fn cell(&self, row: usize, column: &str) -> Option<CellValue> {
        self.rows.cell(row, column)
    }

    /// Whether the last snapshot write failed
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Stored keys left untouched because they did not decode at open
    pub fn unreadable_keys(&self) -> &[String] {
        &self.unreadable
    }

    /// Owned copy of the state the engine persists
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            columns: self.schema.columns().to_vec(),
            rows: self.rows.rows().to_vec(),
            tag_colors: self.tags.as_map().clone(),
            title: self.title.clone(),
        }
    }

    // --- columns ---

    /// Add a column by type name (`"text"`, `"number"`, `"select"`, `"date"`)
    pub fn add_column(
        &mut self,
        type_name: &str,
        name: Option<&str>,
    ) -> TableResult<ColumnDefinition> {
        let column_type = type_name.parse::<ColumnType>()?;
        self.add_typed_column(column_type, name)
    }

    /// Add a column; every existing row gains its key with an empty value
    pub fn add_typed_column(
        &mut self,
        column_type: ColumnType,
        name: Option<&str>,
    ) -> TableResult<ColumnDefinition> {
        let column = self.schema.add_column(column_type, name)?;
        self.rows.on_column_added(&column.name);
        self.events.publish(TableEvent::ColumnAdded {
            index: self.schema.len() - 1,
            name: column.name.clone(),
        });
        self.persist()?;
        Ok(column)
    }

    /// Rename a column; row values follow the column to its new name
    pub fn rename_column(&mut self, index: usize, new_name: &str) -> TableResult<()> {
        let old_name = self.schema.rename_column(index, new_name)?;
        if old_name == new_name {
            return Ok(());
        }
        self.rows.on_column_renamed(&old_name, new_name);
        self.events.publish(TableEvent::ColumnRenamed {
            index,
            old_name,
            new_name: new_name.to_string(),
        });
        self.persist()
    }

    /// Delete a column and its key from every row
    pub fn delete_column(&mut self, index: usize) -> TableResult<ColumnDefinition> {
        let column = self.schema.delete_column(index)?;
        self.rows.on_column_deleted(&column.name);
        self.events.publish(TableEvent::ColumnDeleted {
            index,
            name: column.name.clone(),
        });
        self.persist()?;
        Ok(column)
    }

    /// Apply a column drag; returns whether anything moved
    pub fn reorder_column(&mut self, intent: ReorderIntent) -> TableResult<bool> {
        if !self.schema.reorder_column(intent)? {
            return Ok(false);
        }
        if let Some(to) = intent.destination {
            self.events.publish(TableEvent::ColumnMoved {
                from: intent.source,
                to,
            });
        }
        self.persist()?;
        Ok(true)
    }

    // --- rows ---

    /// Append a row with an empty value for every column
    pub fn add_row(&mut self) -> TableResult<RowRecord> {
        let row = self.rows.add_row(self.schema.names());
        self.events.publish(TableEvent::RowAdded {
            index: self.rows.len() - 1,
        });
        self.persist()?;
        Ok(row)
    }

    /// Remove and return a row
    pub fn delete_row(&mut self, index: usize) -> TableResult<RowRecord> {
        let row = self.rows.delete_row(index)?;
        self.events.publish(TableEvent::RowDeleted { index });
        self.persist()?;
        Ok(row)
    }

    /// Apply a row drag; returns whether anything moved
    pub fn reorder_row(&mut self, intent: ReorderIntent) -> TableResult<bool> {
        if !self.rows.reorder_row(intent)? {
            return Ok(false);
        }
        if let Some(to) = intent.destination {
            self.events.publish(TableEvent::RowMoved {
                from: intent.source,
                to,
            });
        }
        self.persist()?;
        Ok(true)
    }

    /// Edit one cell.
    ///
    /// Number columns coerce the input, unparsable input becomes `0`. A
    /// column name missing from the schema adds an ad hoc key to this row
    /// only; the schema is left alone.
    pub fn edit_cell(&mut self, row: usize, column: &str, raw: &str) -> TableResult<CellValue> {
        let declared = self.schema.column_type(column);
        let value = self.rows.edit_cell(row, column, raw, declared)?;
        self.events.publish(TableEvent::CellEdited {
            row,
            column: column.to_string(),
        });
        self.persist()?;
        Ok(value)
    }

    /// Replace a row's tags, assigning colors to tags seen for the first time.
    ///
    /// Returns each stored tag with its color.
    pub fn set_tags<S: AsRef<str>>(
        &mut self,
        row: usize,
        tags: &[S],
    ) -> TableResult<Vec<(String, TagColor)>> {
        let tokens = self.rows.set_tags(
            row,
            &self.config.tags_column,
            tags,
            &self.config.tag_separator,
        )?;
        let badges = self.assign_colors(tokens);
        self.events.publish(TableEvent::TagsChanged { row });
        self.persist()?;
        Ok(badges)
    }

    /// Tags of a row with their colors, assigning colors to unseen tags.
    ///
    /// Writes the snapshot only when a new color was assigned.
    pub fn row_tags(&mut self, row: usize) -> TableResult<Vec<(String, TagColor)>> {
        let tokens = self.rows.tags_in(row, &self.config.tags_column)?;
        let before = self.tags.len();
        let badges = self.assign_colors(tokens);
        if self.tags.len() != before {
            self.persist()?;
        }
        Ok(badges)
    }

    /// Color of `tag`, assigned on first sight and stable afterwards
    pub fn color_for(&mut self, tag: &str) -> TableResult<TagColor> {
        let lookup = self.tags.color_for(tag, self.colors.as_mut());
        if lookup.assigned {
            self.events.publish(TableEvent::TagColorAssigned {
                tag: tag.trim().to_string(),
                color: lookup.color,
            });
            self.persist()?;
        }
        Ok(lookup.color)
    }

    fn assign_colors(&mut self, tokens: Vec<String>) -> Vec<(String, TagColor)> {
        tokens
            .into_iter()
            .map(|tag| {
                let lookup = self.tags.color_for(&tag, self.colors.as_mut());
                if lookup.assigned {
                    self.events.publish(TableEvent::TagColorAssigned {
                        tag: tag.clone(),
                        color: lookup.color,
                    });
                }
                (tag, lookup.color)
            })
            .collect()
    }

    // --- sort & filter ---

    /// Sort rows by the column at `index` and keep the result as the row order
    pub fn sort_by_column(&mut self, index: usize, direction: SortDirection) -> TableResult<()> {
        let column = self
            .schema
            .get(index)
            .map(|c| c.name.clone())
            .ok_or_else(|| TableError::column_out_of_range(index, self.schema.len()))?;

        let order = query::sort_order(self.rows.rows(), &column, direction);
        if order.iter().enumerate().all(|(i, &j)| i == j) {
            debug!("Sort by {:?} left row order unchanged", column);
            return Ok(());
        }

        self.rows.apply_order(&order)?;
        self.events.publish(TableEvent::RowsSorted { column, direction });
        self.persist()
    }

    /// Set the text filter; an empty string shows every row
    pub fn set_filter(&mut self, text: &str) {
        self.filter_text = text.to_string();
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    /// Rows matching the current filter, with their index in [`Self::rows`]
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, &RowRecord)> + '_ {
        query::filter_by_text(self.rows.rows(), &self.filter_text, &self.config.anchor_column)
    }

    /// Number of rows matching the current filter
    pub fn visible_count(&self) -> usize {
        self.visible_rows().count()
    }

    // --- title ---

    pub fn set_title(&mut self, title: &str) -> TableResult<()> {
        if self.title == title {
            return Ok(());
        }
        self.title = title.to_string();
        self.events.publish(TableEvent::TitleChanged {
            title: self.title.clone(),
        });
        self.persist()
    }

    // --- persistence ---

    /// Write the current snapshot now, e.g. to leave degraded mode
    pub fn sync(&mut self) -> TableResult<()> {
        self.persist()
    }

    /// Give up on the keys that did not decode at open and write the loaded
    /// state over them
    pub fn discard_unreadable(&mut self) -> TableResult<()> {
        if self.unreadable.is_empty() {
            return Ok(());
        }
        warn!("Overwriting unreadable keys {:?}", self.unreadable);
        self.unreadable.clear();
        self.persist()
    }

    fn persist(&mut self) -> TableResult<()> {
        let snapshot = SnapshotRef {
            columns: self.schema.columns(),
            rows: self.rows.rows(),
            tag_colors: self.tags.as_map(),
            title: &self.title,
        };

        let failure = match snapshot.entries(&self.config.storage) {
            Ok(entries) => {
                let mut failure = None;
                for (key, value) in entries {
                    if self.unreadable.contains(&key) {
                        debug!("Leaving unreadable key {:?} as stored", key);
                        continue;
                    }
                    if let Err(source) = self.store.set(&key, value) {
                        let store_name = self.store.store_name();
                        warn!("Failed to write {:?} to {}: {}", key, store_name, source);
                        if failure.is_none() {
                            failure = Some((key, source));
                        }
                    }
                }
                failure
            }
            Err(encode_failure) => Some(encode_failure),
        };

        match failure {
            Some((key, source)) => {
                if !self.degraded {
                    warn!("Persistence degraded, continuing in memory only");
                }
                self.degraded = true;
                self.events.publish(TableEvent::PersistenceFailed { key: key.clone() });
                Err(TableError::PersistenceWriteFailed { key, source })
            }
            None => {
                if self.degraded {
                    info!("Persistence restored on {}", self.store.store_name());
                    self.degraded = false;
                    self.events.publish(TableEvent::PersistenceRestored);
                }
                Ok(())
            }
        }
    }
}
