use dbv_engine::{
    CellValue, FixedColorSource, JsonFileStore, MemoryStore, ReorderIntent, SeededColorSource,
    SortDirection, TableConfig, TableEngine, TableSnapshot,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn assert_persisted(
    store: &MemoryStore,
    config: &TableConfig,
    engine: &TableEngine,
) -> anyhow::Result<()> {
    let stored = TableSnapshot::load(store, config)?;
    assert_eq!(stored, engine.snapshot());
    Ok(())
}

#[test]
fn single_row_lifecycle() -> anyhow::Result<()> {
    init_tracing();
    let config = TableConfig::default();
    let store = MemoryStore::new();
    let mut engine = TableEngine::open(store.clone(), SeededColorSource::new(1), config.clone())?;

    assert!(engine.rows().is_empty());
    let names: Vec<&str> = engine.columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Name", "Date", "Tags", "Status"]);

    let row = engine.add_row()?;
    assert_eq!(row.len(), 4);
    assert_persisted(&store, &config, &engine)?;

    engine.edit_cell(0, "Name", "Draft")?;
    assert_eq!(engine.cell(0, "Name"), Some(CellValue::from("Draft")));
    assert_persisted(&store, &config, &engine)?;

    let before = engine.snapshot();
    engine.sort_by_column(0, SortDirection::Asc)?;
    assert_eq!(engine.snapshot(), before);
    assert_persisted(&store, &config, &engine)?;

    let removed = engine.delete_row(0)?;
    assert_eq!(removed["Name"], CellValue::from("Draft"));
    assert!(engine.rows().is_empty());
    assert_persisted(&store, &config, &engine)?;

    Ok(())
}

#[test]
fn state_survives_reopen_from_disk() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("database.json");
    let config = TableConfig::default();

    let tag_colors = {
        let store = JsonFileStore::open(&path)?;
        let mut engine = TableEngine::open(store, SeededColorSource::new(99), config.clone())?;
        engine.set_title("Reading list")?;
        engine.add_column("number", Some("Pages"))?;
        for (name, pages) in [("Dune", "412"), ("Emma", "abc")] {
            engine.add_row()?;
            let last = engine.rows().len() - 1;
            engine.edit_cell(last, "Name", name)?;
            engine.edit_cell(last, "Pages", pages)?;
        }
        engine.set_tags(0, &["scifi", "classic"])?;
        engine.reorder_row(ReorderIntent::new(1, 0))?;
        engine.tag_colors().as_map().clone()
    };

    // A different color source must not matter for tags already assigned
    let store = JsonFileStore::open(&path)?;
    let mut engine = TableEngine::open(store, FixedColorSource::new(vec![7]), config)?;
    assert_eq!(engine.title(), "Reading list");
    assert_eq!(engine.columns().len(), 5);
    assert_eq!(engine.cell(0, "Name"), Some(CellValue::from("Emma")));
    assert_eq!(engine.cell(0, "Pages"), Some(CellValue::Number(0.0)));
    assert_eq!(engine.cell(1, "Pages"), Some(CellValue::Number(412.0)));
    assert_eq!(engine.cell(1, "Tags"), Some(CellValue::from("scifi, classic")));
    assert_eq!(engine.tag_colors().as_map(), &tag_colors);

    let badges = engine.row_tags(1)?;
    assert_eq!(badges[0].1, tag_colors["scifi"]);
    assert_eq!(badges[1].1, tag_colors["classic"]);
    Ok(())
}

#[test]
fn namespaces_keep_tables_apart() -> anyhow::Result<()> {
    init_tracing();
    let store = MemoryStore::new();

    let mut tasks = TableEngine::open(
        store.clone(),
        FixedColorSource::default(),
        TableConfig::default().with_namespace("tasks"),
    )?;
    let mut notes = TableEngine::open(
        store.clone(),
        FixedColorSource::default(),
        TableConfig::default().with_namespace("notes"),
    )?;

    tasks.add_row()?;
    notes.set_title("Notes")?;

    assert_eq!(store.raw("tasks:tableData").map(|v| v.as_array().map(Vec::len)), Some(Some(1)));
    let notes_rows = store.raw("notes:tableData");
    assert!(notes_rows.map_or(false, |v| v.as_array().map_or(false, Vec::is_empty)));
    assert_eq!(store.raw("notes:tableHeading"), Some(serde_json::json!("Notes")));
    assert_eq!(store.raw("tasks:tableHeading"), Some(serde_json::json!("Database")));
    assert!(store.raw("tableData").is_none());
    Ok(())
}
