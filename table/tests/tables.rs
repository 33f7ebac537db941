use table::{Column, DataTable, TableError};

fn sample_table() -> DataTable {
    let mut table = DataTable::new();
    table
        .push_column(
            "Treatment",
            Column::Categorical(vec!["ctrl".to_string(), "ctrl".to_string(), "dox".to_string()]),
        )
        .expect("push Treatment");
    table
        .push_column(
            "Cell",
            Column::Categorical(vec!["1".to_string(), "2".to_string(), "3".to_string()]),
        )
        .expect("push Cell");
    table
        .push_column("FAD a1", Column::Numeric(vec![30.0, 40.0, 50.0]))
        .expect("push FAD a1");
    table
        .push_column("FAD a2", Column::Numeric(vec![70.0, 60.0, 50.0]))
        .expect("push FAD a2");
    table
}

#[test]
fn column_kinds_are_partitioned() {
    let table = sample_table();
    assert_eq!(table.n_rows(), 3);
    assert_eq!(table.categorical_names(), vec!["Treatment", "Cell"]);
    assert_eq!(table.numeric_names(), vec!["FAD a1", "FAD a2"]);
}

#[test]
fn push_rejects_duplicates_and_ragged_columns() {
    let mut table = sample_table();
    let dup = table.push_column("Cell", Column::Numeric(vec![0.0, 0.0, 0.0]));
    assert!(matches!(dup, Err(TableError::DuplicateColumn(_))));

    let ragged = table.push_column("short", Column::Numeric(vec![1.0]));
    assert!(matches!(ragged, Err(TableError::RowCountMismatch(_, 1, 3))));
}

#[test]
fn integer_values_parse_categorical_identifiers() {
    let table = sample_table();
    assert_eq!(table.integer_values("Cell").expect("parse Cell"), vec![1, 2, 3]);

    let err = table.integer_values("Treatment");
    assert!(matches!(err, Err(TableError::NonIntegerValue(_, _))));
}

#[test]
fn feature_matrix_is_row_major() {
    let table = sample_table();
    let matrix = table
        .feature_matrix(&["FAD a1".to_string(), "FAD a2".to_string()])
        .expect("matrix");
    assert_eq!(matrix.shape(), &[3, 2]);
    assert_eq!(matrix[[0, 0]], 30.0);
    assert_eq!(matrix[[0, 1]], 70.0);
    assert_eq!(matrix[[2, 0]], 50.0);
}

#[test]
fn select_preserves_requested_order() {
    let table = sample_table();
    let selected = table
        .select(&["FAD a2".to_string(), "Treatment".to_string()])
        .expect("select");
    assert_eq!(selected.column_names(), vec!["FAD a2", "Treatment"]);

    let missing = table.select(&["absent".to_string()]);
    assert!(matches!(missing, Err(TableError::UnknownColumn(_))));
}

#[test]
fn concat_rows_requires_matching_layout() {
    let mut combined = DataTable::new();
    combined.concat_rows(&sample_table()).expect("first concat");
    combined.concat_rows(&sample_table()).expect("second concat");
    assert_eq!(combined.n_rows(), 6);
    assert_eq!(
        combined.numeric_values("FAD a1").expect("values"),
        &[30.0, 40.0, 50.0, 30.0, 40.0, 50.0]
    );

    let mut other = DataTable::new();
    other
        .push_column("Cell", Column::Categorical(vec!["1".to_string()]))
        .expect("push");
    assert!(matches!(
        combined.concat_rows(&other),
        Err(TableError::LayoutMismatch)
    ));
}

#[test]
fn save_and_load_round_trip() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("measurements.json");
    let table = sample_table();
    table.save_to_file(&path).expect("save");
    let loaded = DataTable::load_from_file(&path).expect("load");
    assert_eq!(loaded, table);
}

#[test]
fn csv_export_writes_header_and_rows() {
    let table = sample_table();
    let mut buffer = Vec::new();
    table.write_csv(&mut buffer, ",").expect("write csv");
    let text = String::from_utf8(buffer).expect("utf8");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Treatment,Cell,FAD a1,FAD a2"));
    assert_eq!(lines.next(), Some("ctrl,1,30,70"));
    assert_eq!(lines.next(), Some("ctrl,2,40,60"));
    assert_eq!(lines.next(), Some("dox,3,50,50"));
}
