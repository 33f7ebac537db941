use box_plot_plugin::BoxPlotPlugin;
use flimflow_plugin::ui::FieldType;
use flimflow_plugin::{AnalysisContext, AnalysisPlugin};
use rand::rngs::StdRng;
use rand::SeedableRng;
use table::{Column, DataTable};

fn sample_table() -> DataTable {
    let mut table = DataTable::new();
    table
        .push_column(
            "Treatment",
            Column::Categorical(
                ["ctrl", "ctrl", "ctrl", "dox", "dox", "dox"]
                    .iter()
                    .map(|v| v.to_string())
                    .collect(),
            ),
        )
        .expect("push Treatment");
    table
        .push_column(
            "FAD a1",
            Column::Numeric(vec![1.0, 2.0, 3.0, 10.0, 20.0, f64::NAN]),
        )
        .expect("push FAD a1");
    table
        .push_column("FAD a2", Column::Numeric(vec![9.0, 8.0, 7.0, 90.0, 80.0, 70.0]))
        .expect("push FAD a2");
    table
}

fn run(
    plugin: &mut BoxPlotPlugin,
    table: &DataTable,
    features: &[&str],
    grouping: &[&str],
) -> flimflow_plugin::AnalysisOutput {
    let features: Vec<String> = features.iter().map(|v| v.to_string()).collect();
    let grouping: Vec<String> = grouping.iter().map(|v| v.to_string()).collect();
    let mut rng = StdRng::seed_from_u64(0);
    let mut ctx = AnalysisContext {
        input: table,
        features: &features,
        grouping: &grouping,
        rng: &mut rng,
    };
    plugin.execute(&mut ctx).expect("execute")
}

#[test]
fn one_summary_table_per_sorted_feature() {
    let table = sample_table();
    let mut plugin = BoxPlotPlugin::new(1);
    let outputs = run(&mut plugin, &table, &["FAD a2", "FAD a1"], &["Treatment"]);
    let slots: Vec<&String> = outputs.keys().collect();
    assert_eq!(slots, vec!["Box Plot FAD a1", "Box Plot FAD a2"]);

    let stats = outputs.get("Box Plot FAD a2").expect("stats");
    assert_eq!(
        stats.categorical_values("Treatment").expect("groups"),
        &["ctrl".to_string(), "dox".to_string()]
    );
    assert_eq!(stats.numeric_values("median").expect("median"), &[8.0, 80.0]);
    assert_eq!(stats.numeric_values("min").expect("min"), &[7.0, 70.0]);
    assert_eq!(stats.numeric_values("max").expect("max"), &[9.0, 90.0]);
}

#[test]
fn dropna_removes_missing_values_from_groups() {
    let table = sample_table();
    let mut plugin = BoxPlotPlugin::new(1);
    plugin.set_config(true);
    let outputs = run(&mut plugin, &table, &["FAD a1"], &["Treatment"]);
    let stats = outputs.get("Box Plot FAD a1").expect("stats");
    // The NaN row is dropped from the dox group.
    assert_eq!(stats.numeric_values("n").expect("n"), &[3.0, 2.0]);
}

#[test]
fn missing_features_are_skipped() {
    let table = sample_table();
    let mut plugin = BoxPlotPlugin::new(1);
    let outputs = run(&mut plugin, &table, &["FAD a1", "Ghost"], &["Treatment"]);
    assert_eq!(outputs.len(), 1);
    assert!(outputs.contains_key("Box Plot FAD a1"));
}

#[test]
fn no_grouping_summarizes_all_rows() {
    let table = sample_table();
    let mut plugin = BoxPlotPlugin::new(1);
    let outputs = run(&mut plugin, &table, &["FAD a2"], &[]);
    let stats = outputs.get("Box Plot FAD a2").expect("stats");
    assert_eq!(stats.n_rows(), 1);
    assert_eq!(stats.numeric_values("n").expect("n"), &[6.0]);
}

#[test]
fn box_plot_ui_schema() {
    let plugin = BoxPlotPlugin::new(1);
    let schema = plugin.ui_schema().expect("schema");
    assert_eq!(schema.fields.len(), 1);
    assert_eq!(schema.fields[0].key, "dropna");
    assert_eq!(schema.fields[0].field_type, FieldType::Boolean);
}
