use artifact::{
    Activation, Autoencoder, ConstantImputer, DenseLayer, MinMaxScaler, PipelineArtifact,
    PipelineStep, StepKind,
};
use flimflow_core::{AnalysisProtocol, PluginCatalog};
use flimflow_runtime::{run_protocol_with_rng, RuntimeError};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use table::{Column, DataTable};

fn identity_layer(dim: usize) -> DenseLayer {
    DenseLayer {
        weights: Array2::eye(dim),
        bias: Array1::zeros(dim),
        activation: Activation::Identity,
    }
}

fn write_identity_artifact(dir: &std::path::Path, dim: usize) -> String {
    let artifact = PipelineArtifact {
        name: Some("test model".to_string()),
        steps: vec![
            PipelineStep {
                name: "imputer".to_string(),
                kind: StepKind::ConstantImputer(ConstantImputer { fill_value: 0.0 }),
            },
            PipelineStep {
                name: "minmax".to_string(),
                kind: StepKind::MinMaxScaler(MinMaxScaler {
                    data_min: vec![0.0; dim],
                    data_max: vec![100.0; dim],
                }),
            },
            PipelineStep {
                name: "autoencoder".to_string(),
                kind: StepKind::Autoencoder(Autoencoder {
                    encoder: vec![identity_layer(dim)],
                    decoder: vec![identity_layer(dim)],
                }),
            },
        ],
    };
    let path = dir.join("model.json");
    artifact.save_to_file(&path).expect("save artifact");
    path.to_string_lossy().into_owned()
}

fn raw_table() -> DataTable {
    let mut table = DataTable::new();
    table
        .push_column(
            "Treatment",
            Column::Categorical(
                ["ctrl", "ctrl", "dox", "dox"].iter().map(|v| v.to_string()).collect(),
            ),
        )
        .expect("push Treatment");
    table
        .push_column(
            "Cell",
            Column::Categorical(["1", "2", "3", "4"].iter().map(|v| v.to_string()).collect()),
        )
        .expect("push Cell");
    table
        .push_column("FAD a1", Column::Numeric(vec![30.0, 40.0, 20.0, 10.0]))
        .expect("push FAD a1");
    table
        .push_column("FAD a2", Column::Numeric(vec![70.0, 60.0, 80.0, 90.0]))
        .expect("push FAD a2");
    table
}

fn simulate_protocol(modelfile: &str, sets: u64, add_noise: bool) -> AnalysisProtocol {
    let mut catalog = PluginCatalog::bundled();
    let mut simulate = catalog.create_step("ae_simulate", "Table: Raw").expect("step");
    simulate.features = vec!["FAD a1".to_string(), "FAD a2".to_string()];
    simulate.grouping = vec!["Treatment".to_string()];
    simulate.config["modelfile"] = serde_json::Value::from(modelfile);
    simulate.config["sets"] = serde_json::Value::from(sets);
    simulate.config["add_noise"] = serde_json::Value::from(add_noise);
    simulate.config["snr_db"] = serde_json::Value::from(10.0);

    let mut boxes = catalog.create_step("box_plot", "Table: Simulated").expect("step");
    boxes.features = vec!["FAD a1".to_string()];
    boxes.grouping = vec!["Treatment".to_string()];

    AnalysisProtocol {
        name: "simulate and summarize".to_string(),
        description: String::new(),
        steps: vec![simulate, boxes],
    }
}

fn input_tables() -> HashMap<String, DataTable> {
    let mut tables = HashMap::new();
    tables.insert("Table: Raw".to_string(), raw_table());
    tables
}

#[test]
fn protocol_chains_simulation_into_box_plot() {
    let temp = tempfile::tempdir().expect("tempdir");
    let modelfile = write_identity_artifact(temp.path(), 2);
    let protocol = simulate_protocol(&modelfile, 2, true);

    let mut rng = StdRng::seed_from_u64(42);
    let results = run_protocol_with_rng(&protocol, &input_tables(), &mut rng).expect("run");

    let simulated = results
        .get("Autoencoder: Simulate/Table: Simulated")
        .expect("simulated result");
    assert_eq!(simulated.n_rows(), 8);
    assert!(results.contains_key("Autoencoder: Simulate/Table: Calculated"));

    let stats = results.get("Box Plot/Box Plot FAD a1").expect("box plot result");
    // One row per treatment group.
    assert_eq!(stats.n_rows(), 2);
    assert_eq!(
        stats.categorical_values("Treatment").expect("groups"),
        &["ctrl".to_string(), "dox".to_string()]
    );
    let counts = stats.numeric_values("n").expect("n");
    assert_eq!(counts, &[4.0, 4.0]);
}

#[test]
fn same_seed_reproduces_noisy_runs() {
    let temp = tempfile::tempdir().expect("tempdir");
    let modelfile = write_identity_artifact(temp.path(), 2);
    let protocol = simulate_protocol(&modelfile, 3, true);
    let tables = input_tables();

    let mut first_rng = StdRng::seed_from_u64(7);
    let first = run_protocol_with_rng(&protocol, &tables, &mut first_rng).expect("first");
    let mut second_rng = StdRng::seed_from_u64(7);
    let second = run_protocol_with_rng(&protocol, &tables, &mut second_rng).expect("second");
    assert_eq!(first, second);

    let mut other_rng = StdRng::seed_from_u64(8);
    let other = run_protocol_with_rng(&protocol, &tables, &mut other_rng).expect("other");
    assert_ne!(first, other, "different seeds must draw different noise");
}

#[test]
fn unknown_input_slot_aborts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let modelfile = write_identity_artifact(temp.path(), 2);
    let mut protocol = simulate_protocol(&modelfile, 1, false);
    protocol.steps[0].input = "Table: Missing".to_string();

    let mut rng = StdRng::seed_from_u64(0);
    let result = run_protocol_with_rng(&protocol, &input_tables(), &mut rng);
    assert!(matches!(result, Err(RuntimeError::UnknownInput(_))));
}

#[test]
fn unknown_plugin_kind_aborts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let modelfile = write_identity_artifact(temp.path(), 2);
    let mut protocol = simulate_protocol(&modelfile, 1, false);
    protocol.steps[0].kind = "histogram".to_string();

    let mut rng = StdRng::seed_from_u64(0);
    let result = run_protocol_with_rng(&protocol, &input_tables(), &mut rng);
    assert!(matches!(result, Err(RuntimeError::UnknownKind(_))));
}

#[test]
fn plugin_errors_propagate_without_partial_results() {
    let protocol = simulate_protocol("/nonexistent/model.json", 1, false);
    let mut rng = StdRng::seed_from_u64(0);
    let result = run_protocol_with_rng(&protocol, &input_tables(), &mut rng);
    assert!(matches!(result, Err(RuntimeError::Plugin(_))));
}
