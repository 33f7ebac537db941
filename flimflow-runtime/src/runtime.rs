use crate::plugin_factory::{create_plugin_instance, RuntimePlugin};
use crate::plugin_processors::{process_ae_simulate, process_box_plot};
use flimflow_core::AnalysisProtocol;
use flimflow_plugin::PluginError;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use table::DataTable;

#[derive(thiserror::Error, Debug)]
pub enum RuntimeError {
    #[error("unknown plugin kind '{0}'")]
    UnknownKind(String),
    #[error("unknown input table '{0}'")]
    UnknownInput(String),
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

/// Runs every step in order against the named input tables. Step outputs are
/// added to the working slot set, so later steps can read earlier results.
/// Result keys are `"<step name>/<slot>"`.
pub fn run_protocol(
    protocol: &AnalysisProtocol,
    tables: &HashMap<String, DataTable>,
) -> Result<BTreeMap<String, DataTable>, RuntimeError> {
    let mut rng = StdRng::from_entropy();
    run_protocol_with_rng(protocol, tables, &mut rng)
}

/// Same as [`run_protocol`] but with an injected randomness source, so tests
/// and reproducible runs can seed it.
pub fn run_protocol_with_rng<R: RngCore>(
    protocol: &AnalysisProtocol,
    tables: &HashMap<String, DataTable>,
    rng: &mut R,
) -> Result<BTreeMap<String, DataTable>, RuntimeError> {
    let mut working: HashMap<String, DataTable> = tables.clone();
    let mut results = BTreeMap::new();
    for step in &protocol.steps {
        let input = working
            .get(&step.input)
            .ok_or_else(|| RuntimeError::UnknownInput(step.input.clone()))?
            .clone();
        let mut instance = create_plugin_instance(step)
            .ok_or_else(|| RuntimeError::UnknownKind(step.kind.clone()))?;
        log::debug!("running step {} ({})", step.id, step.kind);
        let output = match &mut instance {
            RuntimePlugin::AeSimulate(plugin) => {
                process_ae_simulate(plugin, step, &input, &mut *rng)?
            }
            RuntimePlugin::BoxPlot(plugin) => process_box_plot(plugin, step, &input, &mut *rng)?,
        };
        for (slot, result) in output {
            working.insert(slot.clone(), result.clone());
            results.insert(format!("{}/{}", step.name, slot), result);
        }
    }
    Ok(results)
}
