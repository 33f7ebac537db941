use ae_simulate_plugin::AeSimulatePlugin;
use box_plot_plugin::BoxPlotPlugin;
use flimflow_core::StepDefinition;
use flimflow_plugin::{AnalysisContext, AnalysisOutput, AnalysisPlugin, PluginError};
use rand::RngCore;
use table::DataTable;

pub fn process_ae_simulate(
    plugin_instance: &mut AeSimulatePlugin,
    step: &StepDefinition,
    input: &DataTable,
    rng: &mut dyn RngCore,
) -> Result<AnalysisOutput, PluginError> {
    let modelfile = step
        .config
        .get("modelfile")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    let device = step
        .config
        .get("device")
        .and_then(|v| v.as_str())
        .unwrap_or("cpu");
    let sets = step.config.get("sets").and_then(|v| v.as_u64()).unwrap_or(1);
    let add_noise = step
        .config
        .get("add_noise")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    let snr_db = step
        .config
        .get("snr_db")
        .and_then(|v| v.as_f64())
        .unwrap_or(20.0);
    plugin_instance.set_config(modelfile, device, sets, add_noise, snr_db)?;

    let mut ctx = AnalysisContext {
        input,
        features: &step.features,
        grouping: &step.grouping,
        rng,
    };
    plugin_instance.execute(&mut ctx)
}

pub fn process_box_plot(
    plugin_instance: &mut BoxPlotPlugin,
    step: &StepDefinition,
    input: &DataTable,
    rng: &mut dyn RngCore,
) -> Result<AnalysisOutput, PluginError> {
    let dropna = step
        .config
        .get("dropna")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    plugin_instance.set_config(dropna);

    let mut ctx = AnalysisContext {
        input,
        features: &step.features,
        grouping: &step.grouping,
        rng,
    };
    plugin_instance.execute(&mut ctx)
}
