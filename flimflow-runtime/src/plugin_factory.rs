use ae_simulate_plugin::AeSimulatePlugin;
use box_plot_plugin::BoxPlotPlugin;
use flimflow_core::StepDefinition;

pub enum RuntimePlugin {
    AeSimulate(AeSimulatePlugin),
    BoxPlot(BoxPlotPlugin),
}

pub fn create_plugin_instance(step: &StepDefinition) -> Option<RuntimePlugin> {
    match step.kind.as_str() {
        "ae_simulate" => Some(RuntimePlugin::AeSimulate(AeSimulatePlugin::new(step.id))),
        "box_plot" => Some(RuntimePlugin::BoxPlot(BoxPlotPlugin::new(step.id))),
        _ => None,
    }
}
