use crate::protocol::StepDefinition;
use crate::validation::Validator;
use ae_simulate_plugin::AeSimulatePlugin;
use box_plot_plugin::BoxPlotPlugin;
use flimflow_plugin::AnalysisPlugin;

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub kind: String,
    pub name: String,
    pub default_config: serde_json::Value,
}

/// Bundled analysis plugins and step-id allocation.
pub struct PluginCatalog {
    entries: Vec<CatalogEntry>,
    next_step_id: u64,
}

impl Default for PluginCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}

impl PluginCatalog {
    pub fn bundled() -> Self {
        let simulate = AeSimulatePlugin::new(0);
        let box_plot = BoxPlotPlugin::new(0);
        Self {
            entries: vec![
                CatalogEntry {
                    kind: "ae_simulate".to_string(),
                    name: simulate.meta().name.clone(),
                    default_config: simulate.meta().default_config(),
                },
                CatalogEntry {
                    kind: "box_plot".to_string(),
                    name: box_plot.meta().name.clone(),
                    default_config: box_plot.meta().default_config(),
                },
            ],
            next_step_id: 1,
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, kind_or_name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| {
            entry.kind == kind_or_name || entry.name.eq_ignore_ascii_case(kind_or_name)
        })
    }

    pub fn sync_next_step_id(&mut self, max_id: Option<u64>) {
        if let Some(max) = max_id {
            self.next_step_id = max + 1;
        } else {
            self.next_step_id = 1;
        }
    }

    /// New step with the plugin's default config, reading the named input slot.
    pub fn create_step(&mut self, kind_or_name: &str, input: &str) -> Result<StepDefinition, String> {
        let entry = self
            .entry(kind_or_name)
            .ok_or_else(|| "Plugin is not available".to_string())?;
        let step = StepDefinition {
            id: self.next_step_id,
            kind: entry.kind.clone(),
            name: entry.name.clone(),
            input: input.to_string(),
            features: Vec::new(),
            grouping: Vec::new(),
            config: entry.default_config.clone(),
        };
        self.next_step_id += 1;
        log::debug!("created step {} ({})", step.id, step.kind);
        Ok(step)
    }

    /// Validates a step's config against its plugin kind.
    pub fn validate_step(&self, step: &StepDefinition) -> Result<(), String> {
        if self.entry(&step.kind).is_none() {
            return Err(format!("Unknown plugin kind '{}'", step.kind));
        }
        Validator::validate_step_config(&step.kind, &step.config)
    }
}
