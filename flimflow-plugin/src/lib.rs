use rand::RngCore;
use serde_json::Value;
use std::collections::BTreeMap;
use table::DataTable;

pub mod ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginId(pub u64);

#[derive(Debug, Clone)]
pub struct PluginMeta {
    pub name: String,
    pub default_params: Vec<(String, Value)>,
}

impl PluginMeta {
    /// Default parameters as a JSON object, the shape step configs are stored in.
    pub fn default_config(&self) -> Value {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.default_params {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PluginError {
    /// Bad or missing model file, incompatible artifact, out-of-range option.
    /// Fatal before any table is produced.
    #[error("configuration error: {0}")]
    Config(String),
    /// Invalid numeric regime, e.g. logarithm of non-positive signal power.
    #[error("domain error: {0}")]
    Domain(String),
    /// The input table cannot support the operation at all.
    #[error("data error: {0}")]
    Data(String),
}

/// Result slots, keyed by slot name. BTreeMap keeps output ordering stable.
pub type AnalysisOutput = BTreeMap<String, DataTable>;

/// Everything an execution sees: the input table, the selection the host
/// dialog produced, and the randomness source threaded in by the runtime.
pub struct AnalysisContext<'a> {
    pub input: &'a DataTable,
    pub features: &'a [String],
    pub grouping: &'a [String],
    pub rng: &'a mut dyn RngCore,
}

pub trait AnalysisPlugin {
    fn id(&self) -> PluginId;

    fn meta(&self) -> &PluginMeta;

    /// Declarative description of the configuration form; the host dialog
    /// layer renders it. None means the plugin has nothing to configure
    /// beyond feature/grouping selection.
    fn ui_schema(&self) -> Option<ui::UISchema> {
        None
    }

    /// Runs the analysis. Either every output slot is produced or an error
    /// propagates; partial results are never returned.
    fn execute(&mut self, ctx: &mut AnalysisContext<'_>) -> Result<AnalysisOutput, PluginError>;
}
