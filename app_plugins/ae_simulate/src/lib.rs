use artifact::{Device, MinMaxScaler, PipelineArtifact, TransformArtifact};
use flimflow_plugin::ui::{Field, FieldType, UISchema};
use flimflow_plugin::{
    AnalysisContext, AnalysisOutput, AnalysisPlugin, PluginError, PluginId, PluginMeta,
};
use ndarray::Array2;
use rand_distr::{Distribution, Normal};
use serde_json::Value;
use table::{Column, DataTable};

pub mod derived;
pub mod noise;
pub mod signals;

use derived::{percentage_features, HeuristicResolver};
use signals::classify_signals;

pub const SIMULATED_TABLE: &str = "Table: Simulated";
pub const CALCULATED_TABLE: &str = "Table: Calculated";
/// Name of the scaling step the artifact must carry for inversion.
pub const SCALER_STEP: &str = "minmax";
pub const CELL_COLUMN: &str = "Cell";
pub const MAX_SETS: u64 = 20;

/// Simulates replicate measurement sets by pushing noise-perturbed features
/// through a pretrained autoencoder pipeline and rescaling the reconstruction
/// back to physical units.
pub struct AeSimulatePlugin {
    id: PluginId,
    meta: PluginMeta,
    modelfile: String,
    device: Device,
    sets: u64,
    add_noise: bool,
    snr_db: f64,
}

impl AeSimulatePlugin {
    pub fn new(id: u64) -> Self {
        Self {
            id: PluginId(id),
            meta: PluginMeta {
                name: "Autoencoder: Simulate".to_string(),
                default_params: vec![
                    ("modelfile".to_string(), Value::from("")),
                    ("device".to_string(), Value::from("cpu")),
                    ("sets".to_string(), Value::from(1)),
                    ("add_noise".to_string(), Value::from(true)),
                    ("snr_db".to_string(), Value::from(20.0)),
                ],
            },
            modelfile: String::new(),
            device: Device::Cpu,
            sets: 1,
            add_noise: true,
            snr_db: 20.0,
        }
    }

    pub fn set_config(
        &mut self,
        modelfile: &str,
        device: &str,
        sets: u64,
        add_noise: bool,
        snr_db: f64,
    ) -> Result<(), PluginError> {
        let device = Device::parse(device)
            .ok_or_else(|| PluginError::Config(format!("unknown device '{device}'")))?;
        if sets == 0 || sets > MAX_SETS {
            return Err(PluginError::Config(format!(
                "sets must be between 1 and {MAX_SETS}, got {sets}"
            )));
        }
        self.modelfile = modelfile.to_string();
        self.device = device;
        self.sets = sets;
        self.add_noise = add_noise;
        self.snr_db = snr_db;
        Ok(())
    }

    /// Selected features that are actually numeric columns of the input,
    /// sorted for a reproducible output layout. Absent selections are
    /// skipped, not fatal.
    fn selected_features(input: &DataTable, requested: &[String]) -> Vec<String> {
        let mut features: Vec<String> = Vec::new();
        for name in requested {
            if input.numeric_values(name).is_ok() {
                if !features.contains(name) {
                    features.push(name.clone());
                }
            } else {
                log::warn!("selected feature '{name}' is not a numeric input column, skipping");
            }
        }
        features.sort();
        features
    }

    fn simulate(
        &self,
        ctx: &mut AnalysisContext<'_>,
        artifact: &dyn TransformArtifact,
        scaler: &MinMaxScaler,
        features: &[String],
    ) -> Result<DataTable, PluginError> {
        let input = ctx.input;
        let mut cats = input.categorical_names();
        if !cats.iter().any(|name| name == CELL_COLUMN) {
            if !input.has_column(CELL_COLUMN) {
                return Err(PluginError::Data(format!(
                    "input table has no '{CELL_COLUMN}' entity column"
                )));
            }
            // Numeric entity column; emitted categorical like everything else.
            cats.push(CELL_COLUMN.to_string());
        }
        let cells = input
            .integer_values(CELL_COLUMN)
            .map_err(|err| PluginError::Data(err.to_string()))?;
        let max_cell = cells.iter().max().copied().unwrap_or(0);

        let matrix = input
            .feature_matrix(features)
            .map_err(|err| PluginError::Data(err.to_string()))?
            .mapv(|value| value as f32);

        let sampler = if self.add_noise {
            let params = noise::noise_params(&matrix, self.snr_db)?;
            let normal = Normal::new(params.mean, params.std)
                .map_err(|err| PluginError::Domain(err.to_string()))?;
            Some(normal)
        } else {
            None
        };

        let mut combined = DataTable::new();
        for set in 0..self.sets {
            let mut set_matrix = matrix.clone();
            if let Some(normal) = &sampler {
                for value in set_matrix.iter_mut() {
                    *value += normal.sample(&mut ctx.rng) as f32;
                }
            }

            let (latent, reconstruction) = artifact
                .transform(&set_matrix)
                .map_err(|err| PluginError::Config(format!("incompatible model artifact: {err}")))?;
            log::debug!(
                "set {}: latent {:?}, reconstruction {:?}",
                set + 1,
                latent.shape(),
                reconstruction.shape()
            );

            let simulated = scaler
                .inverse_transform(&reconstruction)
                .map_err(|err| PluginError::Config(format!("incompatible model artifact: {err}")))?;
            if simulated.ncols() != features.len() {
                return Err(PluginError::Config(format!(
                    "incompatible model artifact: reconstruction has {} columns for {} features",
                    simulated.ncols(),
                    features.len()
                )));
            }
            log::debug!(
                "set {}: reconstruction mse {:.6}",
                set + 1,
                mean_squared_error(&simulated, &set_matrix)
            );

            let sub = self.assemble_set(input, &cats, &cells, max_cell, set, features, &simulated)?;
            combined
                .concat_rows(&sub)
                .map_err(|err| PluginError::Data(err.to_string()))?;
        }
        Ok(combined)
    }

    fn assemble_set(
        &self,
        input: &DataTable,
        cats: &[String],
        cells: &[u64],
        max_cell: u64,
        set: u64,
        features: &[String],
        simulated: &Array2<f32>,
    ) -> Result<DataTable, PluginError> {
        let mut sub = DataTable::new();
        for cat in cats {
            if cat == CELL_COLUMN {
                // Offset per set keeps entity identifiers unique after concatenation.
                let offset = max_cell * set;
                let values = cells.iter().map(|cell| (cell + offset).to_string()).collect();
                sub.push_column(cat, Column::Categorical(values))
                    .map_err(|err| PluginError::Data(err.to_string()))?;
            } else {
                let column = input
                    .column(cat)
                    .ok_or_else(|| PluginError::Data(format!("unknown column '{cat}'")))?;
                sub.push_column(cat, column.clone())
                    .map_err(|err| PluginError::Data(err.to_string()))?;
            }
        }
        for (j, feature) in features.iter().enumerate() {
            let values = simulated.column(j).iter().map(|v| f64::from(*v)).collect();
            sub.push_column(feature, Column::Numeric(values))
                .map_err(|err| PluginError::Data(err.to_string()))?;
        }
        Ok(sub)
    }
}

fn mean_squared_error(a: &Array2<f32>, b: &Array2<f32>) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = f64::from(*x) - f64::from(*y);
            diff * diff
        })
        .sum::<f64>()
        / a.len() as f64
}

impl AnalysisPlugin for AeSimulatePlugin {
    fn id(&self) -> PluginId {
        self.id
    }

    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn ui_schema(&self) -> Option<UISchema> {
        Some(UISchema {
            fields: vec![
                Field {
                    key: "modelfile".to_string(),
                    label: "Load Model from File".to_string(),
                    field_type: FieldType::FilePath,
                },
                Field {
                    key: "device".to_string(),
                    label: "Device".to_string(),
                    field_type: FieldType::Choice {
                        options: vec!["cpu".to_string(), "cuda".to_string()],
                    },
                },
                Field {
                    key: "sets".to_string(),
                    label: "Sets".to_string(),
                    field_type: FieldType::Integer {
                        min: Some(1),
                        max: Some(MAX_SETS as i64),
                        step: Some(1),
                    },
                },
                Field {
                    key: "add_noise".to_string(),
                    label: "Add Noise".to_string(),
                    field_type: FieldType::Boolean,
                },
                Field {
                    key: "snr_db".to_string(),
                    label: "Signal-to-Noise Ratio (dB)".to_string(),
                    field_type: FieldType::Float {
                        min: None,
                        max: None,
                        step: Some(0.1),
                    },
                },
            ],
        })
    }

    fn execute(&mut self, ctx: &mut AnalysisContext<'_>) -> Result<AnalysisOutput, PluginError> {
        let features = Self::selected_features(ctx.input, ctx.features);
        if features.is_empty() {
            return Err(PluginError::Data(
                "none of the selected features is present in the input table".to_string(),
            ));
        }
        let groups = classify_signals(&features)?;

        if self.modelfile.is_empty() {
            return Err(PluginError::Config("no model file configured".to_string()));
        }
        let _device = self.device.resolve();
        let artifact = PipelineArtifact::load_from_file(&self.modelfile).map_err(|err| {
            PluginError::Config(format!("cannot load model artifact '{}': {err}", self.modelfile))
        })?;
        let scaler = artifact.scaler_step(SCALER_STEP).ok_or_else(|| {
            PluginError::Config(format!(
                "incompatible model artifact: no '{SCALER_STEP}' scaling step"
            ))
        })?;

        let mut combined = self.simulate(ctx, &artifact, scaler, &features)?;

        let original_columns = ctx.input.column_names();
        let derived = percentage_features(&combined, &groups, &HeuristicResolver, &original_columns)?;
        for (name, values) in &derived {
            combined
                .set_numeric(name, values.clone())
                .map_err(|err| PluginError::Data(err.to_string()))?;
        }

        let cats = combined.categorical_names();
        let mut out_features = features.clone();
        for (name, _) in &derived {
            if !out_features.contains(name) {
                out_features.push(name.clone());
            }
        }
        out_features.sort();

        let mut layout = cats.clone();
        layout.extend(out_features.iter().cloned());
        let simulated = combined
            .select(&layout)
            .map_err(|err| PluginError::Data(err.to_string()))?;

        let mut derived_names: Vec<String> = derived.iter().map(|(name, _)| name.clone()).collect();
        derived_names.sort();
        derived_names.dedup();
        let mut calculated_layout = cats;
        calculated_layout.extend(derived_names);
        let calculated = combined
            .select(&calculated_layout)
            .map_err(|err| PluginError::Data(err.to_string()))?;

        let mut outputs = AnalysisOutput::new();
        outputs.insert(SIMULATED_TABLE.to_string(), simulated);
        outputs.insert(CALCULATED_TABLE.to_string(), calculated);
        Ok(outputs)
    }
}
