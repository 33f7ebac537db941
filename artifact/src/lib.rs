use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("artifact has no '{0}' step")]
    MissingStep(String),
    #[error("step '{0}' expects {1} columns, got {2}")]
    ColumnMismatch(String, usize, usize),
    #[error("layer expects {expected} inputs, got {got}")]
    LayerShape { expected: usize, got: usize },
}

/// Where the transform's tensor math runs. Control flow is identical on both;
/// without an accelerator backend `Cuda` downgrades to `Cpu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Cpu,
    Cuda,
}

impl Device {
    pub fn parse(value: &str) -> Option<Device> {
        match value {
            "cpu" => Some(Device::Cpu),
            "cuda" => Some(Device::Cuda),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }

    pub fn resolve(self) -> Device {
        match self {
            Device::Cpu => Device::Cpu,
            Device::Cuda => {
                log::info!("cuda selected, but no accelerator backend is available; switching to cpu");
                Device::Cpu
            }
        }
    }
}

/// Min-max scaler fitted at artifact-build time. Inversion maps normalized
/// reconstructions back to the physical units the model was trained against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f32>,
    pub data_max: Vec<f32>,
}

impl MinMaxScaler {
    pub fn fit(matrix: &Array2<f32>) -> Self {
        let mut data_min = Vec::with_capacity(matrix.ncols());
        let mut data_max = Vec::with_capacity(matrix.ncols());
        for column in matrix.axis_iter(Axis(1)) {
            let mut min = f32::INFINITY;
            let mut max = f32::NEG_INFINITY;
            for value in column.iter() {
                min = min.min(*value);
                max = max.max(*value);
            }
            data_min.push(min);
            data_max.push(max);
        }
        Self { data_min, data_max }
    }

    fn check_columns(&self, name: &str, matrix: &Array2<f32>) -> Result<(), ArtifactError> {
        if matrix.ncols() != self.data_min.len() {
            return Err(ArtifactError::ColumnMismatch(
                name.to_string(),
                self.data_min.len(),
                matrix.ncols(),
            ));
        }
        Ok(())
    }

    pub fn transform(&self, matrix: &Array2<f32>) -> Result<Array2<f32>, ArtifactError> {
        self.check_columns("min_max_scaler", matrix)?;
        let mut scaled = matrix.clone();
        for (j, mut column) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.data_max[j] - min;
            if range == 0.0 {
                column.fill(0.0);
            } else {
                column.mapv_inplace(|value| (value - min) / range);
            }
        }
        Ok(scaled)
    }

    pub fn inverse_transform(&self, matrix: &Array2<f32>) -> Result<Array2<f32>, ArtifactError> {
        self.check_columns("min_max_scaler", matrix)?;
        let mut restored = matrix.clone();
        for (j, mut column) in restored.axis_iter_mut(Axis(1)).enumerate() {
            let min = self.data_min[j];
            let range = self.data_max[j] - min;
            if range == 0.0 {
                column.fill(min);
            } else {
                column.mapv_inplace(|value| value * range + min);
            }
        }
        Ok(restored)
    }
}

/// Replaces non-finite entries with a constant before scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantImputer {
    pub fill_value: f32,
}

impl ConstantImputer {
    pub fn apply(&self, matrix: &Array2<f32>) -> Array2<f32> {
        matrix.mapv(|value| if value.is_finite() { value } else { self.fill_value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Identity,
    Relu,
    Sigmoid,
}

impl Activation {
    fn apply(self, value: f32) -> f32 {
        match self {
            Activation::Identity => value,
            Activation::Relu => value.max(0.0),
            Activation::Sigmoid => 1.0 / (1.0 + (-value).exp()),
        }
    }
}

/// One dense layer. Weights are stored output-major: `weights[[o, i]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub bias: Array1<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn forward(&self, input: &Array2<f32>) -> Result<Array2<f32>, ArtifactError> {
        if input.ncols() != self.weights.ncols() {
            return Err(ArtifactError::LayerShape {
                expected: self.weights.ncols(),
                got: input.ncols(),
            });
        }
        let mut output = input.dot(&self.weights.t()) + &self.bias;
        output.mapv_inplace(|value| self.activation.apply(value));
        Ok(output)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Autoencoder {
    pub encoder: Vec<DenseLayer>,
    pub decoder: Vec<DenseLayer>,
}

impl Autoencoder {
    pub fn encode(&self, input: &Array2<f32>) -> Result<Array2<f32>, ArtifactError> {
        let mut value = input.clone();
        for layer in &self.encoder {
            value = layer.forward(&value)?;
        }
        Ok(value)
    }

    pub fn decode(&self, latent: &Array2<f32>) -> Result<Array2<f32>, ArtifactError> {
        let mut value = latent.clone();
        for layer in &self.decoder {
            value = layer.forward(&value)?;
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum StepKind {
    ConstantImputer(ConstantImputer),
    MinMaxScaler(MinMaxScaler),
    Autoencoder(Autoencoder),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub name: String,
    pub kind: StepKind,
}

/// A pretrained transform: preprocessing steps followed by an autoencoder,
/// with every step addressable by name.
pub trait TransformArtifact {
    /// Runs the pipeline; returns (latent features, normalized reconstruction).
    fn transform(&self, input: &Array2<f32>) -> Result<(Array2<f32>, Array2<f32>), ArtifactError>;

    /// Looks up a named min-max scaling step for inversion.
    fn scaler_step(&self, name: &str) -> Option<&MinMaxScaler>;
}

/// On-disk artifact: an ordered list of named steps, serialized as JSON.
/// This crate consumes the format; training code elsewhere produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    #[serde(default)]
    pub name: Option<String>,
    pub steps: Vec<PipelineStep>,
}

impl PipelineArtifact {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let data = fs::read(path)?;
        Self::from_slice(&data)
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, ArtifactError> {
        let artifact = serde_json::from_slice(data)?;
        Ok(artifact)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

impl TransformArtifact for PipelineArtifact {
    fn transform(&self, input: &Array2<f32>) -> Result<(Array2<f32>, Array2<f32>), ArtifactError> {
        let mut value = input.clone();
        for step in &self.steps {
            match &step.kind {
                StepKind::ConstantImputer(imputer) => value = imputer.apply(&value),
                StepKind::MinMaxScaler(scaler) => value = scaler.transform(&value)?,
                StepKind::Autoencoder(autoencoder) => {
                    let latent = autoencoder.encode(&value)?;
                    let reconstruction = autoencoder.decode(&latent)?;
                    return Ok((latent, reconstruction));
                }
            }
        }
        Err(ArtifactError::MissingStep("autoencoder".to_string()))
    }

    fn scaler_step(&self, name: &str) -> Option<&MinMaxScaler> {
        self.steps.iter().find_map(|step| match &step.kind {
            StepKind::MinMaxScaler(scaler) if step.name == name => Some(scaler),
            _ => None,
        })
    }
}
