use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A saved analysis: named steps applied to named input tables, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisProtocol {
    pub name: String,
    pub description: String,
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: u64,
    pub kind: String,
    pub name: String,
    /// Name of the table slot this step reads.
    pub input: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub grouping: Vec<String>,
    pub config: serde_json::Value,
}

#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisProtocol {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ProtocolError> {
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProtocolError> {
        let data = fs::read(path)?;
        let protocol = serde_json::from_slice(&data)?;
        Ok(protocol)
    }
}
