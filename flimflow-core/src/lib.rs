pub mod catalog;
pub mod protocol;
pub mod validation;

pub use catalog::{CatalogEntry, PluginCatalog};
pub use protocol::{AnalysisProtocol, ProtocolError, StepDefinition};
pub use validation::Validator;
