pub mod plugin_factory;
pub mod plugin_processors;
pub mod runtime;

pub use plugin_factory::{create_plugin_instance, RuntimePlugin};
pub use runtime::{run_protocol, run_protocol_with_rng, RuntimeError};
