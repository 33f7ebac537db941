use serde_json::Value;

pub const DEVICES: &[&str] = &["cpu", "cuda"];
pub const MAX_SETS: u64 = ae_simulate_plugin::MAX_SETS;

pub struct Validator;

impl Validator {
    pub fn validate_choice(value: &str, valid: &[&str]) -> bool {
        valid.contains(&value)
    }

    pub fn validate_sets(sets: u64) -> bool {
        (1..=MAX_SETS).contains(&sets)
    }

    pub fn validate_step_config(kind: &str, config: &Value) -> Result<(), String> {
        match kind {
            "ae_simulate" => {
                if let Some(device) = config.get("device").and_then(|v| v.as_str()) {
                    if !Self::validate_choice(device, DEVICES) {
                        return Err(format!("Unknown device '{device}'"));
                    }
                }
                if let Some(sets) = config.get("sets").and_then(|v| v.as_u64()) {
                    if !Self::validate_sets(sets) {
                        return Err(format!("Sets must be between 1 and {MAX_SETS}"));
                    }
                }
                if let Some(snr_db) = config.get("snr_db") {
                    if !snr_db.is_number() {
                        return Err("Signal-to-noise ratio must be a number".to_string());
                    }
                }
                Ok(())
            }
            "box_plot" => {
                if let Some(dropna) = config.get("dropna") {
                    if !dropna.is_boolean() {
                        return Err("dropna must be a boolean".to_string());
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
