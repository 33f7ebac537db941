use flimflow_plugin::PluginError;
use ndarray::Array2;

/// Additive zero-mean Gaussian noise, calibrated against the signal's mean
/// power at a target SNR. Scalars broadcast over the whole feature matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    pub mean: f64,
    pub std: f64,
}

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

pub fn linear_to_db(value: f64) -> f64 {
    10.0 * value.log10()
}

/// Noise parameters for a target SNR in decibels.
///
/// The mean signal power is taken over all matrix elements, not per feature.
/// Non-positive mean power has no decibel representation and is rejected.
pub fn noise_params(matrix: &Array2<f32>, snr_db: f64) -> Result<NoiseParams, PluginError> {
    if matrix.is_empty() {
        return Err(PluginError::Domain("feature matrix is empty".to_string()));
    }
    let signal_avg_power = matrix
        .iter()
        .map(|value| {
            let v = f64::from(*value);
            v * v
        })
        .sum::<f64>()
        / matrix.len() as f64;
    if signal_avg_power <= 0.0 {
        return Err(PluginError::Domain(format!(
            "mean signal power must be positive, got {signal_avg_power}"
        )));
    }
    let signal_avg_db = linear_to_db(signal_avg_power);
    let noise_avg_db = signal_avg_db - snr_db;
    let noise_avg_power = db_to_linear(noise_avg_db);
    Ok(NoiseParams {
        mean: 0.0,
        std: noise_avg_power.sqrt(),
    })
}
