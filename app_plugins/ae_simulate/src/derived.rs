use crate::signals::SignalGroup;
use flimflow_plugin::PluginError;
use table::DataTable;

/// Picks the output column name for a derived percentage feature.
///
/// The default heuristic reuses an "already-percent" column from the original
/// input when one uniquely matches; anything ambiguous is flagged instead of
/// silently picking a candidate.
pub trait PercentNameResolver {
    fn resolve(&self, channel: &str, original_columns: &[String]) -> String;
}

pub struct HeuristicResolver;

impl PercentNameResolver for HeuristicResolver {
    fn resolve(&self, channel: &str, original_columns: &[String]) -> String {
        let candidates: Vec<&String> = original_columns
            .iter()
            .filter(|name| name.contains(channel) && name.contains('%') && !name.contains('/'))
            .collect();
        match candidates.as_slice() {
            [unique] => (*unique).clone(),
            [] => format!("{channel}%"),
            _ => {
                log::warn!(
                    "ambiguous percent column for '{channel}' ({} candidates), using synthesized name",
                    candidates.len()
                );
                format!("{channel}%")
            }
        }
    }
}

/// Percentage features per signal group: row-wise channel total, then
/// `100 * value / total` per channel. A zero total divides out to NaN/inf
/// under IEEE semantics rather than raising. Channels missing from the table
/// are skipped with a warning; groups without channels contribute nothing.
pub fn percentage_features(
    table: &DataTable,
    groups: &[SignalGroup],
    resolver: &dyn PercentNameResolver,
    original_columns: &[String],
) -> Result<Vec<(String, Vec<f64>)>, PluginError> {
    let mut derived = Vec::new();
    for group in groups {
        let channels: Vec<&String> = group
            .channels
            .iter()
            .filter(|channel| {
                let present = table.numeric_values(channel).is_ok();
                if !present {
                    log::warn!(
                        "amplitude channel '{channel}' of group '{}' is not in the table, skipping",
                        group.name
                    );
                }
                present
            })
            .collect();
        if channels.is_empty() {
            continue;
        }

        let rows = table.n_rows();
        let mut totals = vec![0.0_f64; rows];
        for channel in &channels {
            let values = table
                .numeric_values(channel)
                .map_err(|err| PluginError::Data(err.to_string()))?;
            for (total, value) in totals.iter_mut().zip(values.iter()) {
                *total += *value;
            }
        }

        for channel in &channels {
            let values = table
                .numeric_values(channel)
                .map_err(|err| PluginError::Data(err.to_string()))?;
            let percentages = values
                .iter()
                .zip(totals.iter())
                .map(|(value, total)| 100.0 * value / total)
                .collect();
            let name = resolver.resolve(channel, original_columns);
            derived.push((name, percentages));
        }
    }
    Ok(derived)
}
