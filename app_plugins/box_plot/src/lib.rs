use flimflow_plugin::ui::{Field, FieldType, UISchema};
use flimflow_plugin::{
    AnalysisContext, AnalysisOutput, AnalysisPlugin, PluginError, PluginId, PluginMeta,
};
use serde_json::Value;
use std::collections::BTreeMap;
use table::{Column, DataTable};

/// Five-number summary with Tukey whiskers, clamped to observed values.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: usize,
}

/// Linear-interpolation quantile over sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = (sorted.len() - 1) as f64 * q;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = position - lower as f64;
    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;
    let whisker_low = sorted
        .iter()
        .copied()
        .find(|value| *value >= low_fence)
        .unwrap_or(sorted[0]);
    let whisker_high = sorted
        .iter()
        .rev()
        .copied()
        .find(|value| *value <= high_fence)
        .unwrap_or(sorted[sorted.len() - 1]);
    let outliers = sorted
        .iter()
        .filter(|value| **value < whisker_low || **value > whisker_high)
        .count();
    Some(BoxStats {
        n: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        whisker_low,
        whisker_high,
        outliers,
    })
}

/// Summarizes each selected feature per group: one stats table per feature,
/// ready for the host's plot renderer.
pub struct BoxPlotPlugin {
    id: PluginId,
    meta: PluginMeta,
    dropna: bool,
}

impl BoxPlotPlugin {
    pub fn new(id: u64) -> Self {
        Self {
            id: PluginId(id),
            meta: PluginMeta {
                name: "Box Plot".to_string(),
                default_params: vec![("dropna".to_string(), Value::from(true))],
            },
            dropna: true,
        }
    }

    pub fn set_config(&mut self, dropna: bool) {
        self.dropna = dropna;
    }

    fn grouped_stats(
        &self,
        input: &DataTable,
        feature: &str,
        grouping: &[String],
    ) -> Result<DataTable, PluginError> {
        let values = input
            .numeric_values(feature)
            .map_err(|err| PluginError::Data(err.to_string()))?;

        let group_columns: Vec<(&String, &[String])> = grouping
            .iter()
            .filter_map(|name| match input.column(name) {
                Some(Column::Categorical(col)) => Some((name, col.as_slice())),
                _ => {
                    log::warn!("grouping column '{name}' is not categorical, ignoring");
                    None
                }
            })
            .collect();

        let mut grouped: BTreeMap<Vec<String>, Vec<f64>> = BTreeMap::new();
        for (row, value) in values.iter().enumerate() {
            if self.dropna && !value.is_finite() {
                continue;
            }
            let key: Vec<String> = group_columns
                .iter()
                .map(|(_, col)| col[row].clone())
                .collect();
            grouped.entry(key).or_default().push(*value);
        }

        let mut key_columns: Vec<Vec<String>> = vec![Vec::new(); group_columns.len()];
        let mut n = Vec::new();
        let mut min = Vec::new();
        let mut q1 = Vec::new();
        let mut median = Vec::new();
        let mut q3 = Vec::new();
        let mut max = Vec::new();
        let mut whisker_low = Vec::new();
        let mut whisker_high = Vec::new();
        let mut outliers = Vec::new();
        for (key, group_values) in &grouped {
            let Some(stats) = box_stats(group_values) else {
                continue;
            };
            for (column, label) in key_columns.iter_mut().zip(key.iter()) {
                column.push(label.clone());
            }
            n.push(stats.n as f64);
            min.push(stats.min);
            q1.push(stats.q1);
            median.push(stats.median);
            q3.push(stats.q3);
            max.push(stats.max);
            whisker_low.push(stats.whisker_low);
            whisker_high.push(stats.whisker_high);
            outliers.push(stats.outliers as f64);
        }

        let mut stats_table = DataTable::new();
        for ((name, _), column) in group_columns.iter().zip(key_columns) {
            stats_table
                .push_column(name, Column::Categorical(column))
                .map_err(|err| PluginError::Data(err.to_string()))?;
        }
        for (name, column) in [
            ("n", n),
            ("min", min),
            ("q1", q1),
            ("median", median),
            ("q3", q3),
            ("max", max),
            ("whisker_low", whisker_low),
            ("whisker_high", whisker_high),
            ("outliers", outliers),
        ] {
            stats_table
                .push_column(name, Column::Numeric(column))
                .map_err(|err| PluginError::Data(err.to_string()))?;
        }
        Ok(stats_table)
    }
}

impl AnalysisPlugin for BoxPlotPlugin {
    fn id(&self) -> PluginId {
        self.id
    }

    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn ui_schema(&self) -> Option<UISchema> {
        Some(UISchema {
            fields: vec![Field {
                key: "dropna".to_string(),
                label: "Drop missing values".to_string(),
                field_type: FieldType::Boolean,
            }],
        })
    }

    fn execute(&mut self, ctx: &mut AnalysisContext<'_>) -> Result<AnalysisOutput, PluginError> {
        let mut features: Vec<String> = ctx.features.to_vec();
        features.sort();
        features.dedup();

        let mut outputs = AnalysisOutput::new();
        for feature in &features {
            if ctx.input.numeric_values(feature).is_err() {
                log::warn!("selected feature '{feature}' is not a numeric input column, skipping");
                continue;
            }
            log::debug!("creating box plot summary for {feature}");
            let stats = self.grouped_stats(ctx.input, feature, ctx.grouping)?;
            outputs.insert(format!("Box Plot {feature}"), stats);
        }
        Ok(outputs)
    }
}
