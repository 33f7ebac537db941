use flimflow_plugin::PluginError;
use regex::Regex;

/// One logical measured quantity: feature columns sharing a name prefix, with
/// the amplitude sub-channels (`<signal> A<digit>`) that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalGroup {
    pub name: String,
    pub channels: Vec<String>,
}

/// Partitions feature names into signal groups. The group key is the first
/// whitespace-delimited token; amplitude channels match the key followed by
/// whitespace, `A` and exactly one digit, case-insensitively. Groups come
/// back sorted by name, channels in selection order. Unmatched names simply
/// yield groups with empty channel lists.
pub fn classify_signals(features: &[String]) -> Result<Vec<SignalGroup>, PluginError> {
    let mut keys: Vec<String> = Vec::new();
    for feature in features {
        let Some(key) = feature.split_whitespace().next() else {
            continue;
        };
        if !keys.iter().any(|existing| existing == key) {
            keys.push(key.to_string());
        }
    }
    keys.sort();

    let mut groups = Vec::with_capacity(keys.len());
    for key in keys {
        let pattern = format!(r"(?i)^{}\s+a\d$", regex::escape(&key));
        let matcher = Regex::new(&pattern)
            .map_err(|err| PluginError::Config(format!("bad channel pattern for '{key}': {err}")))?;
        let channels = features
            .iter()
            .filter(|feature| matcher.is_match(feature))
            .cloned()
            .collect();
        groups.push(SignalGroup { name: key, channels });
    }
    Ok(groups)
}
