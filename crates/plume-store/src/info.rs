//! Dataset variable metadata (`info.json`).

use indexmap::IndexMap;
use plume_core::NormStats;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Per-variable entry: channel position and dataset statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableInfo {
    /// Channel position within the stack.
    pub index: usize,
    /// Dataset-wide mean.
    pub mean: f64,
    /// Dataset-wide sample standard deviation.
    pub std: f64,
    /// Smallest value seen, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Largest value seen, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl VariableInfo {
    /// An entry without min/max.
    pub fn new(index: usize, stats: NormStats) -> Self {
        Self {
            index,
            mean: stats.mean,
            std: stats.std,
            min: None,
            max: None,
        }
    }

    /// The `(mean, std)` pair.
    pub fn stats(&self) -> NormStats {
        NormStats::new(self.mean, self.std)
    }
}

fn default_normalized() -> bool {
    true
}

/// Variables of a dataset, split into inputs and labels.
///
/// Keys are quantity identifiers such as `"Temperature [C]"`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Input channels.
    #[serde(rename = "Inputs")]
    pub inputs: IndexMap<String, VariableInfo>,
    /// Label channels.
    #[serde(rename = "Labels")]
    pub labels: IndexMap<String, VariableInfo>,
    /// Edge length of one grid cell in metres.
    #[serde(rename = "CellsSize", default, skip_serializing_if = "Option::is_none")]
    pub cell_size: Option<f64>,
    /// Grid dimensions of each run.
    #[serde(rename = "Dimensions", default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<usize>>,
    /// Whether stored values are already standardized.
    #[serde(rename = "Normalized", default = "default_normalized")]
    pub normalized: bool,
}

fn ordered(map: &IndexMap<String, VariableInfo>) -> Vec<&str> {
    let mut names: Vec<(&str, usize)> = map.iter().map(|(k, v)| (k.as_str(), v.index)).collect();
    names.sort_by_key(|&(_, i)| i);
    names.into_iter().map(|(k, _)| k).collect()
}

fn check_indices(category: &str, map: &IndexMap<String, VariableInfo>) -> Result<(), StoreError> {
    let mut seen = vec![false; map.len()];
    for (name, v) in map {
        match seen.get_mut(v.index) {
            Some(slot) if !*slot => *slot = true,
            _ => {
                return Err(StoreError::Malformed {
                    detail: format!(
                        "{category} variable '{name}' has index {} (duplicate or beyond {})",
                        v.index,
                        map.len()
                    ),
                })
            }
        }
    }
    Ok(())
}

impl DatasetInfo {
    /// Parse an `info.json` document.
    pub fn from_json_str(s: &str) -> Result<Self, StoreError> {
        let info: Self = serde_json::from_str(s)?;
        info.validate()?;
        Ok(info)
    }

    /// Check that each category's indices are exactly `0..n`.
    pub fn validate(&self) -> Result<(), StoreError> {
        check_indices("input", &self.inputs)?;
        check_indices("label", &self.labels)
    }

    /// Input names in channel order.
    pub fn input_names(&self) -> Vec<&str> {
        ordered(&self.inputs)
    }

    /// Label names in channel order.
    pub fn label_names(&self) -> Vec<&str> {
        ordered(&self.labels)
    }

    /// Statistics of input `name`.
    pub fn input_stats(&self, name: &str) -> Option<NormStats> {
        self.inputs.get(name).map(VariableInfo::stats)
    }

    /// Statistics of label `name`.
    pub fn label_stats(&self, name: &str) -> Option<NormStats> {
        self.labels.get(name).map(VariableInfo::stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "Inputs": {
            "Material_ID": {"index": 1, "mean": 1.1, "std": 0.3},
            "Pressure [Pa]": {"index": 0, "mean": 9.1e5, "std": 2.0e3, "min": 9.0e5, "max": 9.2e5}
        },
        "Labels": {
            "Temperature [C]": {"index": 0, "mean": 10.7, "std": 0.4}
        },
        "CellsSize": 5.0
    }"#;

    #[test]
    fn parse_orders_by_index() {
        let info = DatasetInfo::from_json_str(DOC).unwrap();
        assert_eq!(info.input_names(), ["Pressure [Pa]", "Material_ID"]);
        assert_eq!(info.cell_size, Some(5.0));
        assert!(info.normalized);
        assert_eq!(
            info.label_stats("Temperature [C]"),
            Some(NormStats::new(10.7, 0.4))
        );
        assert_eq!(info.inputs["Pressure [Pa]"].max, Some(9.2e5));
    }

    #[test]
    fn duplicate_index_rejected() {
        let doc = DOC.replace(r#""index": 1"#, r#""index": 0"#);
        assert!(matches!(
            DatasetInfo::from_json_str(&doc),
            Err(StoreError::Malformed { .. })
        ));
    }

    #[test]
    fn serializes_back() {
        let info = DatasetInfo::from_json_str(DOC).unwrap();
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"Inputs\""));
        assert!(!json.contains("Dimensions"));
        assert_eq!(DatasetInfo::from_json_str(&json).unwrap(), info);
    }
}
