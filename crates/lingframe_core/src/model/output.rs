//! Analysis output interchange value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uniform return value of every analysis module.
///
/// The single data-interchange contract between analysis modules, the
/// pipeline, and visualization adapters. `data` is module-specific;
/// `metadata` carries capability/backend notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub module_name: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl AnalysisOutput {
    pub fn new(module_name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            module_name: module_name.into(),
            data,
            metadata: BTreeMap::new(),
        }
    }

    /// Adds one metadata entry, consuming and returning the output for
    /// chained construction.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::AnalysisOutput;

    #[test]
    fn serializes_with_the_interchange_field_set() {
        let output = AnalysisOutput::new("sentiment", serde_json::json!({"score": 0.5}))
            .with_metadata("backend", "lexicon");
        let value = serde_json::to_value(&output).expect("serialize");

        assert_eq!(value["module_name"], "sentiment");
        assert_eq!(value["data"]["score"], 0.5);
        assert_eq!(value["metadata"]["backend"], "lexicon");
    }
}
