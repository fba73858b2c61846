//! Visualization adapter contract and built-in artifact writers.
//!
//! Rendering itself is out of scope for the framework core; the built-in
//! adapters only write JSON and plain-text artifacts from an analysis
//! output. Richer adapters register through the same seam.

use crate::analysis::ModuleConfig;
use crate::model::output::AnalysisOutput;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub type VisualizationResult = Result<PathBuf, VisualizationError>;

/// Adapter-side failures; isolated per adapter at the pipeline boundary.
#[derive(Debug)]
pub enum VisualizationError {
    Io { path: String, detail: String },
    Serialize { detail: String },
}

impl Display for VisualizationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, detail } => write!(f, "failed to write artifact `{path}`: {detail}"),
            Self::Serialize { detail } => write!(f, "failed to serialize analysis data: {detail}"),
        }
    }
}

impl Error for VisualizationError {}

/// Contract every visualization plugin implements: render one analysis
/// output into an artifact under `output_dir` and return the artifact path.
pub trait VisualizationAdapter {
    fn name(&self) -> &'static str;
    fn generate(
        &self,
        analysis: &AnalysisOutput,
        output_dir: &Path,
        config: &ModuleConfig,
    ) -> VisualizationResult;
}

fn ensure_dir(output_dir: &Path) -> Result<(), VisualizationError> {
    fs::create_dir_all(output_dir).map_err(|err| VisualizationError::Io {
        path: output_dir.display().to_string(),
        detail: err.to_string(),
    })
}

fn write_artifact(path: PathBuf, content: &str) -> VisualizationResult {
    fs::write(&path, content).map_err(|err| VisualizationError::Io {
        path: path.display().to_string(),
        detail: err.to_string(),
    })?;
    Ok(path)
}

/// Writes the full analysis output as a pretty-printed JSON report.
#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl VisualizationAdapter for JsonReportAdapter {
    fn name(&self) -> &'static str {
        "json-report"
    }

    fn generate(
        &self,
        analysis: &AnalysisOutput,
        output_dir: &Path,
        _config: &ModuleConfig,
    ) -> VisualizationResult {
        ensure_dir(output_dir)?;
        let content = analysis
            .to_json_string()
            .map_err(|err| VisualizationError::Serialize {
                detail: err.to_string(),
            })?;
        write_artifact(
            output_dir.join(format!("{}_report.json", analysis.module_name)),
            &content,
        )
    }
}

/// Writes a plain-text table summarizing the output's top-level data keys.
#[derive(Debug, Default)]
pub struct SummaryTableAdapter;

impl VisualizationAdapter for SummaryTableAdapter {
    fn name(&self) -> &'static str {
        "summary-table"
    }

    fn generate(
        &self,
        analysis: &AnalysisOutput,
        output_dir: &Path,
        _config: &ModuleConfig,
    ) -> VisualizationResult {
        ensure_dir(output_dir)?;

        let mut lines = vec![format!("module: {}", analysis.module_name)];
        if let serde_json::Value::Object(map) = &analysis.data {
            for (key, value) in map {
                lines.push(format!("{key}: {}", summarize_value(value)));
            }
        } else {
            lines.push(format!("data: {}", summarize_value(&analysis.data)));
        }
        for (key, value) in &analysis.metadata {
            lines.push(format!("meta.{key}: {}", summarize_value(value)));
        }
        lines.push(String::new());

        write_artifact(
            output_dir.join(format!("{}_summary.txt", analysis.module_name)),
            &lines.join("\n"),
        )
    }
}

fn summarize_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Array(items) => format!("{} items", items.len()),
        serde_json::Value::Object(map) => format!("{} fields", map.len()),
        other => other.to_string(),
    }
}
