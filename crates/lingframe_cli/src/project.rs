//! Project configuration loading and resolution.
//!
//! # Responsibility
//! - Resolve a project reference (`name` or `category/name`) to a directory
//!   holding a `project.toml`.
//! - Translate the TOML configuration into a core `PipelineConfig`.

use lingframe_core::{
    AdapterSpec, AtomizationSchema, DocumentSpec, ModuleConfig, ModuleSpec, NamingStrategyKind,
    OutputDirs, PipelineConfig, Registry,
};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE: &str = "project.toml";

/// CLI-level failures mapped to one-line messages and exit code 1.
#[derive(Debug)]
pub enum CliError {
    ProjectNotFound(String),
    ModuleNotFound(String),
    AdapterNotFound(String),
    CorpusMissing(PathBuf),
    Config { path: PathBuf, detail: String },
    Core(String),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(name) => write!(
                f,
                "project not found: {name} (use `lingframe list-projects`)"
            ),
            Self::ModuleNotFound(name) => write!(
                f,
                "analysis module not found: {name} (use `lingframe list-modules`)"
            ),
            Self::AdapterNotFound(name) => write!(
                f,
                "visualization adapter not found: {name} (use `lingframe list-modules`)"
            ),
            Self::CorpusMissing(path) => write!(
                f,
                "atomized corpus not found: {} (run `lingframe atomize` first)",
                path.display()
            ),
            Self::Config { path, detail } => {
                write!(f, "invalid project config `{}`: {detail}", path.display())
            }
            Self::Core(detail) => write!(f, "{detail}"),
        }
    }
}

impl Error for CliError {}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    #[serde(default)]
    pub corpus: CorpusSection,
    #[serde(default)]
    pub atomization: AtomizationSection,
    #[serde(default)]
    pub domain: DomainSection,
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub visualization: VisualizationSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Deserialize)]
pub struct ProjectSection {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CorpusSection {
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentEntry {
    pub source: PathBuf,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AtomizationSection {
    /// Registered schema name; defaults to `default`.
    #[serde(default)]
    pub schema: Option<String>,
    /// Naming strategy override applied on top of the schema.
    #[serde(default)]
    pub strategy: Option<NamingStrategyKind>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DomainSection {
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisSection {
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ModuleEntry {
    pub module: String,
    #[serde(default)]
    pub config: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
pub struct VisualizationSection {
    #[serde(default)]
    pub adapters: Vec<AdapterEntry>,
}

#[derive(Debug, Deserialize)]
pub struct AdapterEntry {
    pub adapter: String,
    pub analysis: String,
    #[serde(default)]
    pub config: toml::Table,
}

#[derive(Debug, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_visualizations_dir")]
    pub visualizations_dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            visualizations_dir: default_visualizations_dir(),
        }
    }
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

fn default_visualizations_dir() -> PathBuf {
    PathBuf::from("visualizations")
}

/// Resolves a project reference against flat and category/name layouts.
pub fn find_project(projects_dir: &Path, reference: &str) -> Option<PathBuf> {
    if let Some((category, name)) = reference.split_once('/') {
        let candidate = projects_dir.join(category).join(name);
        if candidate.join(PROJECT_FILE).is_file() {
            return Some(candidate);
        }
    }

    let flat = projects_dir.join(reference);
    if flat.join(PROJECT_FILE).is_file() {
        return Some(flat);
    }

    let entries = fs::read_dir(projects_dir).ok()?;
    for entry in entries.flatten() {
        let category_dir = entry.path();
        if !category_dir.is_dir() {
            continue;
        }
        let candidate = category_dir.join(reference);
        if candidate.join(PROJECT_FILE).is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Loads and parses a project's configuration.
pub fn load_project(
    projects_dir: &Path,
    reference: &str,
) -> Result<(ProjectConfig, PathBuf), CliError> {
    let project_dir = find_project(projects_dir, reference)
        .ok_or_else(|| CliError::ProjectNotFound(reference.to_string()))?;
    let config_path = project_dir.join(PROJECT_FILE);
    let content = fs::read_to_string(&config_path).map_err(|err| CliError::Config {
        path: config_path.clone(),
        detail: err.to_string(),
    })?;
    let config: ProjectConfig = toml::from_str(&content).map_err(|err| CliError::Config {
        path: config_path,
        detail: err.to_string(),
    })?;
    Ok((config, project_dir))
}

/// Lists `(reference, title)` pairs for every project under the directory,
/// flat entries first, then `category/name` entries, each sorted.
pub fn list_projects(projects_dir: &Path) -> Vec<(String, Option<String>)> {
    let mut flat = Vec::new();
    let mut categorized = Vec::new();

    let Ok(entries) = fs::read_dir(projects_dir) else {
        return Vec::new();
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if path.join(PROJECT_FILE).is_file() {
            flat.push((name, project_title(&path)));
            continue;
        }
        let Ok(children) = fs::read_dir(&path) else {
            continue;
        };
        for child in children.flatten() {
            let child_path = child.path();
            if child_path.is_dir() && child_path.join(PROJECT_FILE).is_file() {
                let child_name = child.file_name().to_string_lossy().to_string();
                categorized.push((format!("{name}/{child_name}"), project_title(&child_path)));
            }
        }
    }

    flat.sort();
    categorized.sort();
    flat.extend(categorized);
    flat
}

fn project_title(project_dir: &Path) -> Option<String> {
    let content = fs::read_to_string(project_dir.join(PROJECT_FILE)).ok()?;
    let config: ProjectConfig = toml::from_str(&content).ok()?;
    config.project.title
}

/// Builds the pipeline configuration for one project.
pub fn to_pipeline_config(
    config: &ProjectConfig,
    project_dir: &Path,
    registry: &Registry,
) -> PipelineConfig {
    let schema = resolve_schema(config, registry);

    PipelineConfig {
        name: config.project.name.clone(),
        base_dir: project_dir.to_path_buf(),
        documents: config
            .corpus
            .documents
            .iter()
            .map(|entry| DocumentSpec {
                source: entry.source.clone(),
                id: entry.id.clone(),
                title: entry.title.clone().or_else(|| config.project.title.clone()),
                author: entry
                    .author
                    .clone()
                    .or_else(|| config.project.author.clone()),
            })
            .collect(),
        schema,
        domain: config.domain.profile.clone(),
        modules: config
            .analysis
            .modules
            .iter()
            .map(|entry| ModuleSpec {
                module: entry.module.clone(),
                config: to_module_config(&entry.config),
            })
            .collect(),
        adapters: config
            .visualization
            .adapters
            .iter()
            .map(|entry| AdapterSpec {
                adapter: entry.adapter.clone(),
                analysis: entry.analysis.clone(),
                config: to_module_config(&entry.config),
            })
            .collect(),
        output: OutputDirs {
            raw_dir: config.output.raw_dir.clone(),
            processed_dir: config.output.processed_dir.clone(),
            visualizations_dir: config.output.visualizations_dir.clone(),
        },
    }
}

/// Converts a TOML config table into the JSON-valued module config.
pub fn to_module_config(table: &toml::Table) -> ModuleConfig {
    table
        .iter()
        .filter_map(|(key, value)| {
            serde_json::to_value(value)
                .ok()
                .map(|converted| (key.clone(), converted))
        })
        .collect()
}

/// Path of a project's exported corpus file.
pub fn corpus_path(config: &ProjectConfig, project_dir: &Path) -> PathBuf {
    project_dir
        .join(&config.output.raw_dir)
        .join(format!("{}_atomized.json", config.project.name))
}

/// The schema a project's atomization settings select.
pub fn resolve_schema(config: &ProjectConfig, registry: &Registry) -> AtomizationSchema {
    let mut schema = config
        .atomization
        .schema
        .as_deref()
        .and_then(|name| registry.get_schema(name).cloned())
        .unwrap_or_default();
    if let Some(strategy) = config.atomization.strategy {
        schema.naming.strategy = strategy;
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::{find_project, list_projects, load_project, to_module_config};

    fn write_project(root: &std::path::Path, relative: &str, name: &str) {
        let dir = root.join(relative);
        std::fs::create_dir_all(&dir).expect("project dir");
        std::fs::write(
            dir.join(super::PROJECT_FILE),
            format!(
                "[project]\nname = \"{name}\"\ntitle = \"{name} title\"\n\n\
                 [[corpus.documents]]\nsource = \"input.md\"\n"
            ),
        )
        .expect("project file");
    }

    #[test]
    fn finds_flat_and_categorized_projects() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_project(dir.path(), "flat-proj", "flat-proj");
        write_project(dir.path(), "essays/deep-proj", "deep-proj");

        assert!(find_project(dir.path(), "flat-proj").is_some());
        assert!(find_project(dir.path(), "deep-proj").is_some());
        assert!(find_project(dir.path(), "essays/deep-proj").is_some());
        assert!(find_project(dir.path(), "missing").is_none());
    }

    #[test]
    fn list_projects_orders_flat_before_categorized() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_project(dir.path(), "zeta", "zeta");
        write_project(dir.path(), "essays/alpha", "alpha");

        let listed = list_projects(dir.path());
        let names: Vec<&str> = listed.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "essays/alpha"]);
    }

    #[test]
    fn load_project_reports_missing_reference() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_project(dir.path(), "ghost").expect_err("missing project");
        assert!(err.to_string().contains("project not found"));
    }

    #[test]
    fn module_config_converts_toml_values_to_json() {
        let table: toml::Table = toml::from_str("peak_count = 5\nlabel = \"x\"").expect("toml");
        let config = to_module_config(&table);
        assert_eq!(config["peak_count"], serde_json::json!(5));
        assert_eq!(config["label"], serde_json::json!("x"));
    }
}
