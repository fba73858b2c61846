//! Pipeline orchestration over one run.
//!
//! # Responsibility
//! - Drive configured documents through atomization, the configured analysis
//!   modules in listed order, and optionally visualization adapters.
//! - Isolate per-module failures: one bad plugin never aborts the run.
//!
//! # Invariants
//! - State machine: Configured → Atomizing → Analyzing → (Visualizing) →
//!   Complete, with Error absorbing from any stage.
//! - A failure during atomization is fatal (no well-formed corpus); a
//!   failure inside one module or adapter is recorded and skipped.
//! - Modules run sequentially; the corpus is read-only once constructed.

use crate::analysis::ModuleConfig;
use crate::atomizer::{AtomizeError, Atomizer};
use crate::model::corpus::Corpus;
use crate::model::output::AnalysisOutput;
use crate::model::schema::{AtomizationSchema, ConfigurationError};
use crate::registry::Registry;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Run stages, in order; `Error` absorbs from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Configured,
    Atomizing,
    Analyzing,
    Visualizing,
    Complete,
    Error,
}

/// One source document to atomize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub source: PathBuf,
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// One analysis module invocation: registered name plus its configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub module: String,
    #[serde(default)]
    pub config: ModuleConfig,
}

/// One visualization step: adapter name applied to one module's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterSpec {
    pub adapter: String,
    pub analysis: String,
    #[serde(default)]
    pub config: ModuleConfig,
}

/// Output directory layout under the pipeline's base directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDirs {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub visualizations_dir: PathBuf,
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            visualizations_dir: PathBuf::from("visualizations"),
        }
    }
}

/// Full configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub name: String,
    pub base_dir: PathBuf,
    pub documents: Vec<DocumentSpec>,
    pub schema: AtomizationSchema,
    pub domain: Option<String>,
    pub modules: Vec<ModuleSpec>,
    pub adapters: Vec<AdapterSpec>,
    pub output: OutputDirs,
}

/// Per-run execution options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Write the atomized corpus and per-module outputs to the output dirs.
    pub export: bool,
    /// Run the configured visualization adapters.
    pub visualize: bool,
}

/// Fatal pipeline failures; per-module failures land in the report instead.
#[derive(Debug)]
pub enum PipelineError {
    Configuration(ConfigurationError),
    Atomization(AtomizeError),
    Export(AtomizeError),
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "pipeline configuration invalid: {err}"),
            Self::Atomization(err) => write!(f, "atomization failed: {err}"),
            Self::Export(err) => write!(f, "corpus export failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            Self::Atomization(err) | Self::Export(err) => Some(err),
        }
    }
}

impl From<ConfigurationError> for PipelineError {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}

/// Result of one run: per-module outputs keyed by module name, the failure
/// ledger, collected artifacts, and timing.
#[derive(Debug)]
pub struct PipelineReport {
    pub state: PipelineState,
    pub corpus_name: String,
    pub analyses: BTreeMap<String, AnalysisOutput>,
    /// Component name → failure message for every isolated failure.
    pub failures: BTreeMap<String, String>,
    /// Module name → artifact paths produced by its adapters.
    pub visualizations: BTreeMap<String, Vec<PathBuf>>,
    pub duration: Duration,
    pub module_durations: BTreeMap<String, Duration>,
}

/// Executes one configured run against a populated registry.
pub struct Pipeline<'r> {
    config: PipelineConfig,
    registry: &'r Registry,
    state: PipelineState,
}

impl<'r> Pipeline<'r> {
    pub fn new(config: PipelineConfig, registry: &'r Registry) -> Self {
        Self {
            config,
            registry,
            state: PipelineState::Configured,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Atomizes the configured documents, then analyzes and optionally
    /// visualizes.
    ///
    /// # Errors
    /// - Any schema or atomization failure is fatal and leaves the pipeline
    ///   in the `Error` state.
    pub fn run(&mut self, options: &RunOptions) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();
        self.state = PipelineState::Atomizing;

        let mut atomizer = Atomizer::new(self.config.schema.clone()).map_err(|err| {
            self.state = PipelineState::Error;
            PipelineError::from(err)
        })?;

        let specs = self.config.documents.clone();
        let mut documents = Vec::new();
        for spec in specs {
            let path = self.config.base_dir.join(&spec.source);
            match atomizer.atomize_document(&path, spec.id, spec.title, spec.author) {
                Ok(document) => documents.push(document),
                Err(err) => {
                    self.state = PipelineState::Error;
                    return Err(PipelineError::Atomization(err));
                }
            }
        }

        let corpus = Corpus::new(
            self.config.name.clone(),
            documents,
            self.config.schema.clone(),
        );

        if options.export {
            let path = self
                .config
                .base_dir
                .join(&self.config.output.raw_dir)
                .join(format!("{}_atomized.json", self.config.name));
            Atomizer::export_json(&corpus, &path).map_err(|err| {
                self.state = PipelineState::Error;
                PipelineError::Export(err)
            })?;
        }

        Ok(self.analyze_corpus(&corpus, options, started))
    }

    /// Analysis and visualization stages over an already-built corpus.
    ///
    /// Per-module isolation lives here: a module that cannot be created or
    /// that fails inside `analyze` is recorded in the failure ledger and
    /// the run continues, finishing in `Complete`.
    pub fn analyze_corpus(
        &mut self,
        corpus: &Corpus,
        options: &RunOptions,
        started: Instant,
    ) -> PipelineReport {
        self.state = PipelineState::Analyzing;
        let registry = self.registry;

        let domain = self.config.domain.as_deref().and_then(|name| {
            let found = registry.get_domain(name);
            if found.is_none() {
                warn!(
                    "event=resolve_domain module=pipeline status=missing name={name}"
                );
            }
            found
        });

        let mut analyses: BTreeMap<String, AnalysisOutput> = BTreeMap::new();
        let mut failures: BTreeMap<String, String> = BTreeMap::new();
        let mut module_durations: BTreeMap<String, Duration> = BTreeMap::new();

        for spec in &self.config.modules {
            let module_started = Instant::now();
            let module = match registry.create_analysis(&spec.module) {
                Ok(module) => module,
                Err(err) => {
                    warn!(
                        "event=create_module module=pipeline status=error name={} detail={err}",
                        spec.module
                    );
                    failures.insert(spec.module.clone(), err.to_string());
                    continue;
                }
            };
            match module.analyze(corpus, domain, &spec.config) {
                Ok(output) => {
                    info!(
                        "event=run_module module=pipeline status=ok name={}",
                        spec.module
                    );
                    if options.export {
                        if let Err(err) = self.export_output(&output) {
                            warn!(
                                "event=export_output module=pipeline status=error name={} detail={err}",
                                spec.module
                            );
                            failures.insert(spec.module.clone(), err);
                        }
                    }
                    module_durations.insert(spec.module.clone(), module_started.elapsed());
                    analyses.insert(spec.module.clone(), output);
                }
                Err(err) => {
                    warn!(
                        "event=run_module module=pipeline status=error name={} detail={err}",
                        spec.module
                    );
                    failures.insert(spec.module.clone(), err.to_string());
                }
            }
        }

        let mut visualizations: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
        if options.visualize && !self.config.adapters.is_empty() {
            self.state = PipelineState::Visualizing;
            let output_dir = self
                .config
                .base_dir
                .join(&self.config.output.visualizations_dir);

            for spec in &self.config.adapters {
                let Some(analysis) = analyses.get(&spec.analysis) else {
                    warn!(
                        "event=run_adapter module=pipeline status=skipped adapter={} analysis={}",
                        spec.adapter, spec.analysis
                    );
                    continue;
                };
                let adapter = match registry.create_adapter(&spec.adapter) {
                    Ok(adapter) => adapter,
                    Err(err) => {
                        failures.insert(spec.adapter.clone(), err.to_string());
                        continue;
                    }
                };
                match adapter.generate(analysis, &output_dir, &spec.config) {
                    Ok(artifact) => {
                        visualizations
                            .entry(spec.analysis.clone())
                            .or_default()
                            .push(artifact);
                    }
                    Err(err) => {
                        failures.insert(spec.adapter.clone(), err.to_string());
                    }
                }
            }
        }

        self.state = PipelineState::Complete;
        let duration = started.elapsed();
        info!(
            "event=pipeline_complete module=pipeline status=ok corpus={} modules_ok={} modules_failed={} duration_ms={}",
            corpus.name,
            analyses.len(),
            failures.len(),
            duration.as_millis()
        );

        PipelineReport {
            state: self.state,
            corpus_name: corpus.name.clone(),
            analyses,
            failures,
            visualizations,
            duration,
            module_durations,
        }
    }

    fn export_output(&self, output: &AnalysisOutput) -> Result<(), String> {
        let dir = self.config.base_dir.join(&self.config.output.processed_dir);
        std::fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let path = dir.join(format!("{}_data.json", output.module_name));
        let json = output.to_json_string().map_err(|err| err.to_string())?;
        std::fs::write(&path, json).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DocumentSpec, ModuleSpec, OutputDirs, Pipeline, PipelineConfig, PipelineError,
        PipelineState, RunOptions,
    };
    use crate::analysis::{AnalysisError, AnalysisModule, AnalysisResult, ModuleConfig};
    use crate::model::corpus::Corpus;
    use crate::model::domain::DomainProfile;
    use crate::model::schema::AtomizationSchema;
    use crate::registry::{register_builtins, Registry};
    use std::time::Instant;

    struct FailingModule;

    impl AnalysisModule for FailingModule {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn description(&self) -> &'static str {
            "always fails"
        }

        fn analyze(
            &self,
            _corpus: &Corpus,
            _domain: Option<&DomainProfile>,
            _config: &ModuleConfig,
        ) -> AnalysisResult {
            Err(AnalysisError::Failed {
                module: "failing".to_string(),
                detail: "synthetic failure".to_string(),
            })
        }
    }

    fn config_with_modules(base_dir: std::path::PathBuf, modules: Vec<&str>) -> PipelineConfig {
        PipelineConfig {
            name: "test-run".to_string(),
            base_dir,
            documents: vec![DocumentSpec {
                source: "input.md".into(),
                id: None,
                title: Some("Test".to_string()),
                author: None,
            }],
            schema: AtomizationSchema::default(),
            domain: None,
            modules: modules
                .into_iter()
                .map(|name| ModuleSpec {
                    module: name.to_string(),
                    config: ModuleConfig::new(),
                })
                .collect(),
            adapters: Vec::new(),
            output: OutputDirs::default(),
        }
    }

    #[test]
    fn one_failing_module_does_not_abort_the_run() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("input.md"), "## T\n\nHope wins. Fear loses.")
            .expect("write input");

        let mut registry = Registry::new();
        register_builtins(&mut registry);
        registry.register_analysis("failing", || Box::new(FailingModule));

        let config = config_with_modules(
            dir.path().to_path_buf(),
            vec!["failing", "sentiment"],
        );
        let mut pipeline = Pipeline::new(config, &registry);
        let report = pipeline.run(&RunOptions::default()).expect("run completes");

        assert_eq!(report.state, PipelineState::Complete);
        assert!(report.analyses.contains_key("sentiment"));
        assert!(report.failures.contains_key("failing"));
        assert!(!report.analyses.contains_key("failing"));
    }

    #[test]
    fn unregistered_module_is_isolated_too() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("input.md"), "## T\n\nText here.")
            .expect("write input");

        let mut registry = Registry::new();
        register_builtins(&mut registry);

        let config = config_with_modules(dir.path().to_path_buf(), vec!["missing", "temporal"]);
        let mut pipeline = Pipeline::new(config, &registry);
        let report = pipeline.run(&RunOptions::default()).expect("run completes");

        assert_eq!(report.state, PipelineState::Complete);
        assert!(report.failures.contains_key("missing"));
        assert!(report.analyses.contains_key("temporal"));
    }

    #[test]
    fn missing_source_document_is_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut registry = Registry::new();
        register_builtins(&mut registry);

        let config = config_with_modules(dir.path().to_path_buf(), vec!["sentiment"]);
        let mut pipeline = Pipeline::new(config, &registry);
        let err = pipeline
            .run(&RunOptions::default())
            .expect_err("missing document aborts the run");

        assert!(matches!(err, PipelineError::Atomization(_)));
        assert_eq!(pipeline.state(), PipelineState::Error);
    }

    #[test]
    fn visualize_collects_adapter_artifacts() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(dir.path().join("input.md"), "## T\n\nSome text here.")
            .expect("write input");

        let mut registry = Registry::new();
        register_builtins(&mut registry);

        let mut config = config_with_modules(dir.path().to_path_buf(), vec!["semantic"]);
        config.adapters = vec![super::AdapterSpec {
            adapter: "json-report".to_string(),
            analysis: "semantic".to_string(),
            config: ModuleConfig::new(),
        }];

        let mut pipeline = Pipeline::new(config, &registry);
        let report = pipeline
            .run(&RunOptions {
                export: false,
                visualize: true,
            })
            .expect("run completes");

        let artifacts = report
            .visualizations
            .get("semantic")
            .expect("artifacts for semantic");
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].exists());
    }

    #[test]
    fn analyze_corpus_runs_without_documents_on_disk() {
        let mut registry = Registry::new();
        register_builtins(&mut registry);

        let corpus = Corpus::new("in-memory", Vec::new(), AtomizationSchema::default());
        let mut config = config_with_modules(std::path::PathBuf::from("."), vec!["evaluation"]);
        config.documents.clear();

        let mut pipeline = Pipeline::new(config, &registry);
        let report = pipeline.analyze_corpus(&corpus, &RunOptions::default(), Instant::now());

        assert_eq!(report.state, PipelineState::Complete);
        assert!(report.analyses.contains_key("evaluation"));
    }
}
