//! Name-keyed component catalog.
//!
//! # Responsibility
//! - Map string keys to analysis-module factories, visualization-adapter
//!   factories, domain profiles, and schemas (four independent namespaces).
//! - Discover domain profiles from JSON definition files.
//!
//! # Invariants
//! - An explicit registry value is passed by reference to anything needing
//!   lookups; there is no hidden process-global.
//! - Registration happens at startup, strictly before pipeline execution;
//!   afterwards the registry is read-only. Startup-time precondition, not a
//!   runtime-guarded invariant.
//! - Re-registering a taken name silently overwrites, uniformly across all
//!   four namespaces.
//! - `create_*` returns a fresh instance per call, never a shared singleton.

use crate::analysis::{
    AnalysisModule, EntityAnalysis, EvaluationAnalysis, SemanticAnalysis, SentimentAnalysis,
    TemporalAnalysis,
};
use crate::model::domain::DomainProfile;
use crate::model::schema::AtomizationSchema;
use crate::visualization::{JsonReportAdapter, SummaryTableAdapter, VisualizationAdapter};
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

pub type AnalysisFactory = Box<dyn Fn() -> Box<dyn AnalysisModule>>;
pub type AdapterFactory = Box<dyn Fn() -> Box<dyn VisualizationAdapter>>;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry lookup/discovery errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    NotFound {
        namespace: &'static str,
        name: String,
    },
    Discovery {
        path: String,
        detail: String,
    },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { namespace, name } => {
                write!(f, "no {namespace} registered under `{name}`")
            }
            Self::Discovery { path, detail } => {
                write!(f, "domain discovery failed at `{path}`: {detail}")
            }
        }
    }
}

impl Error for RegistryError {}

/// Catalog of registered names per namespace, for introspection and CLI
/// listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrySummary {
    pub analysis_modules: Vec<String>,
    pub visualization_adapters: Vec<String>,
    pub domain_profiles: Vec<String>,
    pub schemas: Vec<String>,
}

/// Process-wide component catalog, constructed once at startup and passed
/// by reference.
#[derive(Default)]
pub struct Registry {
    analyses: BTreeMap<String, AnalysisFactory>,
    adapters: BTreeMap<String, AdapterFactory>,
    domains: BTreeMap<String, DomainProfile>,
    schemas: BTreeMap<String, AtomizationSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an analysis-module factory under `name`, overwriting any
    /// previous registration.
    pub fn register_analysis<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn AnalysisModule> + 'static,
    {
        self.analyses.insert(name.to_string(), Box::new(factory));
    }

    /// Instantiates a fresh module, never a shared singleton.
    pub fn create_analysis(&self, name: &str) -> RegistryResult<Box<dyn AnalysisModule>> {
        self.analyses
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound {
                namespace: "analysis module",
                name: name.to_string(),
            })
    }

    /// Stores a visualization-adapter factory under `name`, overwriting any
    /// previous registration.
    pub fn register_adapter<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn VisualizationAdapter> + 'static,
    {
        self.adapters.insert(name.to_string(), Box::new(factory));
    }

    pub fn create_adapter(&self, name: &str) -> RegistryResult<Box<dyn VisualizationAdapter>> {
        self.adapters
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound {
                namespace: "visualization adapter",
                name: name.to_string(),
            })
    }

    pub fn register_domain(&mut self, profile: DomainProfile) {
        self.domains.insert(profile.name.clone(), profile);
    }

    pub fn get_domain(&self, name: &str) -> Option<&DomainProfile> {
        self.domains.get(name)
    }

    pub fn register_schema(&mut self, schema: AtomizationSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    pub fn get_schema(&self, name: &str) -> Option<&AtomizationSchema> {
        self.schemas.get(name)
    }

    /// Scans `directory` for `*.json` domain-profile definitions and
    /// registers each parseable one. Returns how many were registered.
    ///
    /// A missing directory registers nothing; an unparseable file is
    /// skipped with a warning so one bad definition cannot block startup.
    pub fn discover_domains(&mut self, directory: &Path) -> RegistryResult<usize> {
        if !directory.exists() {
            return Ok(0);
        }
        let entries = fs::read_dir(directory).map_err(|err| RegistryError::Discovery {
            path: directory.display().to_string(),
            detail: err.to_string(),
        })?;

        let mut registered = 0;
        for entry in entries {
            let entry = entry.map_err(|err| RegistryError::Discovery {
                path: directory.display().to_string(),
                detail: err.to_string(),
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(
                        "event=discover_domain module=registry status=skipped path={} detail={err}",
                        path.display()
                    );
                    continue;
                }
            };
            match serde_json::from_str::<DomainProfile>(&content) {
                Ok(profile) => {
                    info!(
                        "event=discover_domain module=registry status=ok name={} path={}",
                        profile.name,
                        path.display()
                    );
                    self.register_domain(profile);
                    registered += 1;
                }
                Err(err) => {
                    warn!(
                        "event=discover_domain module=registry status=skipped path={} detail={err}",
                        path.display()
                    );
                }
            }
        }
        Ok(registered)
    }

    /// Full catalog of registered names per namespace, sorted.
    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            analysis_modules: self.analyses.keys().cloned().collect(),
            visualization_adapters: self.adapters.keys().cloned().collect(),
            domain_profiles: self.domains.keys().cloned().collect(),
            schemas: self.schemas.keys().cloned().collect(),
        }
    }
}

/// Registers every built-in module, adapter, and schema.
///
/// Called once from startup code; plugins register afterwards through the
/// same explicit calls.
pub fn register_builtins(registry: &mut Registry) {
    registry.register_analysis("semantic", || Box::new(SemanticAnalysis::new()));
    registry.register_analysis("temporal", || Box::new(TemporalAnalysis::new()));
    registry.register_analysis("sentiment", || Box::new(SentimentAnalysis::new()));
    registry.register_analysis("entity", || Box::new(EntityAnalysis::new()));
    registry.register_analysis("evaluation", || Box::new(EvaluationAnalysis::new()));

    registry.register_adapter("json-report", || Box::new(JsonReportAdapter));
    registry.register_adapter("summary-table", || Box::new(SummaryTableAdapter));

    registry.register_schema(AtomizationSchema::default());
}

#[cfg(test)]
mod tests {
    use super::{register_builtins, Registry, RegistryError};
    use crate::analysis::{AnalysisModule, AnalysisResult, ModuleConfig, SentimentAnalysis};
    use crate::model::corpus::Corpus;
    use crate::model::domain::DomainProfile;

    struct StubModule {
        label: &'static str,
    }

    impl AnalysisModule for StubModule {
        fn name(&self) -> &'static str {
            self.label
        }

        fn description(&self) -> &'static str {
            "stub"
        }

        fn analyze(
            &self,
            _corpus: &Corpus,
            _domain: Option<&DomainProfile>,
            _config: &ModuleConfig,
        ) -> AnalysisResult {
            Ok(crate::model::output::AnalysisOutput::new(
                self.label,
                serde_json::json!({}),
            ))
        }
    }

    #[test]
    fn create_analysis_returns_distinct_instances() {
        let mut registry = Registry::new();
        registry.register_analysis("foo", || Box::new(StubModule { label: "foo" }));

        let first = registry.create_analysis("foo").expect("registered");
        let second = registry.create_analysis("foo").expect("registered");
        // Boxed instances live at distinct addresses.
        let first_addr = std::ptr::addr_of!(*first) as *const () as usize;
        let second_addr = std::ptr::addr_of!(*second) as *const () as usize;
        assert_ne!(first_addr, second_addr);
    }

    #[test]
    fn unregistered_name_is_not_found() {
        let registry = Registry::new();
        let err = registry
            .create_analysis("missing")
            .err()
            .expect("lookup must fail");
        assert_eq!(
            err,
            RegistryError::NotFound {
                namespace: "analysis module",
                name: "missing".to_string(),
            }
        );
    }

    #[test]
    fn re_registration_overwrites_silently() {
        let mut registry = Registry::new();
        registry.register_analysis("module", || Box::new(StubModule { label: "first" }));
        registry.register_analysis("module", || Box::new(StubModule { label: "second" }));

        let module = registry.create_analysis("module").expect("registered");
        assert_eq!(module.name(), "second");
    }

    #[test]
    fn builtins_cover_all_namespaces() {
        let mut registry = Registry::new();
        register_builtins(&mut registry);

        let summary = registry.summary();
        assert_eq!(
            summary.analysis_modules,
            vec!["entity", "evaluation", "semantic", "sentiment", "temporal"]
        );
        assert_eq!(
            summary.visualization_adapters,
            vec!["json-report", "summary-table"]
        );
        assert_eq!(summary.schemas, vec!["default"]);

        let module = registry.create_analysis("sentiment").expect("built-in");
        assert_eq!(module.name(), SentimentAnalysis::new().name());
    }

    #[test]
    fn discover_domains_registers_json_profiles_and_skips_bad_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join("naval.json"),
            serde_json::json!({
                "name": "naval",
                "lexicons": [{"name": "base", "terms": {"storm": -0.5}}],
            })
            .to_string(),
        )
        .expect("write profile");
        std::fs::write(dir.path().join("broken.json"), "{not json").expect("write broken");
        std::fs::write(dir.path().join("notes.txt"), "ignored").expect("write other");

        let mut registry = Registry::new();
        let registered = registry
            .discover_domains(dir.path())
            .expect("discovery succeeds");

        assert_eq!(registered, 1);
        let profile = registry.get_domain("naval").expect("registered profile");
        assert_eq!(profile.merged_lexicon().terms.get("storm"), Some(&-0.5));
        assert!(registry.get_domain("broken").is_none());
    }

    #[test]
    fn discover_domains_tolerates_missing_directory() {
        let mut registry = Registry::new();
        let registered = registry
            .discover_domains(std::path::Path::new("/nonexistent/domains"))
            .expect("missing directory is not an error");
        assert_eq!(registered, 0);
    }
}
