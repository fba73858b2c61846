//! Core framework for schema-driven text atomization and analysis.
//!
//! Decomposes raw text into an addressable atom tree (theme → paragraph →
//! sentence → word → letter), assigns unique IDs per a pluggable naming
//! strategy, and orchestrates registered analysis modules and visualization
//! adapters over the resulting corpus.

pub mod analysis;
pub mod atomizer;
pub mod logging;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod registry;
pub mod visualization;

pub use analysis::{AnalysisError, AnalysisModule, AnalysisResult, ModuleConfig};
pub use atomizer::{AtomizeError, AtomizeResult, Atomizer};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{
    AncestorRefs, AnalysisOutput, Atom, AtomLevel, AtomizationSchema, ConfigurationError, Corpus,
    Document, DomainLexicon, DomainProfile, EntityPattern, EntityPatternSet, PreamblePolicy,
};
pub use naming::{create_strategy, slugify, NamingConfig, NamingStrategy, NamingStrategyKind};
pub use pipeline::{
    AdapterSpec, DocumentSpec, ModuleSpec, OutputDirs, Pipeline, PipelineConfig, PipelineError,
    PipelineReport, PipelineState, RunOptions,
};
pub use registry::{register_builtins, Registry, RegistryError, RegistrySummary};
pub use visualization::{VisualizationAdapter, VisualizationError, VisualizationResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
