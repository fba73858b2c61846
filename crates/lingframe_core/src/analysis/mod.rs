//! Analysis module contract and built-in modules.
//!
//! # Responsibility
//! - Define the single contract every analysis plugin implements.
//! - Host the built-in deterministic modules.
//!
//! # Invariants
//! - `analyze` is idempotent: identical (corpus, domain, config) inputs
//!   produce bit-identical output data. Stochastic techniques are not
//!   allowed unless seeded deterministically.
//! - A missing optional capability degrades to a metadata flag in the
//!   output; it never raises.

pub mod entity;
pub mod evaluation;
pub mod semantic;
pub mod sentiment;
pub mod temporal;

pub use entity::EntityAnalysis;
pub use evaluation::EvaluationAnalysis;
pub use semantic::SemanticAnalysis;
pub use sentiment::SentimentAnalysis;
pub use temporal::TemporalAnalysis;

use crate::model::corpus::Corpus;
use crate::model::domain::DomainProfile;
use crate::model::level::AtomLevel;
use crate::model::output::AnalysisOutput;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Module-specific configuration mapping; unrecognized keys are ignored and
/// recognized keys have defaults when omitted.
pub type ModuleConfig = BTreeMap<String, serde_json::Value>;

pub type AnalysisResult = Result<AnalysisOutput, AnalysisError>;

/// Failure inside a module's `analyze`. Caught at the pipeline boundary;
/// the failing module's output is omitted and the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    InvalidConfig { module: String, detail: String },
    Failed { module: String, detail: String },
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig { module, detail } => {
                write!(f, "invalid configuration for module `{module}`: {detail}")
            }
            Self::Failed { module, detail } => {
                write!(f, "analysis module `{module}` failed: {detail}")
            }
        }
    }
}

impl Error for AnalysisError {}

/// Contract every analysis plugin implements.
///
/// `domain` may be `None`; modules then fall back to built-in defaults
/// rather than failing.
pub trait AnalysisModule {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn analyze(
        &self,
        corpus: &Corpus,
        domain: Option<&DomainProfile>,
        config: &ModuleConfig,
    ) -> AnalysisResult;
}

/// Reads a non-negative integer config option with a default.
pub(crate) fn config_usize(config: &ModuleConfig, key: &str, default: usize) -> usize {
    config
        .get(key)
        .and_then(|value| value.as_u64())
        .map(|value| value as usize)
        .unwrap_or(default)
}

/// Theme ID → title map; untitled themes fall back to their ID.
pub(crate) fn theme_titles(corpus: &Corpus) -> BTreeMap<String, String> {
    corpus
        .iter_atoms(AtomLevel::Theme)
        .map(|theme| {
            let title = theme.title().unwrap_or(theme.id.as_str()).to_string();
            (theme.id.clone(), title)
        })
        .collect()
}

/// Lowercased alphanumeric tokens of a text span.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|ch| ch.is_alphanumeric() || *ch == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Mean of a sample, 0.0 when empty.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1), 0.0 below two samples.
pub(crate) fn stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let center = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - center) * (value - center))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::{config_usize, mean, stdev, tokenize, ModuleConfig};

    #[test]
    fn config_usize_falls_back_to_default() {
        let mut config = ModuleConfig::new();
        assert_eq!(config_usize(&config, "peak_count", 10), 10);

        config.insert("peak_count".to_string(), serde_json::json!(3));
        assert_eq!(config_usize(&config, "peak_count", 10), 3);

        config.insert("peak_count".to_string(), serde_json::json!("three"));
        assert_eq!(config_usize(&config, "peak_count", 10), 10);
    }

    #[test]
    fn tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(tokenize("Hello, World! don't"), vec!["hello", "world", "don't"]);
        assert!(tokenize("?! --").is_empty());
    }

    #[test]
    fn sample_statistics_match_known_values() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((stdev(&values) - 2.138089935299395).abs() < 1e-9);
        assert_eq!(stdev(&[1.0]), 0.0);
    }
}
