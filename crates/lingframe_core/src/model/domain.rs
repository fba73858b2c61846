//! Domain profile overlay: lexicons and entity patterns.
//!
//! # Responsibility
//! - Bundle optional per-domain lexicons and entity pattern sets under a
//!   profile name.
//! - Merge lexicons deterministically (registration order, later wins).
//!
//! A profile with no lexicons or patterns is valid; analysis modules fall
//! back to their built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Term → signed score overrides for a subject domain.
///
/// Terms may be multi-word phrases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainLexicon {
    pub name: String,
    #[serde(default)]
    pub terms: BTreeMap<String, f64>,
}

impl DomainLexicon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terms: BTreeMap::new(),
        }
    }
}

/// One labelled entity-recognition pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPattern {
    pub label: String,
    pub pattern: String,
}

/// Named, ordered set of entity patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPatternSet {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<EntityPattern>,
}

/// Optional per-domain overlay merged into analysis modules at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lexicons: Vec<DomainLexicon>,
    #[serde(default)]
    pub pattern_sets: Vec<EntityPatternSet>,
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
}

impl DomainProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            lexicons: Vec::new(),
            pattern_sets: Vec::new(),
            config: BTreeMap::new(),
        }
    }

    /// Union of all bundled lexicons; a later lexicon overrides earlier
    /// entries for the same term. An empty profile yields an empty merge.
    pub fn merged_lexicon(&self) -> DomainLexicon {
        let mut merged = DomainLexicon::new(format!("{}-merged", self.name));
        for lexicon in &self.lexicons {
            for (term, score) in &lexicon.terms {
                merged.terms.insert(term.clone(), *score);
            }
        }
        merged
    }

    /// First bundled pattern set, when any exists.
    pub fn primary_patterns(&self) -> Option<&EntityPatternSet> {
        self.pattern_sets.first()
    }
}
