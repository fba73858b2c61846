//! Pattern-based named-entity extraction.
//!
//! Patterns come from the domain profile's primary pattern set when one is
//! bundled, otherwise from the built-in defaults. An unparseable domain
//! pattern is skipped and noted in output metadata rather than failing the
//! module.

use crate::analysis::{AnalysisModule, AnalysisResult, ModuleConfig};
use crate::model::corpus::Corpus;
use crate::model::domain::DomainProfile;
use crate::model::level::AtomLevel;
use crate::model::output::AnalysisOutput;
use regex::Regex;
use std::collections::BTreeMap;

/// Default label → pattern table used without a domain profile.
const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("PERSON", r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+\b"),
    (
        "TEMPORAL",
        r"(?i)\b(?:morning|evening|night|day|hour|minute|dawn|dusk|midnight|noon)\b",
    ),
    ("NUMBER", r"\b\d+(?:[.,]\d+)?\b"),
    ("QUOTED", r#""[^"\n]+""#),
];

/// Regex entity extraction over sentences.
pub struct EntityAnalysis;

impl EntityAnalysis {
    pub fn new() -> Self {
        Self
    }

    /// Compiles the effective pattern table, collecting labels whose
    /// patterns fail to compile.
    fn load_patterns(
        &self,
        domain: Option<&DomainProfile>,
    ) -> (Vec<(String, Regex)>, Vec<String>) {
        let raw: Vec<(String, String)> = match domain.and_then(|profile| profile.primary_patterns())
        {
            Some(set) => set
                .patterns
                .iter()
                .map(|pattern| (pattern.label.clone(), pattern.pattern.clone()))
                .collect(),
            None => DEFAULT_PATTERNS
                .iter()
                .map(|(label, pattern)| (label.to_string(), pattern.to_string()))
                .collect(),
        };

        let mut compiled = Vec::new();
        let mut skipped = Vec::new();
        for (label, pattern) in raw {
            match Regex::new(&pattern) {
                Ok(regex) => compiled.push((label, regex)),
                Err(_) => skipped.push(label),
            }
        }
        (compiled, skipped)
    }
}

impl Default for EntityAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisModule for EntityAnalysis {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn description(&self) -> &'static str {
        "Pattern-based named-entity extraction with domain pattern sets"
    }

    fn analyze(
        &self,
        corpus: &Corpus,
        domain: Option<&DomainProfile>,
        _config: &ModuleConfig,
    ) -> AnalysisResult {
        let (patterns, skipped) = self.load_patterns(domain);

        // label → entity text → occurrence count
        let mut entities_by_type: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut theme_distribution: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        let mut annotated_sentences = 0usize;

        for sentence in corpus.iter_atoms(AtomLevel::Sentence) {
            let theme_id = sentence
                .ancestors
                .get(AtomLevel::Theme)
                .unwrap_or("")
                .to_string();
            let mut matched_any = false;

            for (label, regex) in &patterns {
                for found in regex.find_iter(&sentence.text) {
                    matched_any = true;
                    *entities_by_type
                        .entry(label.clone())
                        .or_default()
                        .entry(found.as_str().to_string())
                        .or_insert(0) += 1;
                    *theme_distribution
                        .entry(theme_id.clone())
                        .or_default()
                        .entry(label.clone())
                        .or_insert(0) += 1;
                }
            }
            if matched_any {
                annotated_sentences += 1;
            }
        }

        let entity_totals: BTreeMap<&String, usize> = entities_by_type
            .iter()
            .map(|(label, entities)| (label, entities.values().sum()))
            .collect();

        // Most frequent entity per label, then overall by count desc,
        // entity text asc for determinism.
        let mut top_entities: Vec<serde_json::Value> = Vec::new();
        for (label, entities) in &entities_by_type {
            let mut ranked: Vec<(&String, &usize)> = entities.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (text, count) in ranked.into_iter().take(5) {
                top_entities.push(serde_json::json!({
                    "label": label,
                    "text": text,
                    "count": count,
                }));
            }
        }

        let data = serde_json::json!({
            "entities_by_type": entities_by_type,
            "entity_totals": entity_totals,
            "top_entities": top_entities,
            "theme_distribution": theme_distribution,
            "annotated_sentences": annotated_sentences,
        });

        let pattern_source = if domain.and_then(|profile| profile.primary_patterns()).is_some() {
            "domain"
        } else {
            "builtin"
        };

        Ok(AnalysisOutput::new(self.name(), data)
            .with_metadata("backend", "pattern")
            .with_metadata("pattern_source", pattern_source)
            .with_metadata("skipped_patterns", serde_json::json!(skipped)))
    }
}
