//! Lexicon-based sentiment analysis.
//!
//! # Responsibility
//! - Score every sentence against the built-in lexicon merged under domain
//!   overrides, classify, and aggregate per theme and corpus-wide.
//!
//! # Invariants
//! - Scoring is fully deterministic; identical inputs produce bit-identical
//!   output data.
//! - A domain profile's merged lexicon overrides built-in entries term by
//!   term; no domain means built-in defaults only.

use crate::analysis::{
    config_usize, mean, stdev, theme_titles, tokenize, AnalysisModule, AnalysisResult,
    ModuleConfig,
};
use crate::model::corpus::Corpus;
use crate::model::domain::DomainProfile;
use crate::model::level::AtomLevel;
use crate::model::output::AnalysisOutput;
use std::collections::BTreeMap;

/// Built-in term scores used when no domain lexicon overrides them.
///
/// Shared with the evaluation module's pathos step.
pub(crate) const DEFAULT_LEXICON: &[(&str, f64)] = &[
    ("admire", 0.7),
    ("afraid", -0.6),
    ("amazing", 0.8),
    ("anger", -0.7),
    ("beautiful", 0.7),
    ("betray", -0.8),
    ("brave", 0.6),
    ("broken", -0.5),
    ("calm", 0.4),
    ("cruel", -0.8),
    ("dark", -0.3),
    ("dead", -0.7),
    ("death", -0.7),
    ("despair", -0.9),
    ("dread", -0.7),
    ("fail", -0.6),
    ("fear", -0.6),
    ("gentle", 0.5),
    ("glad", 0.6),
    ("grief", -0.8),
    ("happy", 0.8),
    ("hate", -0.8),
    ("heartbreaking", -0.8),
    ("honor", 0.6),
    ("hope", 0.6),
    ("hunger", -0.5),
    ("hurt", -0.6),
    ("innocent", 0.4),
    ("joy", 0.8),
    ("kill", -0.8),
    ("kind", 0.6),
    ("laugh", 0.6),
    ("lonely", -0.6),
    ("lose", -0.5),
    ("love", 0.8),
    ("mourn", -0.7),
    ("pain", -0.7),
    ("peace", 0.6),
    ("proud", 0.6),
    ("sad", -0.6),
    ("safe", 0.5),
    ("suffer", -0.8),
    ("terrible", -0.8),
    ("trust", 0.6),
    ("united", 0.4),
    ("urgent", -0.3),
    ("warm", 0.4),
    ("wonderful", 0.8),
    ("worse", -0.5),
    ("wrong", -0.5),
];

const POSITIVE_THRESHOLD: f64 = 0.05;
const NEGATIVE_THRESHOLD: f64 = -0.05;

/// Scoring backend resolved once at construction.
///
/// The seam for richer statistical backends; availability is recorded in
/// output metadata, never raised as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScorerBackend {
    Lexicon,
}

impl ScorerBackend {
    fn label(self) -> &'static str {
        match self {
            Self::Lexicon => "lexicon",
        }
    }
}

/// Sentence-level sentiment with domain lexicon support.
pub struct SentimentAnalysis {
    backend: ScorerBackend,
}

impl SentimentAnalysis {
    pub fn new() -> Self {
        Self {
            backend: ScorerBackend::Lexicon,
        }
    }

    fn effective_lexicon(&self, domain: Option<&DomainProfile>) -> BTreeMap<String, f64> {
        let mut lexicon: BTreeMap<String, f64> = DEFAULT_LEXICON
            .iter()
            .map(|(term, score)| (term.to_string(), *score))
            .collect();
        if let Some(profile) = domain {
            for (term, score) in profile.merged_lexicon().terms {
                lexicon.insert(term.to_lowercase(), score);
            }
        }
        lexicon
    }

    /// Sums matched term scores and normalizes by token count, clamped to
    /// [-1, 1]. Multi-word lexicon terms match as phrases.
    fn score_sentence(&self, text: &str, lexicon: &BTreeMap<String, f64>) -> f64 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }
        let lowered = tokens.join(" ");

        let mut total = 0.0;
        for (term, score) in lexicon {
            if term.contains(' ') {
                total += lowered.matches(term.as_str()).count() as f64 * score;
            } else {
                total += tokens.iter().filter(|token| *token == term).count() as f64 * score;
            }
        }

        (total / tokens.len() as f64).clamp(-1.0, 1.0)
    }

    fn classify(score: f64) -> &'static str {
        if score >= POSITIVE_THRESHOLD {
            "positive"
        } else if score <= NEGATIVE_THRESHOLD {
            "negative"
        } else {
            "neutral"
        }
    }
}

impl Default for SentimentAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisModule for SentimentAnalysis {
    fn name(&self) -> &'static str {
        "sentiment"
    }

    fn description(&self) -> &'static str {
        "Lexicon-based sentence sentiment with domain overrides"
    }

    fn analyze(
        &self,
        corpus: &Corpus,
        domain: Option<&DomainProfile>,
        config: &ModuleConfig,
    ) -> AnalysisResult {
        let peak_count = config_usize(config, "peak_count", 10);
        let lexicon = self.effective_lexicon(domain);
        let titles = theme_titles(corpus);

        let mut sentences = Vec::new();
        for (number, sentence) in corpus.iter_atoms(AtomLevel::Sentence).enumerate() {
            let score = self.score_sentence(&sentence.text, &lexicon);
            let theme_id = sentence
                .ancestors
                .get(AtomLevel::Theme)
                .unwrap_or("")
                .to_string();
            sentences.push(serde_json::json!({
                "sentence_id": sentence.id,
                "sentence_number": number + 1,
                "theme_id": theme_id,
                "theme_title": titles.get(&theme_id).cloned().unwrap_or(theme_id.clone()),
                "text": sentence.text,
                "score": score,
                "classification": Self::classify(score),
            }));
        }

        // Peaks: stable sort by score keeps document order among ties.
        let mut by_score: Vec<&serde_json::Value> = sentences.iter().collect();
        by_score.sort_by(|a, b| {
            let left = a["score"].as_f64().unwrap_or(0.0);
            let right = b["score"].as_f64().unwrap_or(0.0);
            left.partial_cmp(&right).unwrap_or(std::cmp::Ordering::Equal)
        });
        let most_negative: Vec<serde_json::Value> =
            by_score.iter().take(peak_count).map(|v| (*v).clone()).collect();
        let most_positive: Vec<serde_json::Value> = by_score
            .iter()
            .rev()
            .take(peak_count)
            .map(|v| (*v).clone())
            .collect();

        // Theme-level statistics over sentence scores.
        let mut scores_by_theme: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut class_by_theme: BTreeMap<String, BTreeMap<&'static str, usize>> = BTreeMap::new();
        for sentence in &sentences {
            let theme_id = sentence["theme_id"].as_str().unwrap_or("").to_string();
            let score = sentence["score"].as_f64().unwrap_or(0.0);
            scores_by_theme.entry(theme_id.clone()).or_default().push(score);
            *class_by_theme
                .entry(theme_id)
                .or_default()
                .entry(Self::classify(score))
                .or_insert(0) += 1;
        }
        let mut theme_statistics = serde_json::Map::new();
        for (theme_id, scores) in &scores_by_theme {
            let classifications = class_by_theme.get(theme_id).cloned().unwrap_or_default();
            theme_statistics.insert(
                theme_id.clone(),
                serde_json::json!({
                    "title": titles.get(theme_id).cloned().unwrap_or(theme_id.clone()),
                    "sentence_count": scores.len(),
                    "mean_score": mean(scores),
                    "stdev_score": stdev(scores),
                    "min_score": scores.iter().copied().fold(f64::INFINITY, f64::min),
                    "max_score": scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    "classification_counts": classifications,
                }),
            );
        }

        let all_scores: Vec<f64> = sentences
            .iter()
            .map(|sentence| sentence["score"].as_f64().unwrap_or(0.0))
            .collect();
        let mut overall_classes: BTreeMap<&'static str, usize> = BTreeMap::new();
        for score in &all_scores {
            *overall_classes.entry(Self::classify(*score)).or_insert(0) += 1;
        }

        let domain_terms: BTreeMap<String, f64> = domain
            .map(|profile| profile.merged_lexicon().terms)
            .unwrap_or_default();

        let data = serde_json::json!({
            "sentence_sentiments": sentences,
            "emotional_peaks": {
                "most_negative": most_negative,
                "most_positive": most_positive,
            },
            "theme_statistics": theme_statistics,
            "overall_statistics": {
                "total_sentences": all_scores.len(),
                "mean_score": mean(&all_scores),
                "classification_counts": overall_classes,
            },
            "custom_lexicon": domain_terms,
        });

        Ok(AnalysisOutput::new(self.name(), data)
            .with_metadata("backend", self.backend.label())
            .with_metadata("lexicon_terms", self.effective_lexicon(domain).len()))
    }
}
