//! Temporal flow analysis: tense, markers, narrative shifts.
//!
//! Keyword-based detection; the indicator lists are the resolved backend and
//! are recorded in output metadata. Tense detection is a swappable strategy
//! behind the module contract.

use crate::analysis::{theme_titles, tokenize, AnalysisModule, AnalysisResult, ModuleConfig};
use crate::model::corpus::Corpus;
use crate::model::domain::DomainProfile;
use crate::model::level::AtomLevel;
use crate::model::output::AnalysisOutput;
use std::collections::BTreeMap;

const TEMPORAL_ADVERBS: &[&str] = &[
    "then", "now", "later", "before", "after", "once", "when", "while", "during", "until",
    "since", "ago", "soon", "already", "eventually", "finally", "previously", "currently",
];

const PAST_INDICATORS: &[&str] = &[
    "was", "were", "had", "did", "went", "saw", "told", "asked", "came", "stood",
];
const PRESENT_INDICATORS: &[&str] = &[
    "is", "are", "am", "do", "does", "see", "tell", "ask", "stands", "comes",
];
const FUTURE_INDICATORS: &[&str] = &["will", "shall", "would", "could", "might"];
const FUTURE_PHRASES: &[&str] = &["going to", "about to"];

const FLASHBACK_SIGNALS: &[&str] = &[
    "remember", "remembered", "recalled", "looking back", "used to", "in the past",
    "back then", "years ago",
];
const FLASHFORWARD_SIGNALS: &[&str] = &[
    "years later", "in the future", "someday", "one day", "will be",
];

/// Per-sentence tense and narrative-flow analysis.
pub struct TemporalAnalysis;

impl TemporalAnalysis {
    pub fn new() -> Self {
        Self
    }

    /// Primary tense by indicator counting.
    ///
    /// Ties resolve in past → present → future order; no indicator at all
    /// is `ambiguous`.
    fn detect_tense(tokens: &[String], lowered: &str) -> &'static str {
        let past = count_tokens(tokens, PAST_INDICATORS);
        let present = count_tokens(tokens, PRESENT_INDICATORS);
        let future = count_tokens(tokens, FUTURE_INDICATORS)
            + FUTURE_PHRASES
                .iter()
                .map(|phrase| lowered.matches(phrase).count())
                .sum::<usize>();

        let best = past.max(present).max(future);
        if best == 0 {
            "ambiguous"
        } else if past == best {
            "past"
        } else if present == best {
            "present"
        } else {
            "future"
        }
    }

    fn markers(tokens: &[String]) -> Vec<&'static str> {
        TEMPORAL_ADVERBS
            .iter()
            .filter(|adverb| tokens.iter().any(|token| token == *adverb))
            .copied()
            .collect()
    }
}

impl Default for TemporalAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

fn count_tokens(tokens: &[String], indicators: &[&str]) -> usize {
    tokens
        .iter()
        .filter(|token| indicators.contains(&token.as_str()))
        .count()
}

fn contains_signal(lowered: &str, signals: &[&str]) -> bool {
    signals.iter().any(|signal| lowered.contains(signal))
}

impl AnalysisModule for TemporalAnalysis {
    fn name(&self) -> &'static str {
        "temporal"
    }

    fn description(&self) -> &'static str {
        "Keyword tense detection, temporal markers, and narrative shifts"
    }

    fn analyze(
        &self,
        corpus: &Corpus,
        _domain: Option<&DomainProfile>,
        _config: &ModuleConfig,
    ) -> AnalysisResult {
        let titles = theme_titles(corpus);

        let mut sentences = Vec::new();
        let mut tense_distribution: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut theme_tenses: BTreeMap<String, BTreeMap<&'static str, usize>> = BTreeMap::new();
        let mut marker_frequencies: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut narrative_shifts = Vec::new();

        for sentence in corpus.iter_atoms(AtomLevel::Sentence) {
            let tokens = tokenize(&sentence.text);
            let lowered = sentence.text.to_lowercase();

            let tense = Self::detect_tense(&tokens, &lowered);
            let markers = Self::markers(&tokens);
            let is_flashback = contains_signal(&lowered, FLASHBACK_SIGNALS);
            let is_flashforward = contains_signal(&lowered, FLASHFORWARD_SIGNALS);

            let theme_id = sentence
                .ancestors
                .get(AtomLevel::Theme)
                .unwrap_or("")
                .to_string();

            *tense_distribution.entry(tense).or_insert(0) += 1;
            *theme_tenses
                .entry(theme_id.clone())
                .or_default()
                .entry(tense)
                .or_insert(0) += 1;
            for marker in &markers {
                *marker_frequencies.entry(marker).or_insert(0) += 1;
            }
            if is_flashback || is_flashforward {
                narrative_shifts.push(serde_json::json!({
                    "sentence_id": sentence.id,
                    "kind": if is_flashback { "flashback" } else { "flashforward" },
                }));
            }

            sentences.push(serde_json::json!({
                "sentence_id": sentence.id,
                "theme_id": theme_id,
                "tense": tense,
                "markers": markers,
                "is_flashback": is_flashback,
                "is_flashforward": is_flashforward,
                "is_linear": !(is_flashback || is_flashforward),
            }));
        }

        let mut theme_distribution = serde_json::Map::new();
        for (theme_id, tenses) in &theme_tenses {
            theme_distribution.insert(
                theme_id.clone(),
                serde_json::json!({
                    "title": titles.get(theme_id).cloned().unwrap_or(theme_id.clone()),
                    "tense_counts": tenses,
                }),
            );
        }

        let data = serde_json::json!({
            "sentence_tenses": sentences,
            "tense_distribution": tense_distribution,
            "theme_tense_distribution": theme_distribution,
            "marker_frequencies": marker_frequencies,
            "narrative_shifts": narrative_shifts,
        });

        Ok(AnalysisOutput::new(self.name(), data).with_metadata("backend", "keyword"))
    }
}
