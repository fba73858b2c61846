//! Rhetorical evaluation: the heuristic coaching report.
//!
//! Scores four rhetorical steps 0–100 with integer arithmetic so repeated
//! runs are bit-identical, then derives an overall score and improvement
//! suggestions. All thresholds are internal heuristics behind the module
//! contract.

use crate::analysis::sentiment::DEFAULT_LEXICON;
use crate::analysis::{theme_titles, tokenize, AnalysisModule, AnalysisResult, ModuleConfig};
use crate::model::corpus::Corpus;
use crate::model::domain::DomainProfile;
use crate::model::level::AtomLevel;
use crate::model::output::AnalysisOutput;
use once_cell::sync::Lazy;
use regex::Regex;

static CITATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\d{4}\)|\[\d+\]").expect("citation pattern is valid"));

const CAUSAL_CONNECTIVES: &[&str] = &["because", "therefore", "thus", "consequently", "hence"];
const CREDIBILITY_MARKERS: &[&str] = &[
    "research", "study", "studies", "data", "evidence", "according", "expert", "experts",
    "professor", "university", "report", "documented",
];
const WEASEL_WORDS: &[&str] = &[
    "clearly", "obviously", "very", "really", "just", "stuff", "things", "somehow",
];

const STEP_ORDER: &[&str] = &["logos", "pathos", "ethos", "clarity"];
const SUGGESTION_THRESHOLD: u64 = 60;

/// Ideal band for mean sentence length, in words.
const CLARITY_BAND: (u64, u64) = (12, 22);

struct StepScore {
    step_name: &'static str,
    score: u64,
    findings: Vec<String>,
}

/// Heuristic rhetorical scoring across logos/pathos/ethos/clarity.
pub struct EvaluationAnalysis;

impl EvaluationAnalysis {
    pub fn new() -> Self {
        Self
    }

    /// Share of sentences carrying at least one marker, doubled and capped:
    /// half the sentences covered already scores 100.
    fn coverage_score(covered: u64, total: u64) -> u64 {
        if total == 0 {
            return 0;
        }
        (covered * 200 / total).min(100)
    }

    fn logos(sentences: &[String]) -> StepScore {
        let mut covered = 0u64;
        let mut citations = 0u64;
        for sentence in sentences {
            let tokens = tokenize(sentence);
            let has_citation = CITATION.is_match(sentence);
            let has_number = tokens.iter().any(|token| token.parse::<f64>().is_ok());
            let has_connective = tokens
                .iter()
                .any(|token| CAUSAL_CONNECTIVES.contains(&token.as_str()));
            citations += u64::from(has_citation);
            covered += u64::from(has_citation || has_number || has_connective);
        }
        let total = sentences.len() as u64;
        StepScore {
            step_name: "logos",
            score: Self::coverage_score(covered, total),
            findings: vec![
                format!("{covered} of {total} sentences carry evidence markers"),
                format!("{citations} citation-style references"),
            ],
        }
    }

    fn pathos(sentences: &[String]) -> StepScore {
        let mut emotive = 0u64;
        let mut total_tokens = 0u64;
        for sentence in sentences {
            for token in tokenize(sentence) {
                total_tokens += 1;
                let weight = DEFAULT_LEXICON
                    .iter()
                    .find(|(term, _)| *term == token)
                    .map(|(_, score)| score.abs())
                    .unwrap_or(0.0);
                emotive += u64::from(weight >= 0.5);
            }
        }
        // One emotive word in ten already scores 100.
        let score = if total_tokens == 0 {
            0
        } else {
            (emotive * 1000 / total_tokens).min(100)
        };
        StepScore {
            step_name: "pathos",
            score,
            findings: vec![format!(
                "{emotive} emotionally weighted words out of {total_tokens}"
            )],
        }
    }

    fn ethos(sentences: &[String]) -> StepScore {
        let mut covered = 0u64;
        for sentence in sentences {
            let tokens = tokenize(sentence);
            if tokens
                .iter()
                .any(|token| CREDIBILITY_MARKERS.contains(&token.as_str()))
            {
                covered += 1;
            }
        }
        let total = sentences.len() as u64;
        StepScore {
            step_name: "ethos",
            score: Self::coverage_score(covered, total),
            findings: vec![format!(
                "{covered} of {total} sentences reference credibility markers"
            )],
        }
    }

    fn clarity(sentences: &[String]) -> StepScore {
        let total = sentences.len() as u64;
        if total == 0 {
            return StepScore {
                step_name: "clarity",
                score: 0,
                findings: vec!["no sentences to assess".to_string()],
            };
        }

        let mut word_count = 0u64;
        let mut weasels = 0u64;
        for sentence in sentences {
            let tokens = tokenize(sentence);
            word_count += tokens.len() as u64;
            weasels += tokens
                .iter()
                .filter(|token| WEASEL_WORDS.contains(&token.as_str()))
                .count() as u64;
        }
        let mean_length = word_count / total;

        let (low, high) = CLARITY_BAND;
        let band_distance = if mean_length < low {
            low - mean_length
        } else if mean_length > high {
            mean_length - high
        } else {
            0
        };
        let base = 100u64.saturating_sub(band_distance * 4);
        let score = base.saturating_sub(weasels * 5);

        StepScore {
            step_name: "clarity",
            score,
            findings: vec![
                format!("mean sentence length {mean_length} words"),
                format!("{weasels} hedging/weasel words"),
            ],
        }
    }

    fn suggestion_for(step_name: &str) -> &'static str {
        match step_name {
            "logos" => "Support more claims with figures, citations, or causal reasoning.",
            "pathos" => "Add concrete, emotionally resonant language where the argument needs weight.",
            "ethos" => "Reference sources, studies, or expertise to ground the argument.",
            _ => "Balance sentence length and cut hedging words like 'clearly' and 'obviously'.",
        }
    }
}

impl Default for EvaluationAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisModule for EvaluationAnalysis {
    fn name(&self) -> &'static str {
        "evaluation"
    }

    fn description(&self) -> &'static str {
        "Heuristic rhetorical scoring across logos/pathos/ethos/clarity"
    }

    fn analyze(
        &self,
        corpus: &Corpus,
        _domain: Option<&DomainProfile>,
        _config: &ModuleConfig,
    ) -> AnalysisResult {
        let sentences: Vec<String> = corpus
            .iter_atoms(AtomLevel::Sentence)
            .map(|sentence| sentence.text.clone())
            .collect();

        let steps = vec![
            Self::logos(&sentences),
            Self::pathos(&sentences),
            Self::ethos(&sentences),
            Self::clarity(&sentences),
        ];

        let overall_score = if steps.is_empty() {
            0
        } else {
            steps.iter().map(|step| step.score).sum::<u64>() / steps.len() as u64
        };
        // Ties resolve in fixed step order.
        let strongest = steps
            .iter()
            .max_by_key(|step| step.score)
            .map(|step| step.step_name)
            .unwrap_or("");
        let weakest = steps
            .iter()
            .min_by_key(|step| step.score)
            .map(|step| step.step_name)
            .unwrap_or("");

        let suggestions: Vec<&'static str> = steps
            .iter()
            .filter(|step| step.score < SUGGESTION_THRESHOLD)
            .map(|step| Self::suggestion_for(step.step_name))
            .collect();

        let step_values: Vec<serde_json::Value> = steps
            .iter()
            .map(|step| {
                serde_json::json!({
                    "step_name": step.step_name,
                    "score": step.score,
                    "findings": step.findings,
                })
            })
            .collect();

        let data = serde_json::json!({
            "steps": step_values,
            "summary": {
                "overall_score": overall_score,
                "strongest_step": strongest,
                "weakest_step": weakest,
                "sentence_count": sentences.len(),
                "theme_count": theme_titles(corpus).len(),
            },
            "suggestions": suggestions,
        });

        Ok(AnalysisOutput::new(self.name(), data)
            .with_metadata("backend", "heuristic")
            .with_metadata("step_order", serde_json::json!(STEP_ORDER)))
    }
}

#[cfg(test)]
mod tests {
    use super::EvaluationAnalysis;
    use crate::analysis::{AnalysisModule, ModuleConfig};
    use crate::atomizer::Atomizer;
    use crate::model::corpus::Corpus;
    use crate::model::level::AtomLevel;
    use crate::model::schema::AtomizationSchema;

    fn corpus_from(text: &str) -> Corpus {
        let mut atomizer = Atomizer::new(AtomizationSchema::default()).expect("atomizer");
        let mut document = crate::model::document::Document::new("doc-1", "memory", "plain");
        document.root_atoms = atomizer
            .atomize_text(text, AtomLevel::Theme)
            .expect("atomize");
        Corpus::new("test", vec![document], AtomizationSchema::default())
    }

    #[test]
    fn evidence_rich_text_scores_high_on_logos() {
        let corpus = corpus_from(
            "## T\n\nEmissions fell 45 percent because of the policy (2023). \
             The study documented 12 cases. Therefore the data held.",
        );
        let output = EvaluationAnalysis::new()
            .analyze(&corpus, None, &ModuleConfig::new())
            .expect("analyze");

        let steps = output.data["steps"].as_array().expect("steps");
        let logos = &steps[0];
        assert_eq!(logos["step_name"], "logos");
        assert_eq!(logos["score"], 100);
    }

    #[test]
    fn weasel_heavy_text_is_penalized_on_clarity() {
        let corpus = corpus_from(
            "## T\n\nThings are clearly bad and obviously stuff is really just very wrong somehow, really.",
        );
        let output = EvaluationAnalysis::new()
            .analyze(&corpus, None, &ModuleConfig::new())
            .expect("analyze");

        let steps = output.data["steps"].as_array().expect("steps");
        let clarity = steps
            .iter()
            .find(|step| step["step_name"] == "clarity")
            .expect("clarity step");
        assert!(clarity["score"].as_u64().expect("score") < 80);
        assert!(output.data["suggestions"]
            .as_array()
            .expect("suggestions")
            .iter()
            .any(|s| s.as_str().expect("text").contains("hedging")));
    }

    #[test]
    fn empty_corpus_scores_zero_overall() {
        let corpus = corpus_from("");
        let output = EvaluationAnalysis::new()
            .analyze(&corpus, None, &ModuleConfig::new())
            .expect("analyze");
        assert_eq!(output.data["summary"]["overall_score"], 0);
    }

    #[test]
    fn output_is_idempotent() {
        let corpus = corpus_from("## T\n\nThe study held. People felt joy because of it.");
        let module = EvaluationAnalysis::new();
        let config = ModuleConfig::new();
        let first = module.analyze(&corpus, None, &config).expect("analyze");
        let second = module.analyze(&corpus, None, &config).expect("analyze");
        assert_eq!(first.data, second.data);
    }
}
