//! Term-frequency semantic similarity between themes.
//!
//! Stopword-filtered term vectors per theme and pairwise cosine similarity.
//! A deterministic frequency model; richer vector backends plug in behind
//! the same module contract.

use crate::analysis::{config_usize, theme_titles, tokenize, AnalysisModule, AnalysisResult, ModuleConfig};
use crate::model::corpus::Corpus;
use crate::model::domain::DomainProfile;
use crate::model::level::AtomLevel;
use crate::model::output::AnalysisOutput;
use std::collections::BTreeMap;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "had", "has",
    "have", "he", "her", "his", "i", "in", "is", "it", "its", "my", "no", "not", "of", "on",
    "or", "our", "she", "so", "that", "the", "their", "them", "then", "there", "they",
    "this", "to", "was", "we", "were", "what", "when", "which", "who", "will", "with", "you",
];

/// Theme-to-theme similarity over term-frequency vectors.
pub struct SemanticAnalysis;

impl SemanticAnalysis {
    pub fn new() -> Self {
        Self
    }

    fn term_vector(text: &str) -> BTreeMap<String, usize> {
        let mut vector = BTreeMap::new();
        for token in tokenize(text) {
            if STOPWORDS.contains(&token.as_str()) {
                continue;
            }
            *vector.entry(token).or_insert(0) += 1;
        }
        vector
    }

    fn cosine(left: &BTreeMap<String, usize>, right: &BTreeMap<String, usize>) -> f64 {
        let dot: f64 = left
            .iter()
            .filter_map(|(term, count)| right.get(term).map(|other| (*count * *other) as f64))
            .sum();
        let left_norm = (left.values().map(|count| (*count * *count) as f64).sum::<f64>()).sqrt();
        let right_norm = (right.values().map(|count| (*count * *count) as f64).sum::<f64>()).sqrt();
        if left_norm == 0.0 || right_norm == 0.0 {
            return 0.0;
        }
        dot / (left_norm * right_norm)
    }
}

impl Default for SemanticAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisModule for SemanticAnalysis {
    fn name(&self) -> &'static str {
        "semantic"
    }

    fn description(&self) -> &'static str {
        "Term-frequency cosine similarity between themes"
    }

    fn analyze(
        &self,
        corpus: &Corpus,
        _domain: Option<&DomainProfile>,
        config: &ModuleConfig,
    ) -> AnalysisResult {
        let top_terms = config_usize(config, "top_terms", 10);
        let top_pairs = config_usize(config, "top_pairs", 5);
        let titles = theme_titles(corpus);

        let themes: Vec<(String, BTreeMap<String, usize>)> = corpus
            .iter_atoms(AtomLevel::Theme)
            .map(|theme| (theme.id.clone(), Self::term_vector(&theme.text)))
            .collect();

        // Similarity matrix in theme order.
        let theme_ids: Vec<&String> = themes.iter().map(|(id, _)| id).collect();
        let mut matrix: Vec<Vec<f64>> = Vec::with_capacity(themes.len());
        for (_, left) in &themes {
            let row = themes
                .iter()
                .map(|(_, right)| Self::cosine(left, right))
                .collect();
            matrix.push(row);
        }

        // Ranked pairs above the diagonal: similarity desc, then IDs asc.
        let mut pairs: Vec<(f64, &String, &String)> = Vec::new();
        for i in 0..themes.len() {
            for j in (i + 1)..themes.len() {
                pairs.push((matrix[i][j], theme_ids[i], theme_ids[j]));
            }
        }
        pairs.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
                .then_with(|| a.2.cmp(b.2))
        });
        let ranked_pairs: Vec<serde_json::Value> = pairs
            .iter()
            .take(top_pairs)
            .map(|(similarity, left, right)| {
                serde_json::json!({
                    "themes": [left, right],
                    "similarity": similarity,
                })
            })
            .collect();

        // Top terms per theme: count desc, term asc.
        let mut theme_terms = serde_json::Map::new();
        for (theme_id, vector) in &themes {
            let mut ranked: Vec<(&String, &usize)> = vector.iter().collect();
            ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            let terms: Vec<serde_json::Value> = ranked
                .into_iter()
                .take(top_terms)
                .map(|(term, count)| serde_json::json!({"term": term, "count": count}))
                .collect();
            theme_terms.insert(
                theme_id.clone(),
                serde_json::json!({
                    "title": titles.get(theme_id).cloned().unwrap_or(theme_id.clone()),
                    "top_terms": terms,
                }),
            );
        }

        let data = serde_json::json!({
            "theme_ids": theme_ids,
            "similarity_matrix": matrix,
            "top_pairs": ranked_pairs,
            "theme_terms": theme_terms,
        });

        Ok(AnalysisOutput::new(self.name(), data).with_metadata("backend", "term-frequency"))
    }
}

#[cfg(test)]
mod tests {
    use super::SemanticAnalysis;
    use crate::analysis::{AnalysisModule, ModuleConfig};
    use crate::atomizer::Atomizer;
    use crate::model::corpus::Corpus;
    use crate::model::level::AtomLevel;
    use crate::model::schema::AtomizationSchema;
    use std::collections::BTreeMap;

    fn corpus_from(text: &str) -> Corpus {
        let mut atomizer = Atomizer::new(AtomizationSchema::default()).expect("atomizer");
        let mut document = crate::model::document::Document::new("doc-1", "memory", "plain");
        document.root_atoms = atomizer
            .atomize_text(text, AtomLevel::Theme)
            .expect("atomize");
        Corpus::new("test", vec![document], AtomizationSchema::default())
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let mut vector = BTreeMap::new();
        vector.insert("river".to_string(), 2usize);
        vector.insert("stone".to_string(), 1usize);
        assert!((SemanticAnalysis::cosine(&vector, &vector) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_vectors_score_zero() {
        let mut left = BTreeMap::new();
        left.insert("river".to_string(), 1usize);
        let mut right = BTreeMap::new();
        right.insert("stone".to_string(), 1usize);
        assert_eq!(SemanticAnalysis::cosine(&left, &right), 0.0);
        assert_eq!(SemanticAnalysis::cosine(&left, &BTreeMap::new()), 0.0);
    }

    #[test]
    fn similar_themes_rank_above_dissimilar_ones() {
        let corpus = corpus_from(
            "## A\n\nRiver stones under water.\n\n## B\n\nRiver water over stones.\n\n## C\n\nDesert sand and wind.",
        );
        let output = SemanticAnalysis::new()
            .analyze(&corpus, None, &ModuleConfig::new())
            .expect("analyze");

        let top_pair = &output.data["top_pairs"][0];
        assert_eq!(top_pair["themes"][0], "T001");
        assert_eq!(top_pair["themes"][1], "T002");
        assert!(top_pair["similarity"].as_f64().expect("similarity") > 0.7);

        let matrix = output.data["similarity_matrix"].as_array().expect("matrix");
        assert_eq!(matrix.len(), 3);
        assert!((matrix[0][0].as_f64().expect("diagonal") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn stopwords_do_not_contribute_terms() {
        let corpus = corpus_from("## A\n\nThe river and the stone.");
        let output = SemanticAnalysis::new()
            .analyze(&corpus, None, &ModuleConfig::new())
            .expect("analyze");

        let terms = output.data["theme_terms"]["T001"]["top_terms"]
            .as_array()
            .expect("terms");
        let term_names: Vec<&str> = terms
            .iter()
            .filter_map(|entry| entry["term"].as_str())
            .collect();
        assert!(term_names.contains(&"river"));
        assert!(!term_names.contains(&"the"));
    }
}
