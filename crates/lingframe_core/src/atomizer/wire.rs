//! Persisted corpus document shape.
//!
//! # Invariants
//! - Field set and nesting are fixed: `metadata` + `themes`, each level
//!   carrying `id`, text, a child count, the child list, and back-references
//!   to every ancestor ID.
//! - `to_file` followed by `from_file` reconstructs the identical atom tree.

use crate::atomizer::{AtomizeError, AtomizeResult};
use crate::model::atom::{AncestorRefs, Atom};
use crate::model::corpus::Corpus;
use crate::model::document::Document;
use crate::model::level::AtomLevel;
use crate::model::schema::AtomizationSchema;
use crate::naming::NamingConfig;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CorpusFile {
    pub metadata: CorpusMetadata,
    pub themes: Vec<ThemeNode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CorpusMetadata {
    pub title: String,
    pub author: Option<String>,
    pub atomized_date: String,
    pub hierarchy: String,
    pub total_themes: usize,
    pub total_paragraphs: usize,
    pub total_sentences: usize,
    pub total_words: usize,
    pub total_letters: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ThemeNode {
    pub id: String,
    pub title: String,
    pub text: String,
    pub paragraph_count: usize,
    pub paragraphs: Vec<ParagraphNode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ParagraphNode {
    pub id: String,
    pub text: String,
    pub sentence_count: usize,
    pub sentences: Vec<SentenceNode>,
    pub theme_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SentenceNode {
    pub id: String,
    pub text: String,
    pub word_count: usize,
    pub words: Vec<WordNode>,
    pub paragraph_id: String,
    pub theme_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WordNode {
    pub id: String,
    pub text: String,
    pub letter_count: usize,
    pub letters: Vec<LetterNode>,
    pub sentence_id: String,
    pub paragraph_id: String,
    pub theme_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LetterNode {
    pub id: String,
    #[serde(rename = "char")]
    pub character: String,
    pub word_id: String,
    pub sentence_id: String,
    pub paragraph_id: String,
    pub theme_id: String,
}

pub(crate) fn to_file(corpus: &Corpus) -> CorpusFile {
    let themes = corpus
        .documents
        .iter()
        .flat_map(|document| document.root_atoms.iter())
        .map(theme_node)
        .collect();

    let author = corpus
        .documents
        .iter()
        .find_map(|document| document.author.clone());

    CorpusFile {
        metadata: CorpusMetadata {
            title: corpus.name.clone(),
            author,
            atomized_date: corpus.created_at.format("%Y-%m-%d").to_string(),
            hierarchy: corpus.schema.hierarchy_label(),
            total_themes: corpus.count_atoms(AtomLevel::Theme),
            total_paragraphs: corpus.count_atoms(AtomLevel::Paragraph),
            total_sentences: corpus.count_atoms(AtomLevel::Sentence),
            total_words: corpus.count_atoms(AtomLevel::Word),
            total_letters: corpus.count_atoms(AtomLevel::Letter),
        },
        themes,
    }
}

pub(crate) fn from_file(file: CorpusFile, path_label: &str) -> AtomizeResult<Corpus> {
    let mut levels = Vec::new();
    for label in file.metadata.hierarchy.split(" → ") {
        let level = AtomLevel::from_str(label).map_err(|err| AtomizeError::Malformed {
            path: path_label.to_string(),
            detail: err.to_string(),
        })?;
        levels.push(level);
    }
    let schema = AtomizationSchema::new("default", levels, NamingConfig::default()).map_err(
        |err| AtomizeError::Malformed {
            path: path_label.to_string(),
            detail: err.to_string(),
        },
    )?;

    let date = NaiveDate::parse_from_str(&file.metadata.atomized_date, "%Y-%m-%d").map_err(
        |err| AtomizeError::Malformed {
            path: path_label.to_string(),
            detail: format!("bad atomized_date: {err}"),
        },
    )?;
    let created_at = Utc
        .from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default());

    let root_atoms: Vec<Atom> = file.themes.into_iter().map(theme_atom).collect();

    let mut document = Document::new("DOC0001", path_label, "atomized-json");
    document.title = Some(file.metadata.title.clone());
    document.author = file.metadata.author.clone();
    document.root_atoms = root_atoms;

    let mut corpus = Corpus::new(file.metadata.title, vec![document], schema);
    corpus.created_at = created_at;
    Ok(corpus)
}

fn theme_node(atom: &Atom) -> ThemeNode {
    ThemeNode {
        id: atom.id.clone(),
        title: atom.title().unwrap_or("").to_string(),
        text: atom.text.clone(),
        paragraph_count: atom.children.len(),
        paragraphs: atom.children.iter().map(paragraph_node).collect(),
    }
}

fn paragraph_node(atom: &Atom) -> ParagraphNode {
    ParagraphNode {
        id: atom.id.clone(),
        text: atom.text.clone(),
        sentence_count: atom.children.len(),
        sentences: atom.children.iter().map(sentence_node).collect(),
        theme_id: ref_or_empty(&atom.ancestors, AtomLevel::Theme),
    }
}

fn sentence_node(atom: &Atom) -> SentenceNode {
    SentenceNode {
        id: atom.id.clone(),
        text: atom.text.clone(),
        word_count: atom.children.len(),
        words: atom.children.iter().map(word_node).collect(),
        paragraph_id: ref_or_empty(&atom.ancestors, AtomLevel::Paragraph),
        theme_id: ref_or_empty(&atom.ancestors, AtomLevel::Theme),
    }
}

fn word_node(atom: &Atom) -> WordNode {
    WordNode {
        id: atom.id.clone(),
        text: atom.text.clone(),
        letter_count: atom.children.len(),
        letters: atom.children.iter().map(letter_node).collect(),
        sentence_id: ref_or_empty(&atom.ancestors, AtomLevel::Sentence),
        paragraph_id: ref_or_empty(&atom.ancestors, AtomLevel::Paragraph),
        theme_id: ref_or_empty(&atom.ancestors, AtomLevel::Theme),
    }
}

fn letter_node(atom: &Atom) -> LetterNode {
    LetterNode {
        id: atom.id.clone(),
        character: atom.text.clone(),
        word_id: ref_or_empty(&atom.ancestors, AtomLevel::Word),
        sentence_id: ref_or_empty(&atom.ancestors, AtomLevel::Sentence),
        paragraph_id: ref_or_empty(&atom.ancestors, AtomLevel::Paragraph),
        theme_id: ref_or_empty(&atom.ancestors, AtomLevel::Theme),
    }
}

fn ref_or_empty(ancestors: &AncestorRefs, level: AtomLevel) -> String {
    ancestors.get(level).unwrap_or("").to_string()
}

fn theme_atom(node: ThemeNode) -> Atom {
    let mut atom = Atom::new(node.id, AtomLevel::Theme, node.text);
    if !node.title.is_empty() {
        atom.metadata.insert("title".to_string(), node.title);
    }
    atom.children = node.paragraphs.into_iter().map(paragraph_atom).collect();
    atom
}

fn paragraph_atom(node: ParagraphNode) -> Atom {
    let mut atom = Atom::new(node.id, AtomLevel::Paragraph, node.text);
    atom.ancestors.theme_id = non_empty(node.theme_id);
    atom.children = node.sentences.into_iter().map(sentence_atom).collect();
    atom
}

fn sentence_atom(node: SentenceNode) -> Atom {
    let mut atom = Atom::new(node.id, AtomLevel::Sentence, node.text);
    atom.ancestors.theme_id = non_empty(node.theme_id);
    atom.ancestors.paragraph_id = non_empty(node.paragraph_id);
    atom.children = node.words.into_iter().map(word_atom).collect();
    atom
}

fn word_atom(node: WordNode) -> Atom {
    let mut atom = Atom::new(node.id, AtomLevel::Word, node.text);
    atom.ancestors.theme_id = non_empty(node.theme_id);
    atom.ancestors.paragraph_id = non_empty(node.paragraph_id);
    atom.ancestors.sentence_id = non_empty(node.sentence_id);
    atom.children = node.letters.into_iter().map(letter_atom).collect();
    atom
}

fn letter_atom(node: LetterNode) -> Atom {
    let mut atom = Atom::new(node.id, AtomLevel::Letter, node.character);
    atom.ancestors.theme_id = non_empty(node.theme_id);
    atom.ancestors.paragraph_id = non_empty(node.paragraph_id);
    atom.ancestors.sentence_id = non_empty(node.sentence_id);
    atom.ancestors.word_id = non_empty(node.word_id);
    atom
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
