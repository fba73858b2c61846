//! Schema-driven recursive text decomposition.
//!
//! # Responsibility
//! - Split raw text into an atom tree per the schema's configured levels.
//! - Delegate ID assignment to the schema's naming strategy.
//! - Round-trip a corpus through the persisted JSON document.
//!
//! # Invariants
//! - Split rules are fixed per level; changing the naming strategy never
//!   changes split points.
//! - Sequence counters live in the naming strategy instance, never in
//!   ambient process state; `reset_counters` starts an independent corpus.
//! - Sentence boundaries are fixed: a `.`/`!`/`?` followed by whitespace
//!   splits at the whitespace. No abbreviation handling; the split points
//!   are load-bearing for downstream ID numbering, so "Mr." mid-sentence
//!   splits. Known, documented limitation.

mod wire;

use crate::model::atom::{AncestorRefs, Atom};
use crate::model::corpus::Corpus;
use crate::model::document::Document;
use crate::model::level::AtomLevel;
use crate::model::schema::{AtomizationSchema, ConfigurationError, PreamblePolicy};
use crate::naming::{create_strategy, slugify, NamingStrategy};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

static THEME_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^## (.+)$").expect("theme heading pattern is valid"));
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{2,}").expect("paragraph break pattern is valid"));

pub type AtomizeResult<T> = Result<T, AtomizeError>;

/// Atomization and corpus persistence errors.
#[derive(Debug)]
pub enum AtomizeError {
    /// Invalid schema or start level.
    Configuration(ConfigurationError),
    /// Source content is not valid text (e.g. binary input).
    Decoding { source: String, detail: String },
    Read { path: String, detail: String },
    Write { path: String, detail: String },
    /// A persisted corpus file that does not match the expected document
    /// shape.
    Malformed { path: String, detail: String },
    /// The corpus cannot be represented in the theme-rooted export format.
    UnsupportedExport { reason: String },
}

impl Display for AtomizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(err) => write!(f, "{err}"),
            Self::Decoding { source, detail } => {
                write!(f, "source is not decodable text: {source}: {detail}")
            }
            Self::Read { path, detail } => write!(f, "failed to read `{path}`: {detail}"),
            Self::Write { path, detail } => write!(f, "failed to write `{path}`: {detail}"),
            Self::Malformed { path, detail } => {
                write!(f, "malformed corpus file `{path}`: {detail}")
            }
            Self::UnsupportedExport { reason } => {
                write!(f, "corpus cannot be exported: {reason}")
            }
        }
    }
}

impl Error for AtomizeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for AtomizeError {
    fn from(value: ConfigurationError) -> Self {
        Self::Configuration(value)
    }
}

/// Converts raw text into atom trees conforming to one schema.
pub struct Atomizer {
    schema: AtomizationSchema,
    naming: Box<dyn NamingStrategy>,
}

impl Atomizer {
    /// Creates an atomizer for a validated schema, building the naming
    /// strategy the schema's configuration selects.
    pub fn new(schema: AtomizationSchema) -> Result<Self, ConfigurationError> {
        schema.validate()?;
        let naming = create_strategy(&schema.naming);
        Ok(Self { schema, naming })
    }

    pub fn schema(&self) -> &AtomizationSchema {
        &self.schema
    }

    /// Recursively splits `text` from `start_level` down to the schema's
    /// deepest level.
    ///
    /// Counters run globally across every call until `reset_counters`; a
    /// theme with zero paragraphs or a sentence with zero words is valid
    /// and produces an atom with no children.
    pub fn atomize_text(&mut self, text: &str, start_level: AtomLevel) -> AtomizeResult<Vec<Atom>> {
        if !self.schema.contains(start_level) {
            return Err(ConfigurationError::LevelNotInSchema(start_level).into());
        }
        Ok(self.atomize_level(text, start_level, &AncestorRefs::empty()))
    }

    /// Reads and atomizes one source file into a document.
    ///
    /// # Errors
    /// - `AtomizeError::Decoding` when the file content is not valid UTF-8;
    ///   other documents of the same corpus may still be atomized.
    pub fn atomize_document(
        &mut self,
        source_path: &Path,
        id: Option<String>,
        title: Option<String>,
        author: Option<String>,
    ) -> AtomizeResult<Document> {
        let path_label = source_path.display().to_string();
        let bytes = fs::read(source_path).map_err(|err| AtomizeError::Read {
            path: path_label.clone(),
            detail: err.to_string(),
        })?;
        let content = String::from_utf8(bytes).map_err(|err| AtomizeError::Decoding {
            source: path_label.clone(),
            detail: err.to_string(),
        })?;

        let document_id = id.unwrap_or_else(|| default_document_id(source_path));
        let format = match source_path.extension().and_then(|ext| ext.to_str()) {
            Some("md") | Some("markdown") => "markdown",
            _ => "plain",
        };

        let root_atoms = self.atomize_text(&content, self.schema.first_level())?;
        info!(
            "event=atomize_document module=atomizer status=ok source={} roots={}",
            path_label,
            root_atoms.len()
        );

        let mut document = Document::new(document_id, path_label, format);
        document.title = title;
        document.author = author;
        document.root_atoms = root_atoms;
        Ok(document)
    }

    /// Resets every per-level sequence counter to zero.
    ///
    /// Required before atomizing a new independent corpus with the same
    /// instance, to avoid ID collisions across unrelated corpora.
    pub fn reset_counters(&mut self) {
        self.naming.reset();
    }

    /// Writes the corpus as the theme-rooted JSON document.
    ///
    /// # Errors
    /// - `UnsupportedExport` when the schema is not rooted at the theme
    ///   level (the persisted format nests from `themes`).
    pub fn export_json(corpus: &Corpus, path: &Path) -> AtomizeResult<()> {
        if corpus.schema.first_level() != AtomLevel::Theme {
            return Err(AtomizeError::UnsupportedExport {
                reason: format!(
                    "persisted format is theme-rooted, schema starts at {}",
                    corpus.schema.first_level()
                ),
            });
        }

        let file = wire::to_file(corpus);
        let json = serde_json::to_string_pretty(&file).map_err(|err| AtomizeError::Write {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| AtomizeError::Write {
                    path: parent.display().to_string(),
                    detail: err.to_string(),
                })?;
            }
        }
        fs::write(path, json).map_err(|err| AtomizeError::Write {
            path: path.display().to_string(),
            detail: err.to_string(),
        })?;
        info!(
            "event=export_corpus module=atomizer status=ok path={} themes={}",
            path.display(),
            corpus.count_atoms(AtomLevel::Theme)
        );
        Ok(())
    }

    /// Loads a previously exported corpus, reconstructing the identical
    /// atom tree (same IDs, same text, same hierarchy).
    pub fn load_json(path: &Path) -> AtomizeResult<Corpus> {
        let path_label = path.display().to_string();
        let bytes = fs::read(path).map_err(|err| AtomizeError::Read {
            path: path_label.clone(),
            detail: err.to_string(),
        })?;
        let content = String::from_utf8(bytes).map_err(|err| AtomizeError::Decoding {
            source: path_label.clone(),
            detail: err.to_string(),
        })?;
        let file: wire::CorpusFile =
            serde_json::from_str(&content).map_err(|err| AtomizeError::Malformed {
                path: path_label.clone(),
                detail: err.to_string(),
            })?;
        wire::from_file(file, &path_label)
    }

    fn atomize_level(&mut self, text: &str, level: AtomLevel, ancestors: &AncestorRefs) -> Vec<Atom> {
        match level {
            AtomLevel::Theme => {
                let mut atoms = Vec::new();
                for segment in split_themes(text, self.schema.preamble) {
                    let mut atom = self.build_atom(&segment.body, level, ancestors);
                    if let Some(title) = segment.title {
                        atom.metadata.insert("title".to_string(), title);
                    }
                    atoms.push(atom);
                }
                atoms
            }
            AtomLevel::Paragraph => split_paragraphs(text)
                .into_iter()
                .map(|segment| self.build_atom(segment, level, ancestors))
                .collect(),
            AtomLevel::Sentence => split_sentences(text)
                .into_iter()
                .map(|segment| self.build_atom(segment, level, ancestors))
                .collect(),
            AtomLevel::Word => split_words(text)
                .into_iter()
                .map(|segment| self.build_atom(segment, level, ancestors))
                .collect(),
            AtomLevel::Letter => text
                .chars()
                .map(|ch| self.build_atom(&ch.to_string(), level, ancestors))
                .collect(),
        }
    }

    fn build_atom(&mut self, text: &str, level: AtomLevel, ancestors: &AncestorRefs) -> Atom {
        let id = self.naming.next_id(level, text, ancestors);
        let mut atom = Atom::new(id.clone(), level, text);
        atom.ancestors = ancestors.clone();
        if let Some(child_level) = self.schema.level_below(level) {
            let child_refs = ancestors.child_of(level, &id);
            atom.children = self.atomize_level(text, child_level, &child_refs);
        }
        atom
    }
}

fn default_document_id(source_path: &Path) -> String {
    let stem = source_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document");
    slugify(stem, 4)
}

struct ThemeSegment {
    title: Option<String>,
    body: String,
}

/// Splits text on `## `-style heading lines.
///
/// Heading text becomes the theme title; the body runs to the next heading
/// or end of text. Text before the first heading follows the preamble
/// policy. Without any heading the whole text is one preamble.
fn split_themes(text: &str, preamble: PreamblePolicy) -> Vec<ThemeSegment> {
    let mut headings: Vec<(usize, usize, String)> = Vec::new();
    for captures in THEME_HEADING.captures_iter(text) {
        let (Some(whole), Some(title)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        headings.push((whole.start(), whole.end(), title.as_str().trim().to_string()));
    }

    let mut segments = Vec::new();

    let preamble_end = headings.first().map(|&(start, _, _)| start).unwrap_or(text.len());
    let preamble_text = text[..preamble_end].trim();
    if preamble == PreamblePolicy::KeepUntitled && !preamble_text.is_empty() {
        segments.push(ThemeSegment {
            title: None,
            body: preamble_text.to_string(),
        });
    }

    for (index, (_, heading_end, title)) in headings.iter().enumerate() {
        let body_end = headings
            .get(index + 1)
            .map(|&(next_start, _, _)| next_start)
            .unwrap_or(text.len());
        let body = text[*heading_end..body_end].trim().to_string();
        segments.push(ThemeSegment {
            title: if title.is_empty() { None } else { Some(title.clone()) },
            body,
        });
    }

    segments
}

/// Splits on runs of two-or-more newlines; segments empty after trim are
/// discarded. Stored text keeps the raw segment.
fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .filter(|segment| !segment.trim().is_empty())
        .collect()
}

/// Terminal punctuation followed by whitespace splits at the whitespace
/// (whitespace consumed, punctuation kept).
fn split_sentences(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0usize;
    let mut chars = text.char_indices().peekable();

    while let Some((_, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let Some(&(after_punct, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }
        segments.push(&text[start..after_punct]);
        start = after_punct;
        while let Some(&(offset, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            start = offset + ws.len_utf8();
            chars.next();
        }
    }

    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
        .into_iter()
        .filter(|segment| !segment.trim().is_empty())
        .collect()
}

/// Splits on whitespace runs; empty tokens are discarded.
fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

#[cfg(test)]
mod tests {
    use super::{split_paragraphs, split_sentences, split_themes, split_words, Atomizer};
    use crate::model::level::AtomLevel;
    use crate::model::schema::{AtomizationSchema, ConfigurationError, PreamblePolicy};
    use crate::naming::NamingConfig;

    #[test]
    fn split_themes_extracts_titles_and_bodies() {
        let text = "## Intro\n\nHello.\n\n## End\n\nBye.";
        let segments = split_themes(text, PreamblePolicy::KeepUntitled);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].title.as_deref(), Some("Intro"));
        assert_eq!(segments[0].body, "Hello.");
        assert_eq!(segments[1].title.as_deref(), Some("End"));
        assert_eq!(segments[1].body, "Bye.");
    }

    #[test]
    fn split_themes_keeps_non_empty_preamble_untitled() {
        let text = "Before any heading.\n\n## First\n\nBody.";
        let segments = split_themes(text, PreamblePolicy::KeepUntitled);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].title, None);
        assert_eq!(segments[0].body, "Before any heading.");

        let dropped = split_themes(text, PreamblePolicy::Drop);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].title.as_deref(), Some("First"));
    }

    #[test]
    fn split_themes_without_headings_treats_text_as_preamble() {
        let segments = split_themes("Just plain text.", PreamblePolicy::KeepUntitled);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].title, None);

        assert!(split_themes("Just plain text.", PreamblePolicy::Drop).is_empty());
    }

    #[test]
    fn split_paragraphs_discards_blank_segments() {
        let segments = split_paragraphs("one\n\ntwo\n\n\n\nthree\n\n   \n\n");
        assert_eq!(segments, vec!["one", "two", "three"]);
    }

    #[test]
    fn split_sentences_splits_at_whitespace_after_terminal_punctuation() {
        assert_eq!(
            split_sentences("Hello world. Bye now."),
            vec!["Hello world.", "Bye now."]
        );
        assert_eq!(
            split_sentences("Really? Yes!  Fine."),
            vec!["Really?", "Yes!", "Fine."]
        );
        // No whitespace after the period means no split.
        assert_eq!(split_sentences("v1.2 shipped"), vec!["v1.2 shipped"]);
    }

    #[test]
    fn split_sentences_treats_ellipsis_as_one_boundary() {
        assert_eq!(split_sentences("Wait... ok"), vec!["Wait...", "ok"]);
    }

    #[test]
    fn split_sentences_has_no_abbreviation_handling() {
        // Documented limitation: downstream ID numbering depends on these
        // exact split points.
        assert_eq!(split_sentences("Mr. Smith left."), vec!["Mr.", "Smith left."]);
    }

    #[test]
    fn split_words_drops_all_whitespace() {
        assert_eq!(split_words("  a   b\tc\n"), vec!["a", "b", "c"]);
        assert!(split_words("   ").is_empty());
    }

    #[test]
    fn atomize_text_rejects_level_outside_schema() {
        let schema = AtomizationSchema::new(
            "shallow",
            vec![AtomLevel::Theme, AtomLevel::Paragraph],
            NamingConfig::default(),
        )
        .expect("valid schema");
        let mut atomizer = Atomizer::new(schema).expect("atomizer");
        let err = atomizer
            .atomize_text("text", AtomLevel::Word)
            .expect_err("word is not configured");
        assert!(matches!(
            err,
            super::AtomizeError::Configuration(ConfigurationError::LevelNotInSchema(
                AtomLevel::Word
            ))
        ));
    }

    #[test]
    fn empty_input_atomizes_to_nothing_without_error() {
        let mut atomizer = Atomizer::new(AtomizationSchema::default()).expect("atomizer");
        let atoms = atomizer
            .atomize_text("", AtomLevel::Theme)
            .expect("empty input is valid");
        assert!(atoms.is_empty());
    }

    #[test]
    fn counters_run_globally_until_reset() {
        let mut atomizer = Atomizer::new(AtomizationSchema::default()).expect("atomizer");
        let first = atomizer
            .atomize_text("## A\n\nOne.", AtomLevel::Theme)
            .expect("atomize");
        assert_eq!(first[0].id, "T001");

        let second = atomizer
            .atomize_text("## B\n\nTwo.", AtomLevel::Theme)
            .expect("atomize");
        assert_eq!(second[0].id, "T002");

        atomizer.reset_counters();
        let third = atomizer
            .atomize_text("## C\n\nThree.", AtomLevel::Theme)
            .expect("atomize");
        assert_eq!(third[0].id, "T001");
    }
}
