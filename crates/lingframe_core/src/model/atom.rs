//! Atom tree node.
//!
//! # Responsibility
//! - Represent one node of the decomposition tree with its owned children.
//! - Carry ID back-references to every ancestor level for traversal-free
//!   lookup.
//!
//! # Invariants
//! - Children are strictly one configured level below their parent.
//! - `ancestors` holds IDs only, never ownership.
//! - Joining children's text with the child level's separator reproduces the
//!   parent text (whitespace-normalized above the sentence level).

use crate::model::level::AtomLevel;
use crate::model::schema::AtomizationSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ID back-references to every ancestor of an atom.
///
/// Populated top-down during atomization so that any atom can answer
/// "which sentence/paragraph/theme am I in" without walking the tree.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AncestorRefs {
    pub theme_id: Option<String>,
    pub paragraph_id: Option<String>,
    pub sentence_id: Option<String>,
    pub word_id: Option<String>,
}

impl AncestorRefs {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the refs a child inherits when `parent_id` at `parent_level`
    /// becomes its ancestor.
    pub fn child_of(&self, parent_level: AtomLevel, parent_id: &str) -> Self {
        let mut refs = self.clone();
        match parent_level {
            AtomLevel::Theme => refs.theme_id = Some(parent_id.to_string()),
            AtomLevel::Paragraph => refs.paragraph_id = Some(parent_id.to_string()),
            AtomLevel::Sentence => refs.sentence_id = Some(parent_id.to_string()),
            AtomLevel::Word => refs.word_id = Some(parent_id.to_string()),
            AtomLevel::Letter => {}
        }
        refs
    }

    /// The recorded ancestor ID at `level`, if any.
    pub fn get(&self, level: AtomLevel) -> Option<&str> {
        match level {
            AtomLevel::Theme => self.theme_id.as_deref(),
            AtomLevel::Paragraph => self.paragraph_id.as_deref(),
            AtomLevel::Sentence => self.sentence_id.as_deref(),
            AtomLevel::Word => self.word_id.as_deref(),
            AtomLevel::Letter => None,
        }
    }

    /// The nearest (deepest) recorded ancestor ID above `level`, if any.
    pub fn nearest_above(&self, level: AtomLevel) -> Option<&str> {
        AtomLevel::ALL
            .iter()
            .rev()
            .filter(|candidate| candidate.depth() < level.depth())
            .find_map(|&candidate| self.get(candidate))
    }
}

/// One node in the decomposition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Globally unique within a corpus; format depends on the naming strategy.
    pub id: String,
    pub level: AtomLevel,
    /// Raw text span this atom represents (a single char for letters).
    pub text: String,
    /// Owned children, each one configured level deeper.
    #[serde(default)]
    pub children: Vec<Atom>,
    #[serde(default)]
    pub ancestors: AncestorRefs,
    /// Free-form annotations, e.g. `title` for themes.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Atom {
    pub fn new(id: impl Into<String>, level: AtomLevel, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level,
            text: text.into(),
            children: Vec::new(),
            ancestors: AncestorRefs::empty(),
            metadata: BTreeMap::new(),
        }
    }

    /// True when this atom sits at the schema's deepest configured level.
    pub fn is_leaf(&self, schema: &AtomizationSchema) -> bool {
        self.level == schema.last_level()
    }

    /// Theme title annotation, when present.
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").map(String::as_str)
    }

    /// Separator used when joining this atom's children back into its text.
    pub fn child_separator(child_level: AtomLevel) -> &'static str {
        match child_level {
            AtomLevel::Paragraph => "\n\n",
            AtomLevel::Sentence | AtomLevel::Word => " ",
            AtomLevel::Letter => "",
            AtomLevel::Theme => "\n\n",
        }
    }

    /// Joins the children's text with the child level's separator.
    ///
    /// Equals `self.text` exactly for words rebuilt from letters, and a
    /// whitespace-normalized match at higher levels.
    pub fn reconstructed_text(&self) -> String {
        let Some(first) = self.children.first() else {
            return self.text.clone();
        };
        let separator = Self::child_separator(first.level);
        self.children
            .iter()
            .map(|child| child.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}
