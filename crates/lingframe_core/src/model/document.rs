//! Source document model.

use crate::model::atom::Atom;
use serde::{Deserialize, Serialize};

/// One source text and the root atoms it decomposed into.
///
/// Root atoms are owned exclusively by the document; everything below them is
/// owned transitively through the atom tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// Source path or other external identifier.
    pub source: String,
    /// Input format tag, e.g. `markdown` or `plain`.
    pub format: String,
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub root_atoms: Vec<Atom>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            format: format.into(),
            title: None,
            author: None,
            root_atoms: Vec::new(),
        }
    }
}
