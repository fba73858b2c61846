//! Corpus aggregate and level-wise traversal.
//!
//! # Responsibility
//! - Aggregate atomized documents under the schema that produced them.
//! - Provide restartable tree-order traversal and counting per level.
//!
//! # Invariants
//! - A corpus is read-only once constructed; analysis modules derive new
//!   structures instead of mutating it.
//! - Atom identity is the ID, not structural content.

use crate::model::atom::Atom;
use crate::model::document::Document;
use crate::model::level::AtomLevel;
use crate::model::schema::AtomizationSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named collection of atomized documents sharing one schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    pub name: String,
    pub documents: Vec<Document>,
    pub schema: AtomizationSchema,
    pub created_at: DateTime<Utc>,
}

impl Corpus {
    pub fn new(
        name: impl Into<String>,
        documents: Vec<Document>,
        schema: AtomizationSchema,
    ) -> Self {
        Self {
            name: name.into(),
            documents,
            schema,
            created_at: Utc::now(),
        }
    }

    /// Total number of atoms at `level` across all documents.
    pub fn count_atoms(&self, level: AtomLevel) -> usize {
        self.iter_atoms(level).count()
    }

    /// Tree-order traversal of all atoms at `level`.
    ///
    /// Each call starts a fresh traversal; the iterator is not a shared
    /// cursor. Ancestor context travels on each atom's `ancestors` field.
    pub fn iter_atoms(&self, level: AtomLevel) -> AtomIter<'_> {
        let mut stack: Vec<&Atom> = Vec::new();
        for document in self.documents.iter().rev() {
            for atom in document.root_atoms.iter().rev() {
                stack.push(atom);
            }
        }
        AtomIter { level, stack }
    }
}

/// Depth-first atom iterator yielding document/tree order at one level.
pub struct AtomIter<'a> {
    level: AtomLevel,
    stack: Vec<&'a Atom>,
}

impl<'a> Iterator for AtomIter<'a> {
    type Item = &'a Atom;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(atom) = self.stack.pop() {
            if atom.level == self.level {
                return Some(atom);
            }
            if atom.level.depth() < self.level.depth() {
                for child in atom.children.iter().rev() {
                    self.stack.push(child);
                }
            }
        }
        None
    }
}
