//! Built-in naming strategy implementations.

use crate::model::atom::AncestorRefs;
use crate::model::level::AtomLevel;
use crate::naming::{slugify, NamingStrategy, NamingStrategyKind};
use std::collections::BTreeMap;
use uuid::Uuid;

fn formatted_counter(level: AtomLevel, value: u64) -> String {
    format!(
        "{}{:0width$}",
        level.id_prefix(),
        value,
        width = level.id_width()
    )
}

/// Default strategy: fixed-width zero-padded counters, global per level
/// across the whole corpus (never reset per parent), starting at 1.
///
/// Bit-exact reproducible: the same document always yields `T001`, `P0001`,
/// `S00001`, `W000001`, `L00000001` onward.
#[derive(Debug, Default)]
pub struct LegacyNaming {
    counters: BTreeMap<AtomLevel, u64>,
}

impl LegacyNaming {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NamingStrategy for LegacyNaming {
    fn kind(&self) -> NamingStrategyKind {
        NamingStrategyKind::Legacy
    }

    fn next_id(&mut self, level: AtomLevel, _text: &str, _ancestors: &AncestorRefs) -> String {
        let counter = self.counters.entry(level).or_insert(0);
        *counter += 1;
        formatted_counter(level, *counter)
    }

    fn reset(&mut self) {
        self.counters.clear();
    }
}

/// Path-encoding strategy: the parent's full ID joined with a per-parent
/// sequential component, e.g. `T001.P0002.S00003`.
///
/// Counters are keyed by parent ID, so siblings number from 1 under each
/// parent and the ID alone reconstructs the ancestor chain.
#[derive(Debug, Default)]
pub struct HierarchicalNaming {
    counters: BTreeMap<String, u64>,
}

impl HierarchicalNaming {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NamingStrategy for HierarchicalNaming {
    fn kind(&self) -> NamingStrategyKind {
        NamingStrategyKind::Hierarchical
    }

    fn next_id(&mut self, level: AtomLevel, _text: &str, ancestors: &AncestorRefs) -> String {
        let parent = ancestors.nearest_above(level).unwrap_or("").to_string();
        let counter = self.counters.entry(parent.clone()).or_insert(0);
        *counter += 1;
        let component = formatted_counter(level, *counter);
        if parent.is_empty() {
            component
        } else {
            format!("{parent}.{component}")
        }
    }

    fn reset(&mut self) {
        self.counters.clear();
    }
}

/// Content-derived strategy: slug of the atom text plus a per-slug
/// occurrence counter (`hello-world-1`, `hello-world-2`).
#[derive(Debug)]
pub struct SemanticNaming {
    slug_words: usize,
    occurrences: BTreeMap<String, u64>,
}

impl SemanticNaming {
    pub fn new(slug_words: usize) -> Self {
        Self {
            slug_words,
            occurrences: BTreeMap::new(),
        }
    }
}

impl NamingStrategy for SemanticNaming {
    fn kind(&self) -> NamingStrategyKind {
        NamingStrategyKind::Semantic
    }

    fn next_id(&mut self, _level: AtomLevel, text: &str, _ancestors: &AncestorRefs) -> String {
        let slug = slugify(text, self.slug_words);
        let counter = self.occurrences.entry(slug.clone()).or_insert(0);
        *counter += 1;
        format!("{slug}-{counter}")
    }

    fn reset(&mut self) {
        self.occurrences.clear();
    }
}

/// Random v4 identifiers; unique across independent runs, no ordering.
#[derive(Debug, Default)]
pub struct UuidNaming;

impl UuidNaming {
    pub fn new() -> Self {
        Self
    }
}

impl NamingStrategy for UuidNaming {
    fn kind(&self) -> NamingStrategyKind {
        NamingStrategyKind::Uuid
    }

    fn next_id(&mut self, _level: AtomLevel, _text: &str, _ancestors: &AncestorRefs) -> String {
        Uuid::new_v4().to_string()
    }

    fn reset(&mut self) {}
}

/// Legacy-style sequential counter with a short content slug appended,
/// e.g. `T001-intro`. The counter alone carries uniqueness.
#[derive(Debug)]
pub struct HybridNaming {
    slug_words: usize,
    counters: BTreeMap<AtomLevel, u64>,
}

impl HybridNaming {
    pub fn new(slug_words: usize) -> Self {
        Self {
            slug_words,
            counters: BTreeMap::new(),
        }
    }
}

impl NamingStrategy for HybridNaming {
    fn kind(&self) -> NamingStrategyKind {
        NamingStrategyKind::Hybrid
    }

    fn next_id(&mut self, level: AtomLevel, text: &str, _ancestors: &AncestorRefs) -> String {
        let counter = self.counters.entry(level).or_insert(0);
        *counter += 1;
        let slug = slugify(text, self.slug_words);
        format!("{}-{slug}", formatted_counter(level, *counter))
    }

    fn reset(&mut self) {
        self.counters.clear();
    }
}
