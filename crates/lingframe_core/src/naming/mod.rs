//! Pluggable atom ID generation.
//!
//! # Responsibility
//! - Map (level, running counter, content, ancestor context) to a unique ID
//!   string, per configured strategy.
//! - Keep all counter state inside the strategy instance so independent runs
//!   never share ambient state.
//!
//! # Invariants
//! - Every strategy guarantees uniqueness within one atomization run.
//! - Stability across independent runs is strategy-dependent: sequential
//!   strategies renumber from scratch; only `uuid` is globally unique.
//! - Switching strategies never changes the atomizer's split logic.

mod strategies;

pub use strategies::{
    HierarchicalNaming, HybridNaming, LegacyNaming, SemanticNaming, UuidNaming,
};

use crate::model::atom::AncestorRefs;
use crate::model::level::AtomLevel;
use serde::{Deserialize, Serialize};

/// Strategy selector stored inside a schema's naming configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategyKind {
    /// Fixed-width zero-padded global counter per level (`T001`, `P0001`).
    #[default]
    Legacy,
    /// ID encodes the full ancestor path (`T001.P0002.S00003`).
    Hierarchical,
    /// Content slug plus a disambiguating counter (`hello-world-1`).
    Semantic,
    /// Random v4 identifier, no ordering guarantee.
    Uuid,
    /// Sequential counter plus a short content slug (`T001-intro`).
    Hybrid,
}

/// Strategy-specific naming configuration carried by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default)]
    pub strategy: NamingStrategyKind,
    /// Maximum words kept in semantic/hybrid slugs.
    #[serde(default = "default_slug_words")]
    pub slug_words: usize,
}

fn default_slug_words() -> usize {
    3
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            strategy: NamingStrategyKind::default(),
            slug_words: default_slug_words(),
        }
    }
}

/// ID generation contract consumed by the atomizer.
pub trait NamingStrategy {
    fn kind(&self) -> NamingStrategyKind;

    /// Produces the next unique ID for an atom at `level` with the given
    /// text content and ancestor refs (parent IDs are already assigned when
    /// this is called).
    fn next_id(&mut self, level: AtomLevel, text: &str, ancestors: &AncestorRefs) -> String;

    /// Resets all sequence state; required before atomizing an independent
    /// corpus with the same strategy instance.
    fn reset(&mut self);
}

/// Builds the boxed strategy a schema's naming configuration selects.
pub fn create_strategy(config: &NamingConfig) -> Box<dyn NamingStrategy> {
    match config.strategy {
        NamingStrategyKind::Legacy => Box::new(LegacyNaming::new()),
        NamingStrategyKind::Hierarchical => Box::new(HierarchicalNaming::new()),
        NamingStrategyKind::Semantic => Box::new(SemanticNaming::new(config.slug_words)),
        NamingStrategyKind::Uuid => Box::new(UuidNaming::new()),
        NamingStrategyKind::Hybrid => Box::new(HybridNaming::new(config.slug_words)),
    }
}

/// Lowercases, strips non-alphanumerics, and joins the first `max_words`
/// words with `-`. Empty input slugs to `atom`.
pub fn slugify(text: &str, max_words: usize) -> String {
    let slug = text
        .split_whitespace()
        .take(max_words.max(1))
        .map(|word| {
            word.chars()
                .filter(|ch| ch.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "atom".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::{create_strategy, slugify, NamingConfig, NamingStrategyKind};

    #[test]
    fn slugify_keeps_leading_words_and_drops_punctuation() {
        assert_eq!(slugify("Hello, World! Again and again", 3), "hello-world-again");
        assert_eq!(slugify("  ", 3), "atom");
        assert_eq!(slugify("?!", 2), "atom");
    }

    #[test]
    fn factory_honors_the_configured_strategy() {
        for kind in [
            NamingStrategyKind::Legacy,
            NamingStrategyKind::Hierarchical,
            NamingStrategyKind::Semantic,
            NamingStrategyKind::Uuid,
            NamingStrategyKind::Hybrid,
        ] {
            let config = NamingConfig {
                strategy: kind,
                ..NamingConfig::default()
            };
            assert_eq!(create_strategy(&config).kind(), kind);
        }
    }
}
