//! Atomization schema declaration and validation.
//!
//! # Responsibility
//! - Declare which contiguous run of levels a document decomposes to.
//! - Carry the naming configuration injected into the atomizer.
//!
//! # Invariants
//! - A schema's level list is non-empty, strictly descending, and contiguous.
//! - A schema is never mutated once atomization of a run has started.

use crate::model::level::AtomLevel;
use crate::naming::NamingConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Handling of text that precedes the first theme heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreamblePolicy {
    /// Non-empty preamble becomes an untitled first theme; empty preamble is
    /// dropped.
    #[default]
    KeepUntitled,
    /// Any preamble is discarded.
    Drop,
}

/// Named decomposition configuration: levels + naming + preamble handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomizationSchema {
    pub name: String,
    pub levels: Vec<AtomLevel>,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub preamble: PreamblePolicy,
}

impl AtomizationSchema {
    /// Creates a validated schema.
    ///
    /// # Errors
    /// - `ConfigurationError` when the level list is empty, out of order,
    ///   duplicated, or skips a level.
    pub fn new(
        name: impl Into<String>,
        levels: Vec<AtomLevel>,
        naming: NamingConfig,
    ) -> Result<Self, ConfigurationError> {
        let schema = Self {
            name: name.into(),
            levels,
            naming,
            preamble: PreamblePolicy::default(),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Checks the level-list invariants without consuming the schema.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.levels.is_empty() {
            return Err(ConfigurationError::EmptyLevels);
        }
        for pair in self.levels.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.depth() <= prev.depth() {
                return Err(ConfigurationError::UnorderedLevels { prev, next });
            }
            if next.depth() != prev.depth() + 1 {
                return Err(ConfigurationError::NonContiguousLevels { prev, next });
            }
        }
        Ok(())
    }

    /// Returns the ordered sub-run of configured levels from `from` down to
    /// `to`, inclusive.
    ///
    /// # Errors
    /// - `LevelNotInSchema` when either endpoint is not configured.
    /// - `InvertedRange` when `from` is deeper than `to`.
    pub fn levels_between(
        &self,
        from: AtomLevel,
        to: AtomLevel,
    ) -> Result<Vec<AtomLevel>, ConfigurationError> {
        let start = self
            .position(from)
            .ok_or(ConfigurationError::LevelNotInSchema(from))?;
        let end = self
            .position(to)
            .ok_or(ConfigurationError::LevelNotInSchema(to))?;
        if start > end {
            return Err(ConfigurationError::InvertedRange { from, to });
        }
        Ok(self.levels[start..=end].to_vec())
    }

    /// Shallowest configured level (the atomizer's default start level).
    pub fn first_level(&self) -> AtomLevel {
        self.levels[0]
    }

    /// Deepest configured level; atoms here are leaves.
    pub fn last_level(&self) -> AtomLevel {
        self.levels[self.levels.len() - 1]
    }

    pub fn contains(&self, level: AtomLevel) -> bool {
        self.position(level).is_some()
    }

    /// The configured level one step below `level`, if any.
    pub fn level_below(&self, level: AtomLevel) -> Option<AtomLevel> {
        let index = self.position(level)?;
        self.levels.get(index + 1).copied()
    }

    /// Human-readable hierarchy description, e.g.
    /// `theme → paragraph → sentence`.
    pub fn hierarchy_label(&self) -> String {
        self.levels
            .iter()
            .map(|level| level.label())
            .collect::<Vec<_>>()
            .join(" → ")
    }

    fn position(&self, level: AtomLevel) -> Option<usize> {
        self.levels.iter().position(|&candidate| candidate == level)
    }
}

impl Default for AtomizationSchema {
    /// The full five-level schema with legacy sequential naming.
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            levels: AtomLevel::ALL.to_vec(),
            naming: NamingConfig::default(),
            preamble: PreamblePolicy::default(),
        }
    }
}

/// Schema/level configuration errors. Fatal, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    EmptyLevels,
    UnorderedLevels { prev: AtomLevel, next: AtomLevel },
    NonContiguousLevels { prev: AtomLevel, next: AtomLevel },
    LevelNotInSchema(AtomLevel),
    InvertedRange { from: AtomLevel, to: AtomLevel },
    UnknownLevel(String),
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLevels => write!(f, "schema level list must not be empty"),
            Self::UnorderedLevels { prev, next } => {
                write!(f, "schema levels out of order: {prev} before {next}")
            }
            Self::NonContiguousLevels { prev, next } => {
                write!(f, "schema levels must be contiguous: {prev} cannot jump to {next}")
            }
            Self::LevelNotInSchema(level) => {
                write!(f, "level is not configured in this schema: {level}")
            }
            Self::InvertedRange { from, to } => {
                write!(f, "level range is inverted: {from} is deeper than {to}")
            }
            Self::UnknownLevel(value) => write!(f, "unknown atom level: {value}"),
        }
    }
}

impl Error for ConfigurationError {}
