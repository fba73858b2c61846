//! Decomposition hierarchy levels.
//!
//! # Responsibility
//! - Define the fixed theme → paragraph → sentence → word → letter ordering.
//! - Expose the legacy ID prefix/width table used by sequential naming.
//!
//! # Invariants
//! - `AtomLevel::ALL` is the single source of truth for level ordering.
//! - Prefix characters are unique across levels.

use crate::model::schema::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One level of the text decomposition hierarchy.
///
/// The derive order matches the decomposition order, so `Ord` compares
/// shallow-to-deep (`Theme < Letter`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AtomLevel {
    Theme,
    Paragraph,
    Sentence,
    Word,
    Letter,
}

impl AtomLevel {
    /// All levels in decomposition order, shallowest first.
    pub const ALL: [AtomLevel; 5] = [
        AtomLevel::Theme,
        AtomLevel::Paragraph,
        AtomLevel::Sentence,
        AtomLevel::Word,
        AtomLevel::Letter,
    ];

    /// Zero-based position in the decomposition order.
    pub fn depth(self) -> usize {
        match self {
            Self::Theme => 0,
            Self::Paragraph => 1,
            Self::Sentence => 2,
            Self::Word => 3,
            Self::Letter => 4,
        }
    }

    /// The level one step deeper, or `None` at `Letter`.
    pub fn next(self) -> Option<AtomLevel> {
        Self::ALL.get(self.depth() + 1).copied()
    }

    /// Lowercase wire/display name (`theme`, `paragraph`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Self::Theme => "theme",
            Self::Paragraph => "paragraph",
            Self::Sentence => "sentence",
            Self::Word => "word",
            Self::Letter => "letter",
        }
    }

    /// Legacy sequential ID prefix (`T001`, `P0001`, ...).
    pub fn id_prefix(self) -> char {
        match self {
            Self::Theme => 'T',
            Self::Paragraph => 'P',
            Self::Sentence => 'S',
            Self::Word => 'W',
            Self::Letter => 'L',
        }
    }

    /// Legacy zero-padded counter width per level.
    pub fn id_width(self) -> usize {
        match self {
            Self::Theme => 3,
            Self::Paragraph => 4,
            Self::Sentence => 5,
            Self::Word => 6,
            Self::Letter => 8,
        }
    }
}

impl Display for AtomLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AtomLevel {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "theme" => Ok(Self::Theme),
            "paragraph" => Ok(Self::Paragraph),
            "sentence" => Ok(Self::Sentence),
            "word" => Ok(Self::Word),
            "letter" => Ok(Self::Letter),
            other => Err(ConfigurationError::UnknownLevel(other.to_string())),
        }
    }
}
