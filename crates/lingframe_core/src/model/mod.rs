//! Ontology: the data model every other component is written against.

pub mod atom;
pub mod corpus;
pub mod document;
pub mod domain;
pub mod level;
pub mod output;
pub mod schema;

pub use atom::{AncestorRefs, Atom};
pub use corpus::{AtomIter, Corpus};
pub use document::Document;
pub use domain::{DomainLexicon, DomainProfile, EntityPattern, EntityPatternSet};
pub use level::AtomLevel;
pub use output::AnalysisOutput;
pub use schema::{AtomizationSchema, ConfigurationError, PreamblePolicy};
