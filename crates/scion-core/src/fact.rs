//! The 8-column fact row and its annotation payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::vocab::datatype;

/// One row of a statement table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub assertion: i64,
    pub retraction: i64,
    pub graph: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub datatype: String,
    /// Reified qualifiers on this fact as a JSON mapping; extraction copies
    /// the string verbatim.
    pub annotation: Option<String>,
}

impl Fact {
    pub fn is_iri(&self) -> bool {
        self.datatype == datatype::IRI
    }

    pub fn is_json(&self) -> bool {
        self.datatype == datatype::JSON
    }

    /// True for language- or type-tagged literal values.
    pub fn is_literal(&self) -> bool {
        !self.is_iri() && !self.is_json()
    }
}

/// Annotation column contents: predicate to its ordered objects.
pub type AnnotationMap = BTreeMap<String, Vec<AnnotationValue>>;

/// One object under an annotation predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationValue {
    pub object: String,
    pub datatype: String,
    /// Further qualifiers; extraction never descends past the first level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<AnnotationMap>,
}

/// Parse an annotation column.
pub fn parse_annotation(raw: &str) -> Result<AnnotationMap, serde_json::Error> {
    serde_json::from_str(raw)
}
