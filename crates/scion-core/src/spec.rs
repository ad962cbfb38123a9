//! Module specifications: what to extract and how.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::vocab::iao;

/// How a seed pulls related terms into the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedDirective {
    Ancestors,
    Descendants,
    Parents,
    Children,
}

impl RelatedDirective {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelatedDirective::Ancestors => "ancestors",
            RelatedDirective::Descendants => "descendants",
            RelatedDirective::Parents => "parents",
            RelatedDirective::Children => "children",
        }
    }
}

impl FromStr for RelatedDirective {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ancestors" => Ok(RelatedDirective::Ancestors),
            "descendants" => Ok(RelatedDirective::Descendants),
            "parents" => Ok(RelatedDirective::Parents),
            "children" => Ok(RelatedDirective::Children),
            _ => Err(ConfigError::UnknownDirective(s.trim().to_string())),
        }
    }
}

/// How much of an expanded ancestor/descendant chain is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intermediates {
    /// Every term between a seed and its frontier.
    #[default]
    All,
    /// Only the stopping points: nearest frontier ancestors, or leaf
    /// descendants.
    None,
}

impl Intermediates {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intermediates::All => "all",
            Intermediates::None => "none",
        }
    }
}

impl FromStr for Intermediates {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Intermediates::All),
            "none" => Ok(Intermediates::None),
            _ => Err(ConfigError::UnknownIntermediates(s.trim().to_string())),
        }
    }
}

/// One seed term's options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedTerm {
    /// Asserted in place of any computed parent when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedDirective>,
}

/// Everything one extraction run needs to know, built once from caller input
/// and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Seed ids or labels (the orchestrator resolves them) to their options.
    pub seeds: BTreeMap<String, SeedTerm>,
    /// Predicates to include; `None` means every non-structural predicate in
    /// the store.
    pub predicates: Option<Vec<String>>,
    pub intermediates: Intermediates,
    /// Assert no computed hierarchy edges. Override parents still apply.
    pub suppress_hierarchy: bool,
    /// (from, to) pairs: values of `from` are duplicated under `to`.
    pub copy_predicates: Vec<(String, String)>,
    /// Source ontology IRI each extracted term is stamped as imported from.
    pub imported_from: Option<String>,
    pub imported_from_predicate: String,
}

impl Default for ModuleSpec {
    fn default() -> Self {
        ModuleSpec {
            seeds: BTreeMap::new(),
            predicates: None,
            intermediates: Intermediates::default(),
            suppress_hierarchy: false,
            copy_predicates: Vec::new(),
            imported_from: None,
            imported_from_predicate: iao::IMPORTED_FROM.to_string(),
        }
    }
}

impl ModuleSpec {
    /// Spec with the given seeds and no per-term options.
    pub fn with_seeds<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let seeds = ids
            .into_iter()
            .map(|id| (id.into(), SeedTerm::default()))
            .collect();
        ModuleSpec {
            seeds,
            ..ModuleSpec::default()
        }
    }

    /// Directive and intermediates values are well formed by construction;
    /// the one thing left to check is that there is anything to extract.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.seeds.is_empty() {
            return Err(ConfigError::EmptySeeds);
        }
        Ok(())
    }
}
