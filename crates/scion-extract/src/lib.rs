//! Ontology module extraction over LDTab statement tables.
//!
//! Feed [`extract`] a [`StatementStore`](scion_store::StatementStore) and a
//! [`ModuleSpec`](scion_core::ModuleSpec). The run resolves the seed terms,
//! pulls in related terms per their directives, assigns every term its
//! nearest parents inside the module, and synthesizes a self-contained fact
//! table under the requested name, replacing any previous table of that name
//! in one transaction.

mod expand;
mod parents;
mod run;
mod synthesize;

pub use run::{extract, ExtractReport};

use thiserror::Error;

use scion_core::ConfigError;
use scion_store::StoreError;

/// Failure modes of one extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every seed failed to resolve, so there is nothing to extract.
    /// Partially unresolved seed sets are not an error; the stragglers are
    /// dropped with a warning.
    #[error("none of the {attempted} seed terms resolve against the statement table")]
    Lookup { attempted: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for ExtractError {
    fn from(err: rusqlite::Error) -> Self {
        ExtractError::Store(StoreError::from(err))
    }
}
