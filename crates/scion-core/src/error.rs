//! Configuration errors, raised before any store access.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A related-directive value outside ancestors/descendants/parents/children.
    #[error("unknown related directive '{0}'")]
    UnknownDirective(String),

    #[error("unknown intermediates option '{0}' (expected 'all' or 'none')")]
    UnknownIntermediates(String),

    #[error("module specification has no seed terms")]
    EmptySeeds,

    /// The output may not replace the statement table it reads from.
    #[error("output table {0:?} collides with the statement table")]
    OutputCollision(String),
}
