use thiserror::Error;

/// Failure while querying or writing a statement table.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
