//! SQLite access to LDTab statement tables.
//!
//! A [`StatementStore`] wraps one connection and one named statement table
//! and exposes the queries extraction needs: batched ancestor/descendant
//! closures, single-hop edges, id-or-label resolution, and fact reads and
//! writes. All reads are ordered so callers see deterministic results.

mod error;
mod store;

pub use error::StoreError;
pub use store::{quote_ident, statement_table_ddl, IdKind, StatementStore, MAX_SQL_VARS};
