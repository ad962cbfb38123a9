//! Core data types for scion module extraction.
//!
//! This crate defines the vocabulary shared by the extraction engine - the
//! 8-column fact row, OWL/RDF constants, and the module specification built
//! from caller input. These types are used by:
//! - `scion-store` for reading and writing statement tables
//! - `scion-hierarchy` for frontier reduction policies
//! - `scion-extract` for expansion and synthesis

mod error;
mod fact;
mod spec;
pub mod vocab;

pub use error::ConfigError;
pub use fact::{AnnotationMap, AnnotationValue, Fact, parse_annotation};
pub use spec::{Intermediates, ModuleSpec, RelatedDirective, SeedTerm};
