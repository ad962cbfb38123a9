//! Input files: term lists, import specs, and per-source configs.
//!
//! Import specs and configs are delimited files with a header row; the
//! delimiter comes from the file extension (`.csv` is comma, anything else
//! tab). Term lists are plain text, one id or label per line, with `#`
//! comments.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use scion_core::{ConfigError, Intermediates, RelatedDirective, SeedTerm};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("source {name:?} does not exist in config file {}", path.display())]
    UnknownSource { name: String, path: PathBuf },
    #[error("a --source is required when using the --config option")]
    SourceRequired,
    #[error("one or more terms must be specified with --term, --terms, or --imports")]
    NoTerms,
}

/// Read ids or labels from a term-list file, dropping comments and blanks.
pub fn read_term_list(path: &Path) -> Result<Vec<String>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|err| InputError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    let mut terms = Vec::new();
    for line in text.lines() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let term = strip_trailing_comment(line).trim();
        if !term.is_empty() {
            terms.push(term.to_string());
        }
    }
    Ok(terms)
}

/// A comment starts at a `#` preceded by whitespace.
fn strip_trailing_comment(line: &str) -> &str {
    let mut prev_is_space = false;
    for (idx, ch) in line.char_indices() {
        if ch == '#' && prev_is_space {
            return &line[..idx];
        }
        prev_is_space = ch.is_whitespace();
    }
    line
}

#[derive(Deserialize)]
struct ImportRow {
    #[serde(rename = "ID")]
    id: Option<String>,
    #[serde(rename = "Parent ID")]
    parent: Option<String>,
    #[serde(rename = "Related")]
    related: Option<String>,
    #[serde(rename = "Source")]
    source: Option<String>,
}

/// Read seed terms from an import spec.
///
/// Rows with an empty ID are skipped. With a `source` filter, rows whose
/// Source column differs (or is missing) are skipped too.
pub fn read_imports(
    path: &Path,
    source: Option<&str>,
) -> Result<BTreeMap<String, SeedTerm>, InputError> {
    let mut reader = open_delimited(path)?;
    let mut seeds = BTreeMap::new();
    for row in reader.deserialize() {
        let row: ImportRow = row.map_err(|err| InputError::Parse {
            path: path.to_path_buf(),
            source: err,
        })?;
        let Some(id) = row.id else { continue };
        if let Some(filter) = source {
            if row.source.as_deref() != Some(filter) {
                continue;
            }
        }
        let related: Option<RelatedDirective> =
            row.related.as_deref().map(str::parse).transpose()?;
        seeds.insert(
            id,
            SeedTerm {
                parent: row.parent,
                related,
            },
        );
    }
    Ok(seeds)
}

/// Defaults supplied by the config row for one source.
#[derive(Debug)]
pub struct SourceDefaults {
    pub intermediates: Intermediates,
    pub imported_from: Option<String>,
    /// Space-separated Predicates column, split.
    pub predicates: Vec<String>,
}

#[derive(Deserialize)]
struct ConfigRow {
    #[serde(rename = "Source")]
    source: Option<String>,
    #[serde(rename = "Intermediates")]
    intermediates: Option<String>,
    #[serde(rename = "Predicates")]
    predicates: Option<String>,
    #[serde(rename = "IRI")]
    iri: Option<String>,
}

/// Find the config row for `source` and return its defaults.
pub fn read_source_config(path: &Path, source: &str) -> Result<SourceDefaults, InputError> {
    let mut reader = open_delimited(path)?;
    for row in reader.deserialize() {
        let row: ConfigRow = row.map_err(|err| InputError::Parse {
            path: path.to_path_buf(),
            source: err,
        })?;
        if row.source.as_deref() != Some(source) {
            continue;
        }
        let intermediates = row
            .intermediates
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or_default();
        let predicates = row
            .predicates
            .map(|list| list.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        return Ok(SourceDefaults {
            intermediates,
            imported_from: row.iri,
            predicates,
        });
    }
    Err(InputError::UnknownSource {
        name: source.to_string(),
        path: path.to_path_buf(),
    })
}

fn open_delimited(path: &Path) -> Result<csv::Reader<File>, InputError> {
    let delimiter = if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    {
        b','
    } else {
        b'\t'
    };
    let file = File::open(path).map_err(|err| InputError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    // Short rows read as missing optional cells, like a hand-edited TSV.
    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file))
}
