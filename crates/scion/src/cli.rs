//! Command-line surface: flag parsing and the extract command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use scion_core::{Intermediates, ModuleSpec, RelatedDirective, SeedTerm};
use scion_extract::extract;
use scion_store::StatementStore;

use crate::inputs::{self, InputError};

#[derive(Parser)]
#[command(name = "scion", version, about = "Extract reusable ontology modules from LDTab statement tables")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract seed terms and their hierarchy into a new table
    Extract(ExtractArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// SQLite database file holding the statement table
    #[arg(short, long)]
    database: PathBuf,

    /// Name for the extracted module table
    #[arg(short, long, default_value = "extract")]
    extract_table: String,

    /// Name of the statement table to extract from
    #[arg(short = 'S', long, default_value = "statement")]
    statement: String,

    /// Id or label of a term to extract (repeatable)
    #[arg(short, long)]
    term: Vec<String>,

    /// File of term ids or labels, one per line
    #[arg(short = 'T', long)]
    terms: Option<PathBuf>,

    /// Id or label of a predicate to include (repeatable)
    #[arg(short, long)]
    predicate: Vec<String>,

    /// File of predicate ids or labels, one per line
    #[arg(short = 'P', long)]
    predicates: Option<PathBuf>,

    /// Copy the values of one predicate to another: --copy <FROM> <TO>
    #[arg(short = 'C', long = "copy", num_args = 2, value_names = ["FROM", "TO"])]
    copy: Vec<String>,

    /// TSV or CSV file of import rows: ID, Parent ID, Related, Source
    #[arg(short, long)]
    imports: Option<PathBuf>,

    /// TSV or CSV file of per-source defaults, selected by --source
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source name: filters --imports rows and selects the --config row
    #[arg(short, long)]
    source: Option<String>,

    /// Ancestor/descendant intermediates to keep (all or none)
    #[arg(short = 'I', long, default_value = "all")]
    intermediates: String,

    /// IRI of the ontology the extracted terms are imported from
    #[arg(short = 'm', long)]
    imported_from: Option<String>,

    /// Predicate used for the imported-from annotation
    #[arg(short = 'M', long, default_value = "IAO:0000412")]
    imported_from_property: String,

    /// Do not assert computed hierarchy edges
    #[arg(short, long)]
    no_hierarchy: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    pub fn run(self) -> i32 {
        match self.command {
            Command::Extract(args) => cmd_extract(args),
        }
    }
}

/// Run an extraction against the database named on the command line.
fn cmd_extract(args: ExtractArgs) -> i32 {
    let spec = match build_spec(&args) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };
    let mut store = match StatementStore::open(&args.database, args.statement.as_str()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("cannot open {}: {e}", args.database.display());
            return 1;
        }
    };
    match extract(&mut store, &args.extract_table, &spec) {
        Ok(report) => {
            if args.json {
                if let Ok(json) = serde_json::to_string_pretty(&report) {
                    println!("{json}");
                }
            } else {
                println!(
                    "{}: {} facts for {} terms ({} seeds)",
                    report.output_table, report.facts_written, report.term_count, report.seed_count
                );
            }
            0
        }
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}

/// Fold flags and input files into one module spec.
///
/// Seeds given with `-t`/`-T` default to the ancestors directive (unless
/// `--no-hierarchy`) and take precedence over imports-file rows for the same
/// id. A `--config` row replaces `-I` and `-m` outright and appends its
/// predicate list to the CLI one.
fn build_spec(args: &ExtractArgs) -> Result<ModuleSpec, InputError> {
    let mut terms = args.term.clone();
    if let Some(path) = &args.terms {
        terms.extend(inputs::read_term_list(path)?);
    }

    let mut seeds = match &args.imports {
        Some(path) => inputs::read_imports(path, args.source.as_deref())?,
        None => BTreeMap::new(),
    };
    if terms.is_empty() && seeds.is_empty() {
        return Err(InputError::NoTerms);
    }
    for term in terms {
        let related = if args.no_hierarchy {
            None
        } else {
            Some(RelatedDirective::Ancestors)
        };
        seeds.insert(term, SeedTerm { parent: None, related });
    }

    let mut predicates = args.predicate.clone();
    if let Some(path) = &args.predicates {
        predicates.extend(inputs::read_term_list(path)?);
    }

    let mut intermediates: Intermediates = args.intermediates.parse()?;
    let mut imported_from = args.imported_from.clone();

    if let Some(config) = &args.config {
        let source = args.source.as_deref().ok_or(InputError::SourceRequired)?;
        let defaults = inputs::read_source_config(config, source)?;
        intermediates = defaults.intermediates;
        imported_from = defaults.imported_from;
        predicates.extend(defaults.predicates);
    }

    Ok(ModuleSpec {
        seeds,
        predicates: if predicates.is_empty() { None } else { Some(predicates) },
        intermediates,
        suppress_hierarchy: args.no_hierarchy,
        copy_predicates: copy_pairs(&args.copy),
        imported_from,
        imported_from_predicate: args.imported_from_property.clone(),
    })
}

/// clap hands `--copy a b --copy c d` over as one flat list.
fn copy_pairs(flat: &[String]) -> Vec<(String, String)> {
    flat.chunks_exact(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect()
}
