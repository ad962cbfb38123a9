//! The extraction orchestrator.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use scion_core::{ConfigError, ModuleSpec, RelatedDirective, SeedTerm};
use scion_hierarchy::AdjacencyMap;
use scion_store::{IdKind, StatementStore};

use crate::synthesize::{synthesize, SynthesisInput};
use crate::{expand, parents, ExtractError};

/// What one run produced, for the caller's summary output.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub output_table: String,
    /// Seeds that resolved; dropped inputs are not counted.
    pub seed_count: usize,
    /// Working-set size after expansion.
    pub term_count: usize,
    pub parent_edges: usize,
    pub facts_written: usize,
}

/// Orchestrator progression, logged at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    ResolvingSeeds,
    ExpandingRelated,
    AssigningParents,
    SynthesizingStatements,
    Done,
    CleaningUp,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::ResolvingSeeds => "resolving-seeds",
            Phase::ExpandingRelated => "expanding-related",
            Phase::AssigningParents => "assigning-parents",
            Phase::SynthesizingStatements => "synthesizing-statements",
            Phase::Done => "done",
            Phase::CleaningUp => "cleaning-up",
        })
    }
}

fn transition(phase: &mut Phase, next: Phase) {
    debug!(from = %phase, to = %next, "extract phase");
    *phase = next;
}

/// Extract a module from `store` into `output_table` per `spec`.
///
/// Any previous table under `output_table` is replaced atomically; on
/// failure it survives untouched and transient working state is cleaned up
/// before the error is returned.
pub fn extract(
    store: &mut StatementStore,
    output_table: &str,
    spec: &ModuleSpec,
) -> Result<ExtractReport, ExtractError> {
    spec.validate()?;
    if output_table == store.table() {
        return Err(ConfigError::OutputCollision(output_table.to_string()).into());
    }
    let mut phase = Phase::Idle;
    let result = run(store, output_table, spec, &mut phase);
    // Terminal on every path. Synthesis drops its own temporaries before
    // committing, so on success this is a no-op sweep.
    transition(&mut phase, Phase::CleaningUp);
    if let Err(scratch) = store.drop_scratch() {
        warn!(error = %scratch, "scratch cleanup after extraction also failed");
    }
    result
}

fn run(
    store: &mut StatementStore,
    output_table: &str,
    spec: &ModuleSpec,
    phase: &mut Phase,
) -> Result<ExtractReport, ExtractError> {
    transition(phase, Phase::ResolvingSeeds);
    let seeds = resolve_seeds(store, spec)?;
    let seed_ids: BTreeSet<String> = seeds.keys().cloned().collect();
    debug!(count = seeds.len(), "resolved seed terms");

    transition(phase, Phase::ExpandingRelated);
    let mut working = seed_ids.clone();
    working.extend(expand::downward_expansion(
        store,
        &seeds,
        spec.intermediates,
    )?);
    // One upward pass serves both ancestor expansion and parent assignment.
    // The closure is seeded after the downward merge, so every term that can
    // still join the working set lies inside its cone.
    let need_upward = !spec.suppress_hierarchy
        || seeds
            .values()
            .any(|details| details.related == Some(RelatedDirective::Ancestors));
    let closure: AdjacencyMap = if need_upward {
        store
            .ancestors_of(working.iter().map(String::as_str))?
            .into_iter()
            .collect()
    } else {
        AdjacencyMap::new()
    };
    working.extend(expand::upward_expansion(
        &closure,
        &seeds,
        &seed_ids,
        spec.intermediates,
    ));
    debug!(terms = working.len(), "expanded working set");

    transition(phase, Phase::AssigningParents);
    let assigned = parents::assign_parents(&working, &seeds, &closure, spec.suppress_hierarchy);
    let parent_edges: usize = assigned.values().map(BTreeSet::len).sum();
    debug!(edges = parent_edges, "assigned parents");

    transition(phase, Phase::SynthesizingStatements);
    let predicates = resolve_predicates(store, spec)?;
    // A crashed run on this connection may have left scratch behind.
    store.drop_scratch()?;
    let facts_written = synthesize(
        store,
        &SynthesisInput {
            output_table,
            parents: &assigned,
            predicates: predicates.as_deref(),
            copy_predicates: &spec.copy_predicates,
            imported_from: spec.imported_from.as_deref(),
            imported_from_predicate: &spec.imported_from_predicate,
        },
    )?;
    debug!(
        rows = facts_written,
        table = output_table,
        "synthesized output table"
    );

    transition(phase, Phase::Done);
    Ok(ExtractReport {
        output_table: output_table.to_string(),
        seed_count: seeds.len(),
        term_count: working.len(),
        parent_edges,
        facts_written,
    })
}

/// Resolve seed ids-or-labels, carrying each seed's options over to every id
/// it resolves to. Unresolved seeds drop with a warning; an entirely
/// unresolved seed set is fatal.
fn resolve_seeds(
    store: &StatementStore,
    spec: &ModuleSpec,
) -> Result<BTreeMap<String, SeedTerm>, ExtractError> {
    let inputs: Vec<String> = spec.seeds.keys().cloned().collect();
    let mut seeds: BTreeMap<String, SeedTerm> = BTreeMap::new();
    for (input, matches) in store.resolve_map(&inputs, IdKind::Subject)? {
        if matches.is_empty() {
            warn!(term = %input, "seed does not resolve to any known term, dropping");
            continue;
        }
        let details = &spec.seeds[&input];
        for id in matches {
            seeds.entry(id).or_insert_with(|| details.clone());
        }
    }
    if seeds.is_empty() {
        return Err(ExtractError::Lookup {
            attempted: inputs.len(),
        });
    }
    Ok(seeds)
}

/// Resolve the predicate filter, if one was given. Unresolved entries drop
/// with a warning; the filter itself stays in force even when it ends up
/// empty.
fn resolve_predicates(
    store: &StatementStore,
    spec: &ModuleSpec,
) -> Result<Option<Vec<String>>, ExtractError> {
    let Some(inputs) = &spec.predicates else {
        return Ok(None);
    };
    let mut ids = Vec::new();
    let mut seen = BTreeSet::new();
    for (input, matches) in store.resolve_map(inputs, IdKind::Predicate)? {
        if matches.is_empty() {
            warn!(predicate = %input, "predicate does not resolve, dropping");
            continue;
        }
        for id in matches {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }
    Ok(Some(ids))
}
