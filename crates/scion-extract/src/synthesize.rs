//! Fact synthesis: fill the scratch relations, then emit the output table
//! rule by rule.
//!
//! Rule order is a contract. The instance-type rule decides "remaining"
//! child/parent pairs against the subclass and subproperty rows the two
//! rules before it already wrote, so reordering changes the output. Every
//! `INSERT ... SELECT` carries an `ORDER BY`, which makes stored row order a
//! pure function of the statement table and the module specification.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{params, Transaction};

use scion_core::vocab::{datatype, owl, rdf, rdfs};
use scion_store::{quote_ident, statement_table_ddl, StatementStore};

use crate::ExtractError;

/// Everything rule emission needs beyond the store itself.
pub(crate) struct SynthesisInput<'a> {
    pub output_table: &'a str,
    /// Term to asserted parents; every working-set term has an entry.
    pub parents: &'a BTreeMap<String, BTreeSet<String>>,
    /// Resolved predicate filter. `None` admits every non-structural
    /// predicate in the store; an empty list admits none.
    pub predicates: Option<&'a [String]>,
    pub copy_predicates: &'a [(String, String)],
    pub imported_from: Option<&'a str>,
    pub imported_from_predicate: &'a str,
}

/// Replace `output_table` with the synthesized module and return the rows
/// written. The drop of the previous output, the scratch fill, and all rules
/// run in one transaction, so a failure leaves the previous output intact.
/// The scratch tables are connection-scoped temporaries and are gone by
/// commit time.
pub(crate) fn synthesize(
    store: &mut StatementStore,
    input: &SynthesisInput<'_>,
) -> Result<usize, ExtractError> {
    let statement = quote_ident(store.table());
    let output = quote_ident(input.output_table);
    let tx = store.connection_mut().transaction()?;

    tx.execute_batch(&format!("DROP TABLE IF EXISTS {output}"))?;
    tx.execute(&statement_table_ddl(input.output_table), [])?;
    tx.execute_batch(
        "CREATE TEMP TABLE tmp_terms (child TEXT, parent TEXT); \
         CREATE TEMP TABLE tmp_predicates (predicate TEXT PRIMARY KEY NOT NULL);",
    )?;

    fill_terms(&tx, input.parents)?;
    fill_predicates(&tx, &statement, input.predicates)?;

    emit_type_declarations(&tx, &statement, &output)?;
    emit_hierarchy_edges(&tx, &statement, &output)?;
    emit_literal_facts(&tx, &statement, &output)?;
    emit_object_facts(&tx, &statement, &output)?;
    emit_annotation_iri_facts(&tx, &statement, &output)?;
    if let Some(iri) = input.imported_from {
        emit_imported_from(&tx, &output, input.imported_from_predicate, iri)?;
    }
    emit_predicate_copies(&tx, &statement, &output, input.copy_predicates)?;

    let rows: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {output}"), [], |row| {
        row.get(0)
    })?;
    tx.execute_batch("DROP TABLE tmp_terms; DROP TABLE tmp_predicates;")?;
    tx.commit()?;
    Ok(rows as usize)
}

fn fill_terms(
    tx: &Transaction<'_>,
    parents: &BTreeMap<String, BTreeSet<String>>,
) -> Result<(), ExtractError> {
    let mut insert = tx.prepare("INSERT INTO tmp_terms (child, parent) VALUES (?1, ?2)")?;
    for (term, assigned) in parents {
        // A NULL-parent row per term keeps parentless terms visible to the
        // term-scoped rules.
        insert.execute(params![term, Option::<&str>::None])?;
        for parent in assigned {
            insert.execute(params![term, parent])?;
        }
    }
    Ok(())
}

fn fill_predicates(
    tx: &Transaction<'_>,
    statement: &str,
    predicates: Option<&[String]>,
) -> Result<(), ExtractError> {
    match predicates {
        Some(ids) => {
            let mut insert =
                tx.prepare("INSERT OR IGNORE INTO tmp_predicates (predicate) VALUES (?1)")?;
            for id in ids {
                insert.execute(params![id])?;
            }
        }
        None => {
            let sql = format!(
                "INSERT INTO tmp_predicates (predicate) \
                 SELECT DISTINCT predicate FROM {statement} \
                 WHERE predicate NOT IN ('{}','{}','{}') \
                 ORDER BY predicate",
                rdfs::SUB_CLASS_OF,
                rdfs::SUB_PROPERTY_OF,
                rdf::TYPE,
            );
            tx.execute(&sql, [])?;
        }
    }
    Ok(())
}

/// Declared-type rows for working terms, copied whole, annotation included.
fn emit_type_declarations(
    tx: &Transaction<'_>,
    statement: &str,
    output: &str,
) -> Result<(), ExtractError> {
    let sql = format!(
        "INSERT INTO {output} \
         SELECT assertion, retraction, graph, subject, predicate, object, datatype, annotation \
         FROM {statement} \
         WHERE subject IN (SELECT DISTINCT child FROM tmp_terms) \
           AND predicate = '{ty}' \
           AND object IN ('{class}','{ann}','{data}','{object}','{individual}') \
         ORDER BY subject, object",
        ty = rdf::TYPE,
        class = owl::CLASS,
        ann = owl::ANNOTATION_PROPERTY,
        data = owl::DATA_PROPERTY,
        object = owl::OBJECT_PROPERTY,
        individual = owl::NAMED_INDIVIDUAL,
    );
    tx.execute(&sql, [])?;
    Ok(())
}

/// Child/parent pairs become subproperty, subclass, or instance-type edges,
/// decided by the child's declared type. Pairs the first two inserts leave
/// behind are instances, judged against the output rows just written.
fn emit_hierarchy_edges(
    tx: &Transaction<'_>,
    statement: &str,
    output: &str,
) -> Result<(), ExtractError> {
    let sql = format!(
        "INSERT INTO {output} (assertion, graph, subject, predicate, object, datatype) \
         SELECT DISTINCT 1, 'graph', child, '{subprop}', parent, '{iri}' \
         FROM tmp_terms \
         WHERE parent IS NOT NULL \
           AND child IN (SELECT subject FROM {statement} \
                         WHERE predicate = '{ty}' AND object IN ('{ann}','{data}','{object}')) \
         ORDER BY child, parent",
        subprop = rdfs::SUB_PROPERTY_OF,
        iri = datatype::IRI,
        ty = rdf::TYPE,
        ann = owl::ANNOTATION_PROPERTY,
        data = owl::DATA_PROPERTY,
        object = owl::OBJECT_PROPERTY,
    );
    tx.execute(&sql, [])?;

    let sql = format!(
        "INSERT INTO {output} (assertion, graph, subject, predicate, object, datatype) \
         SELECT DISTINCT 1, 'graph', child, '{subclass}', parent, '{iri}' \
         FROM tmp_terms \
         WHERE parent IS NOT NULL \
           AND child IN (SELECT subject FROM {statement} \
                         WHERE predicate = '{ty}' AND object = '{class}') \
         ORDER BY child, parent",
        subclass = rdfs::SUB_CLASS_OF,
        iri = datatype::IRI,
        ty = rdf::TYPE,
        class = owl::CLASS,
    );
    tx.execute(&sql, [])?;

    let sql = format!(
        "INSERT INTO {output} (assertion, graph, subject, predicate, object, datatype) \
         SELECT DISTINCT 1, 'graph', child, '{ty}', parent, '{iri}' \
         FROM tmp_terms \
         WHERE parent IS NOT NULL \
           AND child NOT IN (SELECT subject FROM {output} \
                             WHERE predicate IN ('{subclass}','{subprop}')) \
         ORDER BY child, parent",
        ty = rdf::TYPE,
        iri = datatype::IRI,
        subclass = rdfs::SUB_CLASS_OF,
        subprop = rdfs::SUB_PROPERTY_OF,
    );
    tx.execute(&sql, [])?;
    Ok(())
}

/// Literal-valued facts on filtered predicates, copied whole.
fn emit_literal_facts(
    tx: &Transaction<'_>,
    statement: &str,
    output: &str,
) -> Result<(), ExtractError> {
    let sql = format!(
        "INSERT INTO {output} \
         SELECT assertion, retraction, graph, subject, predicate, object, datatype, annotation \
         FROM {statement} \
         WHERE subject IN (SELECT DISTINCT child FROM tmp_terms) \
           AND predicate IN (SELECT predicate FROM tmp_predicates) \
           AND object IS NOT NULL \
           AND datatype NOT IN ('{iri}','{json}') \
         ORDER BY subject, predicate, object",
        iri = datatype::IRI,
        json = datatype::JSON,
    );
    tx.execute(&sql, [])?;
    Ok(())
}

/// Facts whose object is itself a working term, copied whole. Relationships
/// pointing outside the module stay out.
fn emit_object_facts(
    tx: &Transaction<'_>,
    statement: &str,
    output: &str,
) -> Result<(), ExtractError> {
    let sql = format!(
        "INSERT INTO {output} \
         SELECT assertion, retraction, graph, subject, predicate, object, datatype, annotation \
         FROM {statement} \
         WHERE subject IN (SELECT DISTINCT child FROM tmp_terms) \
           AND predicate IN (SELECT predicate FROM tmp_predicates) \
           AND object IN (SELECT DISTINCT child FROM tmp_terms) \
         ORDER BY subject, predicate, object"
    );
    tx.execute(&sql, [])?;
    Ok(())
}

/// IRI-valued facts on predicates declared as annotation properties. The
/// object need not be a working term; annotations reference, they do not
/// include.
fn emit_annotation_iri_facts(
    tx: &Transaction<'_>,
    statement: &str,
    output: &str,
) -> Result<(), ExtractError> {
    let sql = format!(
        "INSERT INTO {output} (assertion, graph, subject, predicate, object, datatype) \
         SELECT 1, 'graph', s1.subject, s1.predicate, s1.object, '{iri}' \
         FROM {statement} s1 JOIN {statement} s2 ON s1.predicate = s2.subject \
         WHERE s1.subject IN (SELECT DISTINCT child FROM tmp_terms) \
           AND s1.predicate IN (SELECT predicate FROM tmp_predicates) \
           AND s2.predicate = '{ty}' \
           AND s2.object = '{ann}' \
           AND s1.datatype = '{iri}' \
         ORDER BY s1.subject, s1.predicate, s1.object",
        iri = datatype::IRI,
        ty = rdf::TYPE,
        ann = owl::ANNOTATION_PROPERTY,
    );
    tx.execute(&sql, [])?;
    Ok(())
}

/// Stamp every working term with the ontology it came from. The IRI is
/// angle-wrapped on output.
fn emit_imported_from(
    tx: &Transaction<'_>,
    output: &str,
    predicate: &str,
    iri: &str,
) -> Result<(), ExtractError> {
    let sql = format!(
        "INSERT INTO {output} (assertion, graph, subject, predicate, object, datatype) \
         SELECT DISTINCT 1, 'graph', child, ?1, ?2, '{dt}' \
         FROM tmp_terms \
         ORDER BY child",
        dt = datatype::IRI,
    );
    tx.execute(&sql, params![predicate, format!("<{iri}>")])?;
    Ok(())
}

/// Duplicate every fact on `from` under predicate `to` for working-set
/// subjects, keeping source assertion and graph. `from` does not need to
/// pass the predicate filter.
fn emit_predicate_copies(
    tx: &Transaction<'_>,
    statement: &str,
    output: &str,
    pairs: &[(String, String)],
) -> Result<(), ExtractError> {
    if pairs.is_empty() {
        return Ok(());
    }
    let sql = format!(
        "INSERT INTO {output} (assertion, graph, subject, predicate, object, datatype) \
         SELECT assertion, graph, subject, ?1, object, datatype \
         FROM {statement} \
         WHERE subject IN (SELECT DISTINCT child FROM tmp_terms) \
           AND predicate = ?2 \
         ORDER BY subject, object"
    );
    let mut copy = tx.prepare(&sql)?;
    for (from, to) in pairs {
        copy.execute(params![to, from])?;
    }
    Ok(())
}
