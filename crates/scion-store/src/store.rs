//! The statement-table adapter.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rusqlite::{params, params_from_iter, Connection};

use scion_core::vocab::{datatype, owl, rdfs, CLASS_ROOT};
use scion_core::Fact;

use crate::StoreError;

/// SQLite's default host-parameter limit. Queries over caller-supplied id
/// lists are chunked to stay under it.
pub const MAX_SQL_VARS: usize = 999;

/// Quote an identifier for direct inclusion in SQL text.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// The 8-column LDTab schema, shared by statement and output tables.
pub fn statement_table_ddl(table: &str) -> String {
    format!(
        r#"CREATE TABLE {} (
  assertion INT NOT NULL,
  retraction INT NOT NULL DEFAULT 0,
  graph TEXT NOT NULL,
  subject TEXT NOT NULL,
  predicate TEXT NOT NULL,
  object TEXT NOT NULL,
  datatype TEXT NOT NULL,
  annotation TEXT
)"#,
        quote_ident(table)
    )
}

/// Which column an identifier is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Subject,
    Predicate,
}

impl IdKind {
    fn column(self) -> &'static str {
        match self {
            IdKind::Subject => "subject",
            IdKind::Predicate => "predicate",
        }
    }
}

/// One connection bound to one named statement table.
pub struct StatementStore {
    conn: Connection,
    table: String,
}

impl StatementStore {
    /// Open a database file.
    pub fn open<P: AsRef<Path>>(path: P, table: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self::new(Connection::open(path)?, table))
    }

    /// Open a fresh in-memory database.
    pub fn open_in_memory(table: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self::new(Connection::open_in_memory()?, table))
    }

    /// Wrap an existing connection.
    pub fn new(conn: Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Mutable connection access, for callers that run their own transaction.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Create the statement table this store is bound to.
    pub fn create_statement_table(&self) -> Result<(), StoreError> {
        self.conn.execute(&statement_table_ddl(&self.table), [])?;
        Ok(())
    }

    pub fn insert_fact(&self, fact: &Fact) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} (assertion, retraction, graph, subject, predicate, object, datatype, annotation) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            quote_ident(&self.table)
        );
        self.conn.execute(
            &sql,
            params![
                fact.assertion,
                fact.retraction,
                &fact.graph,
                &fact.subject,
                &fact.predicate,
                &fact.object,
                &fact.datatype,
                &fact.annotation,
            ],
        )?;
        Ok(())
    }

    /// Every hierarchy edge in the upward cone of `seeds`, as (child, parent)
    /// pairs in sorted order. One recursive query per chunk of seeds, never
    /// one per seed. `owl:Thing` parents are remapped to the class root so
    /// class and property hierarchies reduce uniformly.
    pub fn ancestors_of<'a, I>(&self, seeds: I) -> Result<Vec<(String, String)>, StoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seeds: Vec<&str> = seeds.into_iter().collect();
        let mut edges = BTreeSet::new();
        for chunk in seeds.chunks(MAX_SQL_VARS) {
            let sql = format!(
                "WITH RECURSIVE up(node) AS ( \
                   VALUES {rows} \
                   UNION \
                   SELECT s.object FROM {t} s JOIN up ON s.subject = up.node \
                   WHERE {edge} \
                 ) \
                 SELECT DISTINCT s.subject, s.object FROM {t} s \
                 WHERE s.subject IN (SELECT node FROM up) AND {edge}",
                rows = values_rows(chunk.len()),
                t = quote_ident(&self.table),
                edge = hierarchy_clause("s."),
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter().copied()))?;
            while let Some(row) = rows.next()? {
                let child: String = row.get(0)?;
                let mut parent: String = row.get(1)?;
                if parent == owl::THING {
                    parent = CLASS_ROOT.to_string();
                }
                edges.insert((child, parent));
            }
        }
        Ok(edges.into_iter().collect())
    }

    /// Every hierarchy edge in the downward cone of `seeds`, as
    /// (parent, child) pairs in sorted order. No sentinel remap downward.
    pub fn descendants_of<'a, I>(&self, seeds: I) -> Result<Vec<(String, String)>, StoreError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let seeds: Vec<&str> = seeds.into_iter().collect();
        let mut edges = BTreeSet::new();
        for chunk in seeds.chunks(MAX_SQL_VARS) {
            let sql = format!(
                "WITH RECURSIVE down(node) AS ( \
                   VALUES {rows} \
                   UNION \
                   SELECT s.subject FROM {t} s JOIN down ON s.object = down.node \
                   WHERE {edge} \
                 ) \
                 SELECT DISTINCT s.object, s.subject FROM {t} s \
                 WHERE s.object IN (SELECT node FROM down) AND {edge}",
                rows = values_rows(chunk.len()),
                t = quote_ident(&self.table),
                edge = hierarchy_clause("s."),
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter().copied()))?;
            while let Some(row) = rows.next()? {
                let parent: String = row.get(0)?;
                let child: String = row.get(1)?;
                edges.insert((parent, child));
            }
        }
        Ok(edges.into_iter().collect())
    }

    /// Direct children of one term, sorted.
    pub fn children_of(&self, term: &str) -> Result<Vec<String>, StoreError> {
        let sql = format!(
            "SELECT DISTINCT subject FROM {t} WHERE object = ?1 AND {edge} ORDER BY subject",
            t = quote_ident(&self.table),
            edge = hierarchy_clause(""),
        );
        self.single_column(&sql, term)
    }

    /// Direct parents of one term, sorted.
    pub fn parents_of(&self, term: &str) -> Result<Vec<String>, StoreError> {
        let sql = format!(
            "SELECT DISTINCT object FROM {t} WHERE subject = ?1 AND {edge} ORDER BY object",
            t = quote_ident(&self.table),
            edge = hierarchy_clause(""),
        );
        self.single_column(&sql, term)
    }

    /// Resolve ids-or-labels against one column, keeping the match list for
    /// each input at its input position. An input that is itself an id
    /// contributes itself first; `rdfs:label` matches follow in lexicographic
    /// order. An input with no matches keeps an empty list.
    pub fn resolve_map(
        &self,
        inputs: &[String],
        kind: IdKind,
    ) -> Result<Vec<(String, Vec<String>)>, StoreError> {
        let mut identity: BTreeSet<String> = BTreeSet::new();
        let mut by_label: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for chunk in inputs.chunks(MAX_SQL_VARS) {
            let marks = repeat_vars(chunk.len());
            let sql = format!(
                "SELECT DISTINCT {col} FROM {t} WHERE {col} IN ({marks})",
                col = kind.column(),
                t = quote_ident(&self.table),
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                identity.insert(row.get(0)?);
            }

            let sql = format!(
                "SELECT DISTINCT object, subject FROM {t} \
                 WHERE predicate = '{label}' AND object IN ({marks}) \
                 ORDER BY object, subject",
                t = quote_ident(&self.table),
                label = rdfs::LABEL,
            );
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter()))?;
            while let Some(row) = rows.next()? {
                let label: String = row.get(0)?;
                by_label.entry(label).or_default().push(row.get(1)?);
            }
        }

        let mut resolved = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut matches = Vec::new();
            if identity.contains(input) {
                matches.push(input.clone());
            }
            if let Some(subjects) = by_label.get(input) {
                for subject in subjects {
                    if !matches.contains(subject) {
                        matches.push(subject.clone());
                    }
                }
            }
            resolved.push((input.clone(), matches));
        }
        Ok(resolved)
    }

    /// Flattened [`resolve_map`](Self::resolve_map): input order preserved,
    /// duplicates removed keeping the first occurrence.
    pub fn resolve_ids(&self, inputs: &[String], kind: IdKind) -> Result<Vec<String>, StoreError> {
        let mut seen = BTreeSet::new();
        let mut ids = Vec::new();
        for (_, matches) in self.resolve_map(inputs, kind)? {
            for id in matches {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    /// Facts for the given subjects, optionally restricted to the given
    /// predicates, sorted by (subject, predicate, object, datatype).
    pub fn facts_filtered(
        &self,
        subjects: &[String],
        predicates: &[String],
    ) -> Result<Vec<Fact>, StoreError> {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }
        // Predicates ride along in every chunk statement.
        let room = MAX_SQL_VARS.saturating_sub(predicates.len()).max(1);
        let mut facts = Vec::new();
        for chunk in subjects.chunks(room) {
            let mut sql = format!(
                "SELECT assertion, retraction, graph, subject, predicate, object, datatype, annotation \
                 FROM {t} WHERE subject IN ({marks})",
                t = quote_ident(&self.table),
                marks = repeat_vars(chunk.len()),
            );
            if !predicates.is_empty() {
                sql.push_str(&format!(
                    " AND predicate IN ({})",
                    repeat_vars(predicates.len())
                ));
            }
            let mut stmt = self.conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(chunk.iter().chain(predicates.iter())))?;
            while let Some(row) = rows.next()? {
                facts.push(fact_from_row(row)?);
            }
        }
        // Chunks arrive independently; order once at the end.
        facts.sort_by(|a, b| {
            (&a.subject, &a.predicate, &a.object, &a.datatype)
                .cmp(&(&b.subject, &b.predicate, &b.object, &b.datatype))
        });
        Ok(facts)
    }

    /// Full contents of any 8-column table, in stored row order.
    pub fn facts_in(&self, table: &str) -> Result<Vec<Fact>, StoreError> {
        let sql = format!(
            "SELECT assertion, retraction, graph, subject, predicate, object, datatype, annotation \
             FROM {} ORDER BY rowid",
            quote_ident(table)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut facts = Vec::new();
        while let Some(row) = rows.next()? {
            facts.push(fact_from_row(row)?);
        }
        Ok(facts)
    }

    /// Drop extraction scratch tables if a previous run left them behind.
    pub fn drop_scratch(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch("DROP TABLE IF EXISTS tmp_terms; DROP TABLE IF EXISTS tmp_predicates;")?;
        Ok(())
    }

    fn single_column(&self, sql: &str, arg: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![arg])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get(0)?);
        }
        Ok(values)
    }
}

/// "?,?,?" for an IN list.
fn repeat_vars(count: usize) -> String {
    let mut s = String::with_capacity(count * 2);
    for i in 0..count {
        if i > 0 {
            s.push(',');
        }
        s.push('?');
    }
    s
}

/// "(?),(?),(?)" for seeding a recursive CTE.
fn values_rows(count: usize) -> String {
    let mut s = String::with_capacity(count * 4);
    for i in 0..count {
        if i > 0 {
            s.push(',');
        }
        s.push_str("(?)");
    }
    s
}

/// The one definition of a hierarchy edge, shared by closures and single-hop
/// queries. `prefix` is a table alias like "s." or empty.
fn hierarchy_clause(prefix: &str) -> String {
    format!(
        "{p}predicate IN ('{}','{}') AND {p}datatype = '{}'",
        rdfs::SUB_CLASS_OF,
        rdfs::SUB_PROPERTY_OF,
        datatype::IRI,
        p = prefix,
    )
}

fn fact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Fact> {
    Ok(Fact {
        assertion: row.get(0)?,
        retraction: row.get(1)?,
        graph: row.get(2)?,
        subject: row.get(3)?,
        predicate: row.get(4)?,
        object: row.get(5)?,
        datatype: row.get(6)?,
        annotation: row.get(7)?,
    })
}
