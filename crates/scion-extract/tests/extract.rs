//! End-to-end extraction runs against an in-memory statement table.
//!
//! The fixture is a small OBI-shaped ontology: a BFO class chain down to
//! phosphate buffered saline and specimen, a couple of annotation and object
//! properties, one individual, and a deliberate subclass cycle.

use std::collections::BTreeSet;

use scion_core::{ConfigError, Fact, Intermediates, ModuleSpec, RelatedDirective, SeedTerm};
use scion_extract::{extract, ExtractError};
use scion_store::StatementStore;

fn fact(subject: &str, predicate: &str, object: &str, datatype: &str) -> Fact {
    Fact {
        assertion: 1,
        retraction: 0,
        graph: "graph".to_string(),
        subject: subject.to_string(),
        predicate: predicate.to_string(),
        object: object.to_string(),
        datatype: datatype.to_string(),
        annotation: None,
    }
}

fn insert(store: &StatementStore, subject: &str, predicate: &str, object: &str, datatype: &str) {
    store
        .insert_fact(&fact(subject, predicate, object, datatype))
        .unwrap();
}

fn class(store: &StatementStore, id: &str, label: &str, parent: &str) {
    insert(store, id, "rdf:type", "owl:Class", "_IRI");
    insert(store, id, "rdfs:label", label, "xsd:string");
    insert(store, id, "rdfs:subClassOf", parent, "_IRI");
}

fn fixture() -> StatementStore {
    let store = StatementStore::open_in_memory("statement").unwrap();
    store.create_statement_table().unwrap();

    insert(&store, "owl:Thing", "rdf:type", "owl:Class", "_IRI");

    class(&store, "BFO:0000001", "entity", "owl:Thing");
    class(&store, "BFO:0000002", "continuant", "BFO:0000001");
    class(&store, "BFO:0000004", "independent continuant", "BFO:0000002");
    class(&store, "BFO:0000040", "material entity", "BFO:0000004");
    class(&store, "OBI:0100046", "phosphate buffered saline", "BFO:0000040");
    class(&store, "OBI:0000666", "specimen", "BFO:0000040");

    insert(&store, "IAO:0000115", "rdf:type", "owl:AnnotationProperty", "_IRI");
    insert(&store, "IAO:0000115", "rdfs:label", "definition", "xsd:string");
    insert(&store, "oio:inSubset", "rdf:type", "owl:AnnotationProperty", "_IRI");

    insert(&store, "RO:0000057", "rdf:type", "owl:ObjectProperty", "_IRI");
    insert(&store, "RO:0000057", "rdfs:label", "has participant", "xsd:string");
    insert(&store, "OBI:0000293", "rdf:type", "owl:ObjectProperty", "_IRI");
    insert(&store, "OBI:0000293", "rdfs:label", "has_specified_input", "xsd:string");
    insert(&store, "OBI:0000293", "rdfs:subPropertyOf", "RO:0000057", "_IRI");

    insert(&store, "ex:sample1", "rdf:type", "owl:NamedIndividual", "_IRI");
    insert(&store, "ex:sample1", "rdfs:label", "sample 1", "xsd:string");
    insert(&store, "ex:sample1", "RO:0000057", "OBI:0100046", "_IRI");

    store
        .insert_fact(&Fact {
            annotation: Some(
                r#"{"IAO:0000119":[{"object":"OBI","datatype":"xsd:string"}]}"#.to_string(),
            ),
            ..fact(
                "OBI:0100046",
                "IAO:0000115",
                "A solution of phosphate buffer and sodium chloride.",
                "xsd:string",
            )
        })
        .unwrap();
    insert(
        &store,
        "OBI:0100046",
        "rdfs:comment",
        "used as a rinse solution",
        "xsd:string",
    );
    insert(&store, "OBI:0100046", "oio:inSubset", "obi:subset_vaccine", "_IRI");

    insert(&store, "CYC:A", "rdf:type", "owl:Class", "_IRI");
    insert(&store, "CYC:B", "rdf:type", "owl:Class", "_IRI");
    insert(&store, "CYC:A", "rdfs:subClassOf", "CYC:B", "_IRI");
    insert(&store, "CYC:B", "rdfs:subClassOf", "CYC:A", "_IRI");

    store
}

fn seed(related: Option<RelatedDirective>, parent: Option<&str>) -> SeedTerm {
    SeedTerm {
        parent: parent.map(str::to_string),
        related,
    }
}

fn spec_with(seeds: &[(&str, SeedTerm)]) -> ModuleSpec {
    let mut spec = ModuleSpec::default();
    for (id, details) in seeds {
        spec.seeds.insert(id.to_string(), details.clone());
    }
    spec
}

fn labels_only(seeds: &[(&str, SeedTerm)]) -> ModuleSpec {
    let mut spec = spec_with(seeds);
    spec.predicates = Some(vec!["rdfs:label".to_string()]);
    spec
}

fn rows(store: &StatementStore) -> Vec<Fact> {
    store.facts_in("extract").unwrap()
}

fn has_row(facts: &[Fact], subject: &str, predicate: &str, object: &str) -> bool {
    facts
        .iter()
        .any(|f| f.subject == subject && f.predicate == predicate && f.object == object)
}

fn count_rows(facts: &[Fact], subject: &str, predicate: &str) -> usize {
    facts
        .iter()
        .filter(|f| f.subject == subject && f.predicate == predicate)
        .count()
}

fn subjects(facts: &[Fact]) -> BTreeSet<String> {
    facts.iter().map(|f| f.subject.clone()).collect()
}

#[test]
fn suppressed_hierarchy_keeps_types_and_requested_literals() {
    let mut store = fixture();
    let mut spec = labels_only(&[
        ("OBI:0100046", seed(None, None)),
        ("BFO:0000040", seed(None, None)),
    ]);
    spec.suppress_hierarchy = true;

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.seed_count, 2);
    assert_eq!(report.term_count, 2);
    assert_eq!(report.parent_edges, 0);
    assert_eq!(report.facts_written, facts.len());
    assert_eq!(facts.len(), 4);
    assert!(has_row(&facts, "OBI:0100046", "rdf:type", "owl:Class"));
    assert!(has_row(&facts, "BFO:0000040", "rdf:type", "owl:Class"));
    assert!(has_row(&facts, "OBI:0100046", "rdfs:label", "phosphate buffered saline"));
    assert!(has_row(&facts, "BFO:0000040", "rdfs:label", "material entity"));
    assert!(!facts.iter().any(|f| f.predicate == "rdfs:subClassOf"));
}

#[test]
fn ancestors_with_intermediates_build_the_full_lineage() {
    let mut store = fixture();
    let spec = labels_only(&[("OBI:0100046", seed(Some(RelatedDirective::Ancestors), None))]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.seed_count, 1);
    assert_eq!(report.term_count, 5);
    assert_eq!(report.parent_edges, 4);
    assert!(has_row(&facts, "OBI:0100046", "rdfs:subClassOf", "BFO:0000040"));
    assert!(has_row(&facts, "BFO:0000040", "rdfs:subClassOf", "BFO:0000004"));
    assert!(has_row(&facts, "BFO:0000004", "rdfs:subClassOf", "BFO:0000002"));
    assert!(has_row(&facts, "BFO:0000002", "rdfs:subClassOf", "BFO:0000001"));
    // The chain stops below the universal root: no edge for entity, and the
    // root itself never joins the module.
    assert_eq!(count_rows(&facts, "BFO:0000001", "rdfs:subClassOf"), 0);
    assert!(!subjects(&facts).contains("owl:Thing"));
    // Every pulled-in ancestor is declared, not just referenced.
    for term in ["BFO:0000001", "BFO:0000002", "BFO:0000004", "BFO:0000040"] {
        assert!(has_row(&facts, term, "rdf:type", "owl:Class"));
    }
}

#[test]
fn ancestors_without_intermediates_jump_to_the_top() {
    let mut store = fixture();
    let mut spec = labels_only(&[
        ("OBI:0100046", seed(Some(RelatedDirective::Ancestors), None)),
        ("OBI:0000666", seed(Some(RelatedDirective::Ancestors), None)),
    ]);
    spec.intermediates = Intermediates::None;

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.term_count, 3);
    assert!(has_row(&facts, "OBI:0100046", "rdfs:subClassOf", "BFO:0000001"));
    assert!(has_row(&facts, "OBI:0000666", "rdfs:subClassOf", "BFO:0000001"));
    let included = subjects(&facts);
    assert!(!included.contains("BFO:0000040"));
    assert!(!included.contains("BFO:0000004"));
    assert!(!included.contains("BFO:0000002"));
}

#[test]
fn another_seed_on_the_lineage_stops_the_climb() {
    let mut store = fixture();
    let mut spec = labels_only(&[
        ("OBI:0100046", seed(Some(RelatedDirective::Ancestors), None)),
        ("BFO:0000040", seed(None, None)),
    ]);
    spec.intermediates = Intermediates::None;

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(count_rows(&facts, "OBI:0100046", "rdfs:subClassOf"), 1);
    assert!(has_row(&facts, "OBI:0100046", "rdfs:subClassOf", "BFO:0000040"));
    // The plain seed's own top ancestor lies outside the module.
    assert_eq!(count_rows(&facts, "BFO:0000040", "rdfs:subClassOf"), 0);
}

#[test]
fn children_directive_adds_one_hop_down() {
    let mut store = fixture();
    let spec = labels_only(&[("BFO:0000002", seed(Some(RelatedDirective::Children), None))]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.term_count, 2);
    assert!(has_row(&facts, "BFO:0000004", "rdfs:subClassOf", "BFO:0000002"));
    assert!(!subjects(&facts).contains("BFO:0000040"));
}

#[test]
fn parents_directive_adds_one_hop_up() {
    let mut store = fixture();
    let spec = labels_only(&[("OBI:0100046", seed(Some(RelatedDirective::Parents), None))]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.term_count, 2);
    assert!(has_row(&facts, "OBI:0100046", "rdfs:subClassOf", "BFO:0000040"));
    assert!(!subjects(&facts).contains("BFO:0000004"));
}

#[test]
fn descendants_directive_sweeps_the_subtree() {
    let mut store = fixture();
    let spec = labels_only(&[("BFO:0000004", seed(Some(RelatedDirective::Descendants), None))]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.term_count, 4);
    let included = subjects(&facts);
    for term in ["BFO:0000004", "BFO:0000040", "OBI:0100046", "OBI:0000666"] {
        assert!(included.contains(term), "missing {term}");
    }
    assert!(has_row(&facts, "BFO:0000040", "rdfs:subClassOf", "BFO:0000004"));
    assert!(has_row(&facts, "OBI:0100046", "rdfs:subClassOf", "BFO:0000040"));
    assert!(has_row(&facts, "OBI:0000666", "rdfs:subClassOf", "BFO:0000040"));
}

#[test]
fn descendants_directive_keeps_leaves_only() {
    let mut store = fixture();
    let mut spec = labels_only(&[("BFO:0000004", seed(Some(RelatedDirective::Descendants), None))]);
    spec.intermediates = Intermediates::None;

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.term_count, 3);
    assert!(!subjects(&facts).contains("BFO:0000040"));
    // With the intermediate gone, leaves attach straight to the seed.
    assert!(has_row(&facts, "OBI:0100046", "rdfs:subClassOf", "BFO:0000004"));
    assert!(has_row(&facts, "OBI:0000666", "rdfs:subClassOf", "BFO:0000004"));
}

#[test]
fn override_parent_wins_over_computed_lineage() {
    let mut store = fixture();
    let spec = labels_only(&[(
        "OBI:0100046",
        seed(Some(RelatedDirective::Ancestors), Some("BFO:0000002")),
    )]);

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(count_rows(&facts, "OBI:0100046", "rdfs:subClassOf"), 1);
    assert!(has_row(&facts, "OBI:0100046", "rdfs:subClassOf", "BFO:0000002"));
    // Terms without an override still get their computed parents.
    assert!(has_row(&facts, "BFO:0000040", "rdfs:subClassOf", "BFO:0000004"));
}

#[test]
fn override_parent_survives_suppressed_hierarchy() {
    let mut store = fixture();
    let mut spec = labels_only(&[
        ("ex:sample1", seed(None, Some("OBI:0000666"))),
        ("OBI:0000666", seed(None, None)),
    ]);
    spec.suppress_hierarchy = true;

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    // The individual is typed by its override parent, not subclassed.
    let typed: Vec<&Fact> = facts
        .iter()
        .filter(|f| f.subject == "ex:sample1" && f.predicate == "rdf:type" && f.object == "OBI:0000666")
        .collect();
    assert_eq!(typed.len(), 1);
    assert_eq!(typed[0].assertion, 1);
    assert_eq!(typed[0].graph, "graph");
    assert_eq!(typed[0].datatype, "_IRI");
    assert!(!facts.iter().any(|f| f.predicate == "rdfs:subClassOf"));
}

#[test]
fn property_seeds_use_subproperty_edges() {
    let mut store = fixture();
    let spec = labels_only(&[("OBI:0000293", seed(Some(RelatedDirective::Ancestors), None))]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.term_count, 2);
    assert!(has_row(&facts, "OBI:0000293", "rdfs:subPropertyOf", "RO:0000057"));
    assert!(has_row(&facts, "OBI:0000293", "rdf:type", "owl:ObjectProperty"));
    assert!(has_row(&facts, "RO:0000057", "rdf:type", "owl:ObjectProperty"));
    assert!(!facts.iter().any(|f| f.predicate == "rdfs:subClassOf"));
}

#[test]
fn annotation_iri_values_pass_without_their_object() {
    let mut store = fixture();
    let mut spec = spec_with(&[("OBI:0100046", seed(None, None))]);
    spec.suppress_hierarchy = true;
    spec.predicates = Some(vec!["oio:inSubset".to_string()]);

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(facts.len(), 2);
    assert!(has_row(&facts, "OBI:0100046", "oio:inSubset", "obi:subset_vaccine"));
    // The subset term is referenced, never pulled in.
    assert!(!subjects(&facts).contains("obi:subset_vaccine"));
}

#[test]
fn object_facts_need_both_ends_inside() {
    let mut store = fixture();
    let mut spec = spec_with(&[
        ("ex:sample1", seed(None, None)),
        ("OBI:0100046", seed(None, None)),
    ]);
    spec.suppress_hierarchy = true;
    spec.predicates = Some(vec!["RO:0000057".to_string()]);

    extract(&mut store, "both_ends", &spec).unwrap();
    let both = store.facts_in("both_ends").unwrap();
    assert!(has_row(&both, "ex:sample1", "RO:0000057", "OBI:0100046"));

    let mut spec = spec_with(&[("ex:sample1", seed(None, None))]);
    spec.suppress_hierarchy = true;
    spec.predicates = Some(vec!["RO:0000057".to_string()]);

    extract(&mut store, "one_end", &spec).unwrap();
    let one = store.facts_in("one_end").unwrap();
    assert!(!has_row(&one, "ex:sample1", "RO:0000057", "OBI:0100046"));
}

#[test]
fn copy_predicates_duplicate_under_the_new_name() {
    let mut store = fixture();
    let mut spec = labels_only(&[("OBI:0100046", seed(None, None))]);
    spec.suppress_hierarchy = true;
    spec.copy_predicates = vec![("rdfs:comment".to_string(), "skos:note".to_string())];

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert!(has_row(&facts, "OBI:0100046", "skos:note", "used as a rinse solution"));
    // The source predicate did not pass the filter, so only the copy lands.
    assert!(!facts.iter().any(|f| f.predicate == "rdfs:comment"));
    let copied = facts.iter().find(|f| f.predicate == "skos:note").unwrap();
    assert_eq!(copied.assertion, 1);
    assert_eq!(copied.datatype, "xsd:string");
    assert!(copied.annotation.is_none());
}

#[test]
fn cyclic_hierarchy_terminates_with_both_edges() {
    let mut store = fixture();
    let spec = labels_only(&[
        ("CYC:A", seed(Some(RelatedDirective::Ancestors), None)),
        ("CYC:B", seed(Some(RelatedDirective::Ancestors), None)),
    ]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.term_count, 2);
    assert_eq!(count_rows(&facts, "CYC:A", "rdfs:subClassOf"), 1);
    assert_eq!(count_rows(&facts, "CYC:B", "rdfs:subClassOf"), 1);
    assert!(has_row(&facts, "CYC:A", "rdfs:subClassOf", "CYC:B"));
    assert!(has_row(&facts, "CYC:B", "rdfs:subClassOf", "CYC:A"));
}

#[test]
fn imported_from_stamps_every_term() {
    let mut store = fixture();
    let mut spec = spec_with(&[
        ("OBI:0100046", seed(None, None)),
        ("OBI:0000666", seed(None, None)),
    ]);
    spec.suppress_hierarchy = true;
    spec.predicates = Some(vec![]);
    spec.imported_from = Some("http://purl.obolibrary.org/obo/obi.owl".to_string());

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(facts.len(), 4);
    for term in ["OBI:0100046", "OBI:0000666"] {
        assert!(has_row(
            &facts,
            term,
            "IAO:0000412",
            "<http://purl.obolibrary.org/obo/obi.owl>"
        ));
    }

    spec.imported_from_predicate = "ex:fromSource".to_string();
    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);
    assert!(has_row(
        &facts,
        "OBI:0100046",
        "ex:fromSource",
        "<http://purl.obolibrary.org/obo/obi.owl>"
    ));
}

#[test]
fn default_predicate_fill_takes_everything_nonstructural() {
    let mut store = fixture();
    let mut spec = spec_with(&[("OBI:0100046", seed(None, None))]);
    spec.suppress_hierarchy = true;

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(facts.len(), 5);
    assert!(has_row(&facts, "OBI:0100046", "rdfs:label", "phosphate buffered saline"));
    assert!(has_row(&facts, "OBI:0100046", "rdfs:comment", "used as a rinse solution"));
    assert!(has_row(&facts, "OBI:0100046", "oio:inSubset", "obi:subset_vaccine"));
    // Full-row copies keep their reified annotations.
    let definition = facts
        .iter()
        .find(|f| f.predicate == "IAO:0000115")
        .unwrap();
    assert!(definition.annotation.as_deref().unwrap().contains("IAO:0000119"));
    // Structural predicates never ride in through the default fill.
    assert!(!facts.iter().any(|f| f.predicate == "rdfs:subClassOf"));
}

#[test]
fn labels_resolve_to_ids_for_seeds_and_predicates() {
    let mut store = fixture();
    let mut spec = spec_with(&[("phosphate buffered saline", seed(None, None))]);
    spec.suppress_hierarchy = true;
    spec.predicates = Some(vec!["definition".to_string()]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);

    assert_eq!(report.seed_count, 1);
    assert_eq!(facts.len(), 2);
    assert!(has_row(&facts, "OBI:0100046", "rdf:type", "owl:Class"));
    assert!(count_rows(&facts, "OBI:0100046", "IAO:0000115") == 1);
}

#[test]
fn unresolved_seeds_drop_but_the_run_continues() {
    let mut store = fixture();
    let mut spec = labels_only(&[
        ("OBI:0100046", seed(None, None)),
        ("NO:SUCH_TERM", seed(None, None)),
    ]);
    spec.suppress_hierarchy = true;

    let report = extract(&mut store, "extract", &spec).unwrap();
    assert_eq!(report.seed_count, 1);
    assert_eq!(subjects(&rows(&store)), ["OBI:0100046".to_string()].into());
}

#[test]
fn entirely_unresolved_seeds_are_fatal() {
    let mut store = fixture();
    let spec = spec_with(&[
        ("NO:1", seed(None, None)),
        ("no such label", seed(None, None)),
    ]);

    let err = extract(&mut store, "extract", &spec).unwrap_err();
    assert!(matches!(err, ExtractError::Lookup { attempted: 2 }));
    // Nothing was written, not even an empty output table.
    assert!(store.facts_in("extract").is_err());
}

#[test]
fn unresolved_predicates_drop_but_the_run_continues() {
    let mut store = fixture();
    let mut spec = spec_with(&[("OBI:0100046", seed(None, None))]);
    spec.suppress_hierarchy = true;
    spec.predicates = Some(vec!["rdfs:label".to_string(), "ex:nonexistent".to_string()]);

    extract(&mut store, "extract", &spec).unwrap();
    let facts = rows(&store);
    assert_eq!(facts.len(), 2);
    assert!(has_row(&facts, "OBI:0100046", "rdfs:label", "phosphate buffered saline"));
}

#[test]
fn reruns_are_deterministic_and_replace_the_output() {
    let mut store = fixture();
    let mut spec = spec_with(&[("OBI:0100046", seed(Some(RelatedDirective::Ancestors), None))]);
    spec.copy_predicates = vec![("rdfs:comment".to_string(), "skos:note".to_string())];
    spec.imported_from = Some("http://purl.obolibrary.org/obo/obi.owl".to_string());

    extract(&mut store, "extract", &spec).unwrap();
    let first = rows(&store);
    extract(&mut store, "extract", &spec).unwrap();
    let second = rows(&store);
    assert_eq!(first, second);

    let mut small = labels_only(&[("OBI:0000666", seed(None, None))]);
    small.suppress_hierarchy = true;
    extract(&mut store, "extract", &small).unwrap();
    let replaced = rows(&store);
    assert_eq!(replaced.len(), 2);
    assert!(!subjects(&replaced).contains("OBI:0100046"));
}

#[test]
fn extraction_into_the_statement_table_is_refused() {
    let mut store = fixture();
    let spec = labels_only(&[("OBI:0100046", seed(None, None))]);

    let err = extract(&mut store, "statement", &spec).unwrap_err();
    assert!(matches!(
        err,
        ExtractError::Config(ConfigError::OutputCollision(_))
    ));
    assert!(!store.facts_in("statement").unwrap().is_empty());
}

#[test]
fn report_serializes_for_machine_consumers() {
    let mut store = fixture();
    let spec = labels_only(&[("OBI:0100046", seed(Some(RelatedDirective::Ancestors), None))]);

    let report = extract(&mut store, "extract", &spec).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["output_table"], "extract");
    assert_eq!(json["seed_count"], 1);
    assert_eq!(json["term_count"], 5);
    assert_eq!(json["parent_edges"], 4);
    assert_eq!(json["facts_written"], report.facts_written as i64);
}
