//! OWL/RDF vocabulary as the compact CURIEs an LDTab table stores.

pub mod rdf {
    pub const TYPE: &str = "rdf:type";
}

pub mod rdfs {
    pub const SUB_CLASS_OF: &str = "rdfs:subClassOf";
    pub const SUB_PROPERTY_OF: &str = "rdfs:subPropertyOf";
    pub const LABEL: &str = "rdfs:label";
}

pub mod owl {
    pub const THING: &str = "owl:Thing";
    pub const CLASS: &str = "owl:Class";
    pub const ANNOTATION_PROPERTY: &str = "owl:AnnotationProperty";
    /// LDTab writes this spelling, not `owl:DatatypeProperty`.
    pub const DATA_PROPERTY: &str = "owl:DataProperty";
    pub const OBJECT_PROPERTY: &str = "owl:ObjectProperty";
    pub const NAMED_INDIVIDUAL: &str = "owl:NamedIndividual";
}

pub mod iao {
    /// The "imported from" annotation property.
    pub const IMPORTED_FROM: &str = "IAO:0000412";
}

/// Datatype tags with structural meaning; anything else is a literal tag.
pub mod datatype {
    pub const IRI: &str = "_IRI";
    pub const JSON: &str = "_JSON";
}

/// Root sentinel. Ancestor closures remap `owl:Thing` to this on read, so
/// class and property hierarchies are reduced by the same rules.
pub const CLASS_ROOT: &str = owl::CLASS;

/// The two predicates a hierarchy edge can be asserted with.
pub const HIERARCHY_PREDICATES: [&str; 2] = [rdfs::SUB_CLASS_OF, rdfs::SUB_PROPERTY_OF];
