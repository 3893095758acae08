//! Search field registry.
//!
//! Maps the caller-facing field identifiers advertised by the reconciliation
//! service to the pica indexes the ISNI SRU endpoint actually searches.

use serde::Serialize;

/// Association between a reconciliation field id and an ISNI search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    /// Caller-facing field identifier, e.g. `/isni/name`.
    pub id: &'static str,
    /// Human-readable name shown in the service metadata.
    pub name: &'static str,
    /// ISNI SRU index code, e.g. `pica.na`.
    pub index: &'static str,
}

/// All supported search fields. The first entry is the default.
pub static FIELDS: [FieldMapping; 4] = [
    FieldMapping {
        id: "/isni/name",
        name: "Name",
        index: "pica.na",
    },
    FieldMapping {
        id: "/isni/name_keyword",
        name: "Name Keyword",
        index: "pica.nw",
    },
    FieldMapping {
        id: "/isni/any_phrase",
        name: "Any Phrase",
        index: "pica.aph",
    },
    FieldMapping {
        id: "/isni/isni_number",
        name: "ISNI Number",
        index: "pica.isn",
    },
];

/// Resolve a field id to its mapping.
///
/// Never fails: an unknown (or empty) id is a policy fallback to the default
/// name search, not an error.
pub fn resolve_field(id: &str) -> &'static FieldMapping {
    FIELDS.iter().find(|f| f.id == id).unwrap_or(&FIELDS[0])
}
