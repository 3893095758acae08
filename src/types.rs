//! Public result types.

use crate::fields::FieldMapping;
use serde::Serialize;

/// One ranked authority-record match returned to the caller.
///
/// Serializes to the reconciliation wire shape
/// `{ "id", "name", "score", "match", "type" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Stable ISNI identifier URI (dedup key within one search).
    pub id: String,
    /// Representative display name: the first name derived from the record.
    pub name: String,
    /// Maximum similarity score over all of the record's names, 0–100.
    pub score: u8,
    /// True if any of the record's names normalizes to the query exactly.
    #[serde(rename = "match")]
    pub is_match: bool,
    /// Search field the candidate was matched under.
    #[serde(rename = "type")]
    pub field: &'static FieldMapping,
}
