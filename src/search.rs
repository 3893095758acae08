//! The reconciliation search pipeline.
//!
//! normalize -> resolve field -> fetch SRU XML -> extract records ->
//! score & rank -> top-3 candidates.

use crate::client::IsniClient;
use crate::fields::{resolve_field, FieldMapping};
use crate::parse::{parse_sru_response, AuthorityRecord};
use crate::text::{normalize, token_sort_ratio};
use crate::types::Candidate;

/// Interactive matching tools only surface the top three candidates.
const MAX_CANDIDATES: usize = 3;

impl IsniClient {
    /// Reconcile a free-text name against an ISNI search field.
    ///
    /// An unknown `field_id` falls back to the default name search. Always
    /// returns a (possibly empty) ranked list of at most three candidates:
    /// transport failures and unparseable responses are logged and degrade
    /// to an empty list rather than surfacing an error.
    pub async fn search(&self, raw_query: &str, field_id: &str) -> Vec<Candidate> {
        let field = resolve_field(field_id);
        let query = normalize(raw_query);

        let body = match self.fetch(field.index, &query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("ISNI request failed: {e}");
                return Vec::new();
            }
        };
        let records = match parse_sru_response(&body) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("unusable SRU response: {e}");
                return Vec::new();
            }
        };
        rank(&query, records, field)
    }
}

/// Score extracted records against the normalized query and keep the top three.
///
/// A record's score is the maximum token-sort ratio over all of its names,
/// while its displayed name is always the first one derived — the two can
/// disagree, which is deliberate (see the mismatch test below). Sorting is
/// stable, so ties keep their discovery order.
pub fn rank(
    query: &str,
    records: Vec<AuthorityRecord>,
    field: &'static FieldMapping,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = records
        .into_iter()
        .filter_map(|record| {
            let name = record.names.first()?.clone();
            let score = record
                .names
                .iter()
                .map(|n| token_sort_ratio(query, n))
                .max()
                .unwrap_or(0);
            let is_match = record.names.iter().any(|n| normalize(n) == query);
            Some(Candidate {
                id: record.isni_uri,
                name,
                score,
                is_match,
                field,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}
