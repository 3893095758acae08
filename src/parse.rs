//! SRU/XML response parsing.
//!
//! Walks the searchRetrieve response in document order, classifies each
//! `record` as a person or organisation entry, derives its display names,
//! and deduplicates by ISNI URI (first seen wins).

use crate::error::Result;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;

/// One authority record extracted from an SRU response.
///
/// `names` is non-empty; the first entry is the representative display name,
/// but all of them participate in scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityRecord {
    /// Stable ISNI identifier URI, unique within one response.
    pub isni_uri: String,
    /// Display names in document order.
    pub names: Vec<String>,
}

/// Compare an element's local name, ignoring any namespace prefix.
fn local_is(name: &[u8], target: &str) -> bool {
    match name.iter().rposition(|&b| b == b':') {
        Some(pos) => &name[pos + 1..] == target.as_bytes(),
        None => name == target.as_bytes(),
    }
}

/// Parse an SRU searchRetrieve response into deduplicated authority records.
///
/// Records that are not representable — no derivable name, or no `isniURI` —
/// are skipped without failing the batch. Only a malformed document is an
/// error; the caller degrades that to an empty result.
pub fn parse_sru_response(xml: &str) -> Result<Vec<AuthorityRecord>> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.config_mut().trim_text(true);

    let mut records = Vec::new();
    let mut seen_uris: HashSet<String> = HashSet::new();

    // Per-record state.
    let mut in_record = false;
    let mut saw_personal = false;
    let mut saw_org = false;
    let mut person_names: Vec<String> = Vec::new();
    let mut org_names: Vec<String> = Vec::new();
    let mut isni_uri: Option<String> = None;

    // Per-name-element state.
    let mut in_personal = false;
    let mut forename: Option<String> = None;
    let mut surname: Option<String> = None;
    let mut dates: Option<String> = None;
    let mut in_org = false;
    let mut main_name: Option<String> = None;
    let mut subdivision: Option<String> = None;

    let mut text = String::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = e.name();
                let name = name.as_ref();
                if local_is(name, "record") {
                    in_record = true;
                    saw_personal = false;
                    saw_org = false;
                    person_names.clear();
                    org_names.clear();
                    isni_uri = None;
                } else if in_record && local_is(name, "personalName") {
                    saw_personal = true;
                    in_personal = true;
                    forename = None;
                    surname = None;
                    dates = None;
                } else if in_record && local_is(name, "organisationName") {
                    saw_org = true;
                    in_org = true;
                    main_name = None;
                    subdivision = None;
                }
                text.clear();
            }
            Event::Text(t) => {
                // Entity and character references must be decoded here, so a
                // name like "Smith &amp; Wesson" compares as "Smith & Wesson".
                text.push_str(&t.unescape().map_err(quick_xml::Error::from)?);
            }
            Event::CData(t) => {
                text.push_str(&String::from_utf8_lossy(t.as_ref()));
            }
            Event::End(e) => {
                let name = e.name();
                let name = name.as_ref();
                if local_is(name, "record") {
                    in_record = false;
                    // Classification goes by element presence: any personalName
                    // makes this a person record, even one that derives no name.
                    let names = if saw_personal {
                        std::mem::take(&mut person_names)
                    } else if saw_org {
                        std::mem::take(&mut org_names)
                    } else {
                        Vec::new()
                    };
                    if let Some(uri) = isni_uri.take() {
                        if !names.is_empty() && seen_uris.insert(uri.clone()) {
                            records.push(AuthorityRecord {
                                isni_uri: uri,
                                names,
                            });
                        }
                    }
                } else if local_is(name, "personalName") {
                    in_personal = false;
                    // Surname is required; an entry without one derives no name.
                    if let Some(sur) = surname.take() {
                        person_names.push(format!(
                            "{} {} {}",
                            forename.take().unwrap_or_default(),
                            sur,
                            dates.take().unwrap_or_default()
                        ));
                    }
                } else if local_is(name, "organisationName") {
                    in_org = false;
                    if let Some(main) = main_name.take() {
                        org_names.push(format!(
                            "{} {}",
                            main,
                            subdivision.take().unwrap_or_default()
                        ));
                    }
                } else if in_personal && local_is(name, "forename") {
                    forename = Some(text.clone());
                } else if in_personal && local_is(name, "surname") {
                    surname = Some(text.clone());
                } else if in_personal && local_is(name, "dates") {
                    dates = Some(text.clone());
                } else if in_org && local_is(name, "mainName") {
                    main_name = Some(text.clone());
                } else if in_org && local_is(name, "subdivisionName") {
                    subdivision = Some(text.clone());
                } else if in_record && local_is(name, "isniURI") && isni_uri.is_none() {
                    let uri = text.trim();
                    if !uri.is_empty() {
                        isni_uri = Some(uri.to_string());
                    }
                }
                text.clear();
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}
