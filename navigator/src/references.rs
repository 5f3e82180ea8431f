//! Reference activity: which cross-document links stay live for the set of
//! archives currently loaded.

use crate::proto::ReferenceRecord;
use crate::proto::References;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::borrow::Cow;

const DOC_SCHEME: &str = "doc://";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceActivity {
    Active,
    Inactive,
}

/// Archive identifier of a `doc://<archive>/<path>` identifier, percent-decoded.
pub fn archive_id(identifier: &str) -> Option<Cow<'_, str>> {
    let rest = identifier.strip_prefix(DOC_SCHEME)?;
    let segment = rest.split('/').next().unwrap_or(rest);
    if segment.is_empty() {
        return None;
    }
    Some(percent_decode_str(segment).decode_utf8_lossy())
}

fn from_included_archive(identifier: &str, archives: &[String]) -> bool {
    if archives.is_empty() {
        return true;
    }
    archive_id(identifier).is_some_and(|id| archives.iter().any(|included| *included == *id))
}

fn effective_identifier<'a>(key: &'a str, record: &'a ReferenceRecord) -> &'a str {
    if record.identifier.is_empty() {
        key
    } else {
        &record.identifier
    }
}

pub fn is_active(key: &str, record: &ReferenceRecord, archives: &[String]) -> bool {
    !record.is_topic_like() || from_included_archive(effective_identifier(key, record), archives)
}

pub fn activity(key: &str, record: &ReferenceRecord, archives: &[String]) -> ReferenceActivity {
    if is_active(key, record, archives) {
        ReferenceActivity::Active
    } else {
        ReferenceActivity::Inactive
    }
}

/// Copies `references`, stripping `url` from topic-like records whose archive
/// is not in `archives`. An empty archive list keeps everything active.
pub fn filter_references(references: &References, archives: &[String]) -> References {
    references
        .iter()
        .map(|(key, record)| {
            if is_active(key, record, archives) {
                (key.clone(), record.clone())
            } else {
                let mut inactive = record.clone();
                inactive.url = None;
                (key.clone(), inactive)
            }
        })
        .collect()
}
