//! Compares a translated message against its source message and classifies
//! the structural differences.
//!
//! Findings are returned as structured data, not errors: the caller decides
//! how to treat each severity (a build might fail on errors and log
//! warnings). A placeholder or ICU reference the translation adds would break
//! rendering, so those are errors; anything removed, and tag differences in
//! either direction, are warnings.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::message::{MessagePart, NormalizedMessage};

/// Severity of a single finding. Fixed per finding kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// The fixed set of finding keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingKind {
    PlaceholderAdded,
    PlaceholderRemoved,
    TagAdded,
    TagRemoved,
    IcuMessageRefAdded,
    IcuMessageRefRemoved,
}

impl FindingKind {
    /// Each key belongs to exactly one severity.
    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::PlaceholderAdded | FindingKind::IcuMessageRefAdded => Severity::Error,
            FindingKind::PlaceholderRemoved
            | FindingKind::TagAdded
            | FindingKind::TagRemoved
            | FindingKind::IcuMessageRefRemoved => Severity::Warning,
        }
    }
}

/// One reported discrepancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

/// Compares `translation` against `source`. Returns `None` when there is
/// nothing to report.
pub fn validate_translation(
    source: &NormalizedMessage,
    translation: &NormalizedMessage,
) -> Option<BTreeMap<FindingKind, Finding>> {
    let mut findings = BTreeMap::new();

    let source_placeholders = placeholder_indices(source);
    let translation_placeholders = placeholder_indices(translation);
    report(
        &mut findings,
        FindingKind::PlaceholderAdded,
        added_message("placeholder", &translation_placeholders, &source_placeholders),
    );
    report(
        &mut findings,
        FindingKind::PlaceholderRemoved,
        removed_message("placeholder", &source_placeholders, &translation_placeholders),
    );

    let source_refs = icu_ref_indices(source);
    let translation_refs = icu_ref_indices(translation);
    report(
        &mut findings,
        FindingKind::IcuMessageRefAdded,
        added_message("ICU message reference", &translation_refs, &source_refs),
    );
    report(
        &mut findings,
        FindingKind::IcuMessageRefRemoved,
        removed_message("ICU message reference", &source_refs, &translation_refs),
    );

    let source_tags = tag_names(source);
    let translation_tags = tag_names(translation);
    report(
        &mut findings,
        FindingKind::TagAdded,
        added_message("tag", &translation_tags, &source_tags),
    );
    report(
        &mut findings,
        FindingKind::TagRemoved,
        removed_message("tag", &source_tags, &translation_tags),
    );

    if findings.is_empty() { None } else { Some(findings) }
}

fn report(
    findings: &mut BTreeMap<FindingKind, Finding>,
    kind: FindingKind,
    message: Option<String>,
) {
    if let Some(message) = message {
        findings.insert(
            kind,
            Finding {
                severity: kind.severity(),
                message,
            },
        );
    }
}

fn placeholder_indices(message: &NormalizedMessage) -> BTreeSet<String> {
    message
        .parts()
        .iter()
        .filter_map(|p| match p {
            MessagePart::Placeholder { index, .. } => Some(index.to_string()),
            _ => None,
        })
        .collect()
}

fn icu_ref_indices(message: &NormalizedMessage) -> BTreeSet<String> {
    message
        .parts()
        .iter()
        .filter_map(|p| match p {
            MessagePart::IcuMessageRef { index, .. } => Some(index.to_string()),
            _ => None,
        })
        .collect()
}

/// Tag names occurring in the message. Start and empty tags only; end tags
/// are implied by their start tags.
fn tag_names(message: &NormalizedMessage) -> BTreeSet<String> {
    message
        .parts()
        .iter()
        .filter_map(|p| match p {
            MessagePart::StartTag { name, .. } | MessagePart::EmptyTag { name, .. } => {
                Some(format!("<{}>", name))
            }
            _ => None,
        })
        .collect()
}

fn added_message(
    noun: &str,
    in_translation: &BTreeSet<String>,
    in_source: &BTreeSet<String>,
) -> Option<String> {
    let added: Vec<&str> = in_translation
        .difference(in_source)
        .map(String::as_str)
        .collect();
    if added.is_empty() {
        return None;
    }
    Some(if added.len() == 1 {
        format!(
            "added {} {}, which is not in original message",
            noun, added[0]
        )
    } else {
        format!(
            "added {}s {}, which are not in original message",
            noun,
            added.join(", ")
        )
    })
}

fn removed_message(
    noun: &str,
    in_source: &BTreeSet<String>,
    in_translation: &BTreeSet<String>,
) -> Option<String> {
    let removed: Vec<&str> = in_source
        .difference(in_translation)
        .map(String::as_str)
        .collect();
    if removed.is_empty() {
        return None;
    }
    Some(if removed.len() == 1 {
        format!("removed {} {} from original message", noun, removed[0])
    } else {
        format!("removed {}s {} from original message", noun, removed.join(", "))
    })
}
