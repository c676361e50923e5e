//! Session blob, export files and import parsing.
//!
//! The blob and the export share one shape: every document section except
//! `settings`. Exports add `_exportedAt` and `_version`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use finer_core::document::Section;
use finer_core::{FinerError, Result, SessionDocument};
use semver::Version;
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

pub const EXPORT_VERSION: &str = "1.0";
pub const EXPORT_PREFIX: &str = "research-proposal";
pub const EXPORTED_AT_KEY: &str = "_exportedAt";
pub const VERSION_KEY: &str = "_version";

const THEME_CHARS: usize = 30;
const UNTITLED: &str = "untitled";

/// A ready-to-write export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub content: String,
}

fn sections_of(doc: &SessionDocument) -> Result<Map<String, Value>> {
    let mut tree = match doc.to_value()? {
        Value::Object(map) => map,
        _ => return Err(FinerError::internal("document did not serialize to an object")),
    };
    tree.retain(|key, _| Section::iter().any(|s| s.key() == key.as_str()));
    Ok(tree)
}

/// The `session-state` blob.
pub(crate) fn session_blob(doc: &SessionDocument) -> Result<String> {
    Ok(serde_json::to_string(&Value::Object(sections_of(doc)?))?)
}

pub fn export_document(doc: &SessionDocument, now: DateTime<Utc>) -> Result<ExportFile> {
    let mut tree = sections_of(doc)?;
    tree.insert(
        EXPORTED_AT_KEY.to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    tree.insert(
        VERSION_KEY.to_string(),
        Value::String(EXPORT_VERSION.to_string()),
    );

    Ok(ExportFile {
        filename: export_filename(doc, now.date_naive()),
        content: serde_json::to_string_pretty(&Value::Object(tree))?,
    })
}

/// `research-proposal_<theme>_<YYYY-MM-DD>.json`
pub fn export_filename(doc: &SessionDocument, date: NaiveDate) -> String {
    let theme: String = doc
        .theme()
        .unwrap_or(UNTITLED)
        .trim()
        .chars()
        .take(THEME_CHARS)
        .map(|c| {
            if c.is_whitespace()
                || c.is_control()
                || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{}_{}_{}.json", EXPORT_PREFIX, theme, date.format("%Y-%m-%d"))
}

/// Parses an import file into its top-level map. Nothing is applied here.
pub(crate) fn parse_import(content: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| FinerError::import(format!("not valid JSON: {}", e)))?;
    let Value::Object(map) = value else {
        return Err(FinerError::import("top level must be an object"));
    };
    check_version(map.get(VERSION_KEY))?;
    Ok(map)
}

fn check_version(tag: Option<&Value>) -> Result<()> {
    let raw = match tag {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(FinerError::import(format!(
                "unsupported {} value {}",
                VERSION_KEY, other
            )));
        }
    };

    let version = parse_schema_version(&raw)
        .ok_or_else(|| FinerError::import(format!("unreadable {} '{}'", VERSION_KEY, raw)))?;
    let current = parse_schema_version(EXPORT_VERSION)
        .ok_or_else(|| FinerError::internal("bad export version constant"))?;
    if version.major != current.major {
        return Err(FinerError::import(format!(
            "file version {} is not compatible with {}",
            raw, EXPORT_VERSION
        )));
    }
    Ok(())
}

/// Accepts short tags such as `1` or `1.0` by padding missing components.
fn parse_schema_version(tag: &str) -> Option<Version> {
    let tag = tag.trim().trim_start_matches('v');
    let padded = match tag.split('.').count() {
        1 => format!("{}.0.0", tag),
        2 => format!("{}.0", tag),
        _ => tag.to_string(),
    };
    Version::parse(&padded).ok()
}

/// Replaces each section present in `incoming` on a copy of `base`.
///
/// Missing or null sections keep the current content. Fails without
/// side effects if any section does not fit the model.
pub(crate) fn overlay_sections(
    base: &SessionDocument,
    incoming: &Map<String, Value>,
) -> Result<(SessionDocument, Vec<Section>)> {
    let mut tree = base.to_value()?;
    let mut applied = Vec::new();
    if let Value::Object(root) = &mut tree {
        for section in Section::iter() {
            match incoming.get(section.key()) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    root.insert(section.key().to_string(), value.clone());
                    applied.push(section);
                }
            }
        }
    }
    let doc: SessionDocument = serde_json::from_value(tree).map_err(|e| FinerError::Serialization {
        format: "json".to_string(),
        message: e.to_string(),
    })?;
    Ok((doc, applied))
}
