//! Field coalescing from loosely shaped JSON into [`Proposal`].

use crate::document::{FinerCriterion, FinerNote, Proposal};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

/// Accepted keys per canonical field, in priority order.
const DESIGN_KEYS: &[&str] = &["design", "title", "name"];
const VISION_KEYS: &[&str] = &["vision", "description", "overview"];
const REASON_KEYS: &[&str] = &["reason", "recommendation", "rationale"];

/// Whether an object carries any key a proposal can be built from.
pub fn is_proposal_like(obj: &Map<String, Value>) -> bool {
    DESIGN_KEYS
        .iter()
        .chain(VISION_KEYS)
        .any(|k| obj.contains_key(*k))
}

/// First non-empty text under any of `keys`.
pub(crate) fn coalesce_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Builds a proposal from one element. `index` is zero-based and only used
/// to label elements that arrive without a design name.
pub fn proposal_from_value(value: &Value, index: usize) -> Proposal {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    Proposal {
        design: coalesce_text(obj, DESIGN_KEYS).unwrap_or_else(|| format!("Proposal {}", index + 1)),
        vision: coalesce_text(obj, VISION_KEYS).unwrap_or_default(),
        finer: finer_notes(obj.get("finer")),
        reason: coalesce_text(obj, REASON_KEYS).unwrap_or_default(),
    }
}

/// Every criterion is present in the result; unknown or missing ones get
/// the neutral default.
fn finer_notes(raw: Option<&Value>) -> BTreeMap<FinerCriterion, FinerNote> {
    let obj = raw.and_then(Value::as_object);
    FinerCriterion::iter()
        .map(|criterion| {
            let note = obj
                .and_then(|o| lookup_criterion(o, criterion))
                .map(note_from_value)
                .unwrap_or_default();
            (criterion, note)
        })
        .collect()
}

/// Matches `feasible`, `Feasible`, `FEASIBLE` or the initial `F`.
fn lookup_criterion(obj: &Map<String, Value>, criterion: FinerCriterion) -> Option<&Value> {
    let name: &'static str = criterion.into();
    obj.iter()
        .find(|(k, _)| {
            k.eq_ignore_ascii_case(name)
                || (k.len() == 1 && k.eq_ignore_ascii_case(&name[..1]))
        })
        .map(|(_, v)| v)
}

fn note_from_value(value: &Value) -> FinerNote {
    match value {
        Value::Bool(b) => FinerNote::Flag(*b),
        Value::String(s) => FinerNote::Text(s.clone()),
        Value::Null => FinerNote::default(),
        other => FinerNote::Text(other.to_string()),
    }
}
