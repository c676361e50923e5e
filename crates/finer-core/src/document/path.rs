//! Dotted-path access into the Session Document.
//!
//! Paths address the camelCase JSON view of the document. Numeric segments
//! index into lists, so `seed.chatHistory.0.content` reaches the first turn.
//! Writes never create intermediate containers.

use super::model::SessionDocument;
use crate::error::{FinerError, Result};
use serde_json::Value;

/// Sentinel path used for bulk notifications (load, import, reset).
pub const WILDCARD_PATH: &str = "*";

/// Splits a dotted path into segments, rejecting empty segments.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(FinerError::invalid_path(path, "path is empty"));
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|s| s.is_empty()) {
        return Err(FinerError::invalid_path(path, "path has an empty segment"));
    }
    Ok(parts)
}

/// Reads the value at `path`, or `None` when any segment is missing.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let parts = segments(path).ok()?;
    parts.into_iter().try_fold(root, step_into)
}

fn step_into<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Replaces the value at `path` inside a JSON tree.
///
/// The parent container must already exist. Objects accept any key here;
/// unknown keys are caught by the typed round-trip in [`SessionDocument::with_value_at`].
pub fn assign(root: &mut Value, path: &str, value: Value) -> Result<()> {
    let parts = segments(path)?;
    let (last, parents) = parts
        .split_last()
        .ok_or_else(|| FinerError::invalid_path(path, "path is empty"))?;

    let mut node = root;
    for segment in parents {
        node = match node {
            Value::Object(map) => map.get_mut(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        }
        .ok_or_else(|| {
            FinerError::invalid_path(path, format!("segment '{}' does not exist", segment))
        })?;
    }

    match node {
        Value::Object(map) => {
            map.insert((*last).to_string(), value);
            Ok(())
        }
        Value::Array(items) => {
            let slot = last
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| {
                    FinerError::invalid_path(path, format!("index '{}' is out of range", last))
                })?;
            *slot = value;
            Ok(())
        }
        _ => Err(FinerError::invalid_path(path, "parent is not a container")),
    }
}

impl SessionDocument {
    /// Serializes the document into its path-addressable JSON view.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(FinerError::from)
    }

    /// Reads the value at `path`. Missing segments yield `None`.
    pub fn get_path(&self, path: &str) -> Option<Value> {
        let tree = self.to_value().ok()?;
        lookup(&tree, path).cloned()
    }

    /// Returns a copy of the document with `value` written at `path`.
    ///
    /// `self` is never modified, so a rejected write leaves no trace.
    pub fn with_value_at(&self, path: &str, value: Value) -> Result<SessionDocument> {
        let mut tree = self.to_value()?;
        assign(&mut tree, path, value)?;

        let candidate: SessionDocument = serde_json::from_value(tree)
            .map_err(|e| FinerError::invalid_value(path, e.to_string()))?;

        // Unknown keys are silently dropped by serde; catch them here.
        let check = candidate.to_value()?;
        if lookup(&check, path).is_none() {
            return Err(FinerError::invalid_path(path, "no such field"));
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_segments_rejects_empty() {
        assert!(segments("").is_err());
        assert!(segments("seed..question").is_err());
        assert_eq!(segments("seed.question").unwrap(), vec!["seed", "question"]);
    }

    #[test]
    fn test_lookup_missing_is_none() {
        let doc = SessionDocument::default();
        assert_eq!(doc.get_path("seed.nope"), None);
        assert_eq!(doc.get_path("seed.question.deeper"), None);
        assert_eq!(doc.get_path("seed.chatHistory.0"), None);
    }

    #[test]
    fn test_lookup_optional_reads_null() {
        let doc = SessionDocument::default();
        assert_eq!(doc.get_path("seed.refinedResult"), Some(Value::Null));
    }

    #[test]
    fn test_write_then_read() {
        let doc = SessionDocument::default();
        let next = doc
            .with_value_at("seed.question", json!("Does early mobilisation help?"))
            .unwrap();
        assert_eq!(
            next.get_path("seed.question"),
            Some(json!("Does early mobilisation help?"))
        );
        assert_eq!(next.seed.question, "Does early mobilisation help?");
        assert!(doc.seed.question.is_empty());
    }

    #[test]
    fn test_write_into_list_index() {
        let mut doc = SessionDocument::default();
        doc.seed
            .chat_history
            .push(crate::document::ChatMessage::user("first"));
        let next = doc
            .with_value_at("seed.chatHistory.0.content", json!("edited"))
            .unwrap();
        assert_eq!(next.seed.chat_history[0].content, "edited");

        let err = doc
            .with_value_at("seed.chatHistory.5.content", json!("x"))
            .unwrap_err();
        assert!(matches!(err, FinerError::InvalidPath { .. }));
    }

    #[test]
    fn test_no_auto_vivify() {
        let doc = SessionDocument::default();
        let err = doc
            .with_value_at("seed.refinedResult.rq", json!("x"))
            .unwrap_err();
        assert!(matches!(err, FinerError::InvalidPath { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let doc = SessionDocument::default();
        let err = doc.with_value_at("seed.mystery", json!(1)).unwrap_err();
        assert!(matches!(err, FinerError::InvalidPath { .. }));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let doc = SessionDocument::default();
        let err = doc
            .with_value_at("navigation.currentStep", json!("three"))
            .unwrap_err();
        assert!(matches!(err, FinerError::InvalidValue { .. }));
    }

    #[test]
    fn test_set_typed_collections_from_lists() {
        let doc = SessionDocument::default();
        let next = doc
            .with_value_at("dataCollection.types", json!(["vitals", "labs", "vitals"]))
            .unwrap();
        assert_eq!(next.data_collection.types.len(), 2);
        assert_eq!(
            next.get_path("dataCollection.types"),
            Some(json!(["vitals", "labs"]))
        );
    }

    #[test]
    fn test_set_typed_collections_keep_written_order() {
        let doc = SessionDocument::default();
        for (path, value) in [
            ("dataCollection.types", json!(["vitals", "labs"])),
            ("dataCollection.types", json!(["timeseries", "attributes", "scales"])),
            ("navigation.completedSteps", json!([3, 1, 2])),
            ("guideline.checklist", json!([5, 0, 2])),
        ] {
            let next = doc.with_value_at(path, value.clone()).unwrap();
            assert_eq!(next.get_path(path), Some(value), "path {path}");
        }
    }

    #[test]
    fn test_integer_keyed_map() {
        let doc = SessionDocument::default();
        let next = doc
            .with_value_at("guideline.notes.3", json!("randomisation described"))
            .unwrap();
        assert_eq!(next.guideline.notes[&3], "randomisation described");
    }
}
