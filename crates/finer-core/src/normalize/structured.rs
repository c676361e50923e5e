//! Parsers for the single-object structured tasks.

use super::{coalesce_text, extract_object};
use crate::document::{Approach, RefinedResult, ResearchType, ReviewResult, SuggestedQueries};
use serde_json::{Map, Value};
use std::str::FromStr;

fn text(obj: &Map<String, Value>, keys: &[&str]) -> String {
    coalesce_text(obj, keys).unwrap_or_default()
}

/// Parses a RefineSeed reply.
///
/// Returns `None` when no object is found or it carries none of the
/// outline fields, so callers never store an empty outline.
pub fn parse_refined_result(raw: &str) -> Option<RefinedResult> {
    let value = extract_object(raw)?;
    let obj = value.as_object()?;

    let research_type = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(|t| ResearchType::from_str(&t.trim().to_lowercase()).ok())
        .unwrap_or_default();

    let approaches = obj
        .get("approaches")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|item| match item {
                    Value::Object(a) => Some(Approach {
                        name: text(a, &["name", "title"]),
                        description: text(a, &["description", "detail", "summary"]),
                    }),
                    Value::String(s) => Some(Approach {
                        name: s.clone(),
                        description: String::new(),
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    let result = RefinedResult {
        research_type,
        theme: text(obj, &["theme", "title"]),
        rq: text(obj, &["rq", "researchQuestion", "question"]),
        target: text(obj, &["target", "population"]),
        goal: text(obj, &["goal", "purpose", "objective"]),
        approaches,
    };

    let has_outline = [&result.theme, &result.rq, &result.target, &result.goal]
        .iter()
        .any(|f| !f.trim().is_empty());
    if has_outline {
        Some(result)
    } else {
        tracing::warn!("[Normalizer] Refined result has no outline fields");
        None
    }
}

/// Parses a LiteratureQueries reply.
pub fn parse_suggested_queries(raw: &str) -> Option<SuggestedQueries> {
    let value = extract_object(raw)?;
    let obj = value.as_object()?;
    let queries = SuggestedQueries {
        keywords_native: text(obj, &["keywordsNative", "keywordsJa", "keywords_native"]),
        keywords_foreign: text(obj, &["keywordsForeign", "keywordsEn", "keywords_foreign"]),
        query_native: text(obj, &["queryNative", "queryJa", "query_native"]),
        query_foreign: text(obj, &["queryForeign", "queryEn", "query_foreign"]),
    };
    let empty = queries == SuggestedQueries::default();
    (!empty).then_some(queries)
}

/// Parses a LiteratureReview reply. Unstructured text is kept verbatim.
pub fn parse_review_result(raw: &str) -> ReviewResult {
    let structure = extract_object(raw)
        .and_then(|v| v.as_object().and_then(|o| coalesce_text(o, &["structure", "narrative"])));
    ReviewResult {
        structure: structure.unwrap_or_else(|| raw.trim().to_string()),
    }
}
