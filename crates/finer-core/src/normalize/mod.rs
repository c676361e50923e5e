//! Response Normalizer.
//!
//! Turns raw model text into stable shapes through an ordered fallback
//! chain (first success wins):
//!
//! 1. strip a code fence
//! 2. strict parse
//! 3. truncation repair, then strict parse
//! 4. regex rescue of a region carrying a `"design"` key
//! 5. a synthetic proposal that wraps the raw text
//!
//! Parse failures never leave this module.

mod fence;
mod proposal;
mod repair;
mod structured;

pub use fence::strip_code_fence;
pub use proposal::{is_proposal_like, proposal_from_value};
pub use repair::repair_truncated;
pub use structured::{parse_refined_result, parse_review_result, parse_suggested_queries};

pub(crate) use proposal::coalesce_text;

use crate::document::Proposal;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Characters of raw text kept in the synthetic fallback proposal.
pub const FALLBACK_VISION_CHARS: usize = 800;

/// Design label of the synthetic fallback proposal.
pub const FALLBACK_DESIGN: &str = "AI proposal";

const FALLBACK_REASON: &str =
    "The AI response could not be parsed as structured data, so it is shown as text. Please try again.";

static DESIGN_REGION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\{.*"design"\s*:.*\}"#).expect("design region pattern is valid")
});

/// Which stage of the chain produced the proposals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMethod {
    /// Clean parse, possibly after fence stripping
    Strict,
    /// Cut-off payload closed after its last complete element
    TruncationRepair,
    /// Object region located inside surrounding prose
    RegexRescue,
}

/// Result of [`normalize`]. Always holds at least one proposal.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedProposals {
    Parsed {
        proposals: Vec<Proposal>,
        method: ParseMethod,
    },
    /// Nothing structured could be recovered; wraps the raw text.
    Fallback { proposal: Proposal },
}

impl NormalizedProposals {
    pub fn proposals(&self) -> &[Proposal] {
        match self {
            Self::Parsed { proposals, .. } => proposals,
            Self::Fallback { proposal } => std::slice::from_ref(proposal),
        }
    }

    pub fn into_proposals(self) -> Vec<Proposal> {
        match self {
            Self::Parsed { proposals, .. } => proposals,
            Self::Fallback { proposal } => vec![proposal],
        }
    }

    /// The proposal a caller shows first.
    pub fn primary(&self) -> &Proposal {
        &self.proposals()[0]
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Normalizes a design-proposal reply. Total: never panics, never fails.
pub fn normalize(raw: &str) -> NormalizedProposals {
    let payload = strip_code_fence(raw);

    if let Ok(value) = serde_json::from_str::<Value>(payload) {
        if let Some(proposals) = proposals_from_value(&value) {
            return parsed(proposals, ParseMethod::Strict);
        }
        tracing::debug!("[Normalizer] Parsed JSON carries no proposals");
    }

    if let Some(repaired) = repair_truncated(payload) {
        match serde_json::from_str::<Value>(&repaired) {
            Ok(value) => {
                if let Some(proposals) = proposals_from_value(&value) {
                    tracing::info!(
                        "[Normalizer] Repaired truncated reply ({} proposals kept)",
                        proposals.len()
                    );
                    return parsed(proposals, ParseMethod::TruncationRepair);
                }
            }
            Err(e) => tracing::debug!("[Normalizer] Repair did not parse: {}", e),
        }
    }

    if let Some(region) = DESIGN_REGION.find(raw) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(region.as_str()) {
            tracing::debug!("[Normalizer] Rescued object region from prose");
            return parsed(vec![proposal_from_value(&value, 0)], ParseMethod::RegexRescue);
        }
    }

    tracing::warn!(
        "[Normalizer] Falling back to raw text ({} bytes)",
        raw.len()
    );
    NormalizedProposals::Fallback {
        proposal: fallback_proposal(raw),
    }
}

fn parsed(proposals: Vec<Proposal>, method: ParseMethod) -> NormalizedProposals {
    NormalizedProposals::Parsed { proposals, method }
}

/// Proposals carried by a parsed value, or `None` when there are none.
fn proposals_from_value(value: &Value) -> Option<Vec<Proposal>> {
    let items: Vec<&Value> = match value {
        Value::Object(obj) => match obj.get("proposals") {
            Some(Value::Array(list)) => list.iter().collect(),
            _ if is_proposal_like(obj) => vec![value],
            _ => return None,
        },
        Value::Array(list) => list.iter().collect(),
        _ => return None,
    };

    let proposals: Vec<Proposal> = items
        .into_iter()
        .filter(|v| v.is_object())
        .enumerate()
        .map(|(i, v)| proposal_from_value(v, i))
        .collect();
    (!proposals.is_empty()).then_some(proposals)
}

fn fallback_proposal(raw: &str) -> Proposal {
    let mut proposal = proposal_from_value(&Value::Null, 0);
    proposal.design = FALLBACK_DESIGN.to_string();
    proposal.vision = raw.trim().chars().take(FALLBACK_VISION_CHARS).collect();
    proposal.reason = FALLBACK_REASON.to_string();
    proposal
}

/// Extracts a single JSON object from a reply to a structured task.
///
/// Same fence/strict/repair/region steps as [`normalize`], without the
/// proposal-specific shape checks and without a synthetic fallback.
pub fn extract_object(raw: &str) -> Option<Value> {
    let payload = strip_code_fence(raw);
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(payload) {
        return Some(value);
    }

    let region = outermost_object(payload)?;
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(region) {
        tracing::debug!("[Normalizer] Extracted object region from prose");
        return Some(value);
    }
    tracing::debug!("[Normalizer] No structured object in reply");
    None
}

/// From the first `{` to its matching `}`, or to the end when unbalanced.
fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;
    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escape => escape = false,
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FinerCriterion, FinerNote};

    #[test]
    fn test_fenced_single_object() {
        let out = normalize("```json\n{\"design\":\"A\",\"vision\":\"v\"}\n```");
        assert!(matches!(
            out,
            NormalizedProposals::Parsed {
                method: ParseMethod::Strict,
                ..
            }
        ));
        let p = out.primary();
        assert_eq!(p.design, "A");
        assert_eq!(p.vision, "v");
        assert_eq!(p.reason, "");
    }

    #[test]
    fn test_proposals_key_and_bare_list() {
        let wrapped = normalize(r#"{"proposals":[{"design":"A"},{"design":"B"}]}"#);
        assert_eq!(wrapped.proposals().len(), 2);

        let bare = normalize(r#"[{"title":"A"},{"name":"B"}]"#);
        assert_eq!(bare.proposals()[1].design, "B");
    }

    #[test]
    fn test_empty_input_falls_back() {
        let out = normalize("");
        assert!(out.is_fallback());
        assert_eq!(out.proposals().len(), 1);
        assert_eq!(out.primary().design, FALLBACK_DESIGN);
    }

    #[test]
    fn test_prose_falls_back_with_truncated_vision() {
        let raw = "é".repeat(1000);
        let out = normalize(&raw);
        assert!(out.is_fallback());
        assert_eq!(out.primary().vision.chars().count(), FALLBACK_VISION_CHARS);
        assert!(!out.primary().reason.is_empty());
        assert_eq!(
            out.primary().finer[&FinerCriterion::Feasible],
            FinerNote::default()
        );
    }

    #[test]
    fn test_empty_proposals_list_falls_back() {
        assert!(normalize(r#"{"proposals": []}"#).is_fallback());
        assert!(normalize("42").is_fallback());
    }

    #[test]
    fn test_regex_rescue_from_prose() {
        let raw = "Sure! Here is my idea: {\"design\": \"Cohort\", \"vision\": \"track\"} Let me know.";
        let out = normalize(raw);
        assert!(matches!(
            out,
            NormalizedProposals::Parsed {
                method: ParseMethod::RegexRescue,
                ..
            }
        ));
        assert_eq!(out.primary().design, "Cohort");
    }

    #[test]
    fn test_extract_object_from_prose() {
        let value = extract_object("Result:\n{\"rq\": \"Does {x} help?\"}\nthanks").unwrap();
        assert_eq!(value["rq"], "Does {x} help?");
        assert!(extract_object("no json here").is_none());
        assert!(extract_object("[1,2]").is_none());
    }
}
