//! Static analysis-method lookup and reply parsing.
//!
//! This is a reference table, not a statistics engine: nothing is computed
//! from data.

use crate::data_collection::{
    CATEGORICAL_TYPES, CONTINUOUS_TYPES, QUALITATIVE_TYPES, TIMESERIES_TYPE, parse_sample_size,
};
use crate::document::{AnalysisMethod, AnalysisResult, DataCollection, Grouping};
use crate::normalize::{coalesce_text, extract_object};
use serde_json::{Map, Value};
use std::fmt;

/// Sample sizes below this trigger a non-parametric recommendation.
pub const SMALL_SAMPLE_THRESHOLD: u32 = 30;

/// Method recommendations for one grouping.
#[derive(Debug, PartialEq, Eq)]
pub struct AnalysisRule {
    pub continuous_normal: &'static str,
    pub continuous_non_normal: &'static str,
    pub categorical: &'static str,
}

static TWO_GROUPS: AnalysisRule = AnalysisRule {
    continuous_normal: "Independent two-sample t-test",
    continuous_non_normal: "Mann-Whitney U test",
    categorical: "Chi-square test / Fisher's exact test",
};

static THREE_GROUPS: AnalysisRule = AnalysisRule {
    continuous_normal: "One-way ANOVA",
    continuous_non_normal: "Kruskal-Wallis test",
    categorical: "Chi-square test",
};

static PRE_POST: AnalysisRule = AnalysisRule {
    continuous_normal: "Paired t-test",
    continuous_non_normal: "Wilcoxon signed-rank test",
    categorical: "McNemar test",
};

static SINGLE_GROUP: AnalysisRule = AnalysisRule {
    continuous_normal: "Descriptive statistics, correlation analysis",
    continuous_non_normal: "Spearman rank correlation",
    categorical: "Frequency distribution, descriptive statistics",
};

/// Rule for a grouping; ungrouped and `other` use the single-group row.
pub fn rule_for(grouping: Option<Grouping>) -> &'static AnalysisRule {
    match grouping {
        Some(Grouping::TwoGroups) => &TWO_GROUPS,
        Some(Grouping::ThreeOrMoreGroups) => &THREE_GROUPS,
        Some(Grouping::PrePost) => &PRE_POST,
        Some(Grouping::SingleGroup) | Some(Grouping::Other) | None => &SINGLE_GROUP,
    }
}

/// Situation → method quick reference.
pub static QUICK_REFERENCE: [(&str, &str); 8] = [
    ("Two groups, continuous, normal", "Independent two-sample t-test"),
    ("Two groups, continuous, non-normal", "Mann-Whitney U test"),
    ("Three or more groups, continuous", "ANOVA / Kruskal-Wallis test"),
    ("Categorical variables", "Chi-square test / Fisher's exact test"),
    ("Before/after, continuous", "Paired t-test / Wilcoxon test"),
    ("Association", "Correlation / regression analysis"),
    ("Time-series data", "Linear mixed model"),
    ("Quality improvement", "Run chart / SPC"),
];

/// A suggestion derived from the chosen data types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisHint {
    ContinuousComparison {
        normal: &'static str,
        non_normal: &'static str,
    },
    Categorical(&'static str),
    TimeSeries,
    Qualitative,
    SmallSample(u32),
}

impl fmt::Display for AnalysisHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContinuousComparison { normal, non_normal } => write!(
                f,
                "Continuous variables: {} (normal distribution) / {} (otherwise)",
                normal, non_normal
            ),
            Self::Categorical(method) => write!(f, "Categorical variables: {}", method),
            Self::TimeSeries => write!(
                f,
                "Time series: linear mixed model / repeated-measures ANOVA"
            ),
            Self::Qualitative => write!(
                f,
                "Qualitative data: qualitative content analysis / thematic analysis / grounded theory"
            ),
            Self::SmallSample(n) => write!(
                f,
                "Warning: sample size {} is below {}; prefer non-parametric tests",
                n, SMALL_SAMPLE_THRESHOLD
            ),
        }
    }
}

/// Hints for the current data-collection answers, in display order.
pub fn auto_suggestions(data: &DataCollection) -> Vec<AnalysisHint> {
    let has_any = |group: &[&str]| data.types.iter().any(|t| group.contains(&t.as_str()));
    let rule = rule_for(data.grouping);
    let mut hints = Vec::new();

    if has_any(CONTINUOUS_TYPES) {
        hints.push(AnalysisHint::ContinuousComparison {
            normal: rule.continuous_normal,
            non_normal: rule.continuous_non_normal,
        });
    }
    if has_any(CATEGORICAL_TYPES) {
        hints.push(AnalysisHint::Categorical(rule.categorical));
    }
    if data.types.contains(TIMESERIES_TYPE) {
        hints.push(AnalysisHint::TimeSeries);
    }
    if has_any(QUALITATIVE_TYPES) {
        hints.push(AnalysisHint::Qualitative);
    }
    if let Some(n) = parse_sample_size(&data.sample_size) {
        if n < SMALL_SAMPLE_THRESHOLD {
            hints.push(AnalysisHint::SmallSample(n));
        }
    }
    hints
}

/// Method label used when the reply is not structured.
pub const FALLBACK_METHOD: &str = "Proposal";

/// Parses a StatisticsProposal reply. Unstructured text becomes the reason
/// of a single primary method.
pub fn parse_analysis_result(raw: &str) -> AnalysisResult {
    match extract_object(raw) {
        Some(Value::Object(obj)) if obj.contains_key("primaryAnalysis") => analysis_from(&obj),
        _ => {
            tracing::debug!("[Normalizer] Analysis reply kept as text");
            AnalysisResult {
                primary_analysis: AnalysisMethod {
                    method: FALLBACK_METHOD.to_string(),
                    reason: raw.trim().to_string(),
                },
                ..Default::default()
            }
        }
    }
}

fn analysis_from(obj: &Map<String, Value>) -> AnalysisResult {
    let text = |keys: &[&str]| coalesce_text(obj, keys).unwrap_or_default();
    AnalysisResult {
        primary_analysis: obj
            .get("primaryAnalysis")
            .map(method_from)
            .unwrap_or_default(),
        secondary_analyses: obj
            .get("secondaryAnalyses")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(method_from).collect())
            .unwrap_or_default(),
        effect_size: text(&["effectSize"]),
        multivariate_needed: match obj.get("multivariateNeeded") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes"),
            _ => false,
        },
        multivariate_method: text(&["multivariateMethod"]),
        sample_size_note: text(&["sampleSizeNote", "sampleSize"]),
    }
}

fn method_from(value: &Value) -> AnalysisMethod {
    match value {
        Value::Object(m) => AnalysisMethod {
            method: coalesce_text(m, &["method", "name"]).unwrap_or_default(),
            reason: coalesce_text(m, &["reason", "rationale"]).unwrap_or_default(),
        },
        Value::String(s) => AnalysisMethod {
            method: s.clone(),
            reason: String::new(),
        },
        _ => AnalysisMethod::default(),
    }
}
