//! Reporting guidelines and design→guideline resolution.
//!
//! Everything here is static data plus pure lookups. Resolution never
//! touches the tables it reads, so callers are free to cache its output.

use crate::document::ResearchType;

/// A reporting guideline with its checklist.
#[derive(Debug, PartialEq, Eq)]
pub struct Guideline {
    pub name: &'static str,
    pub full_name: &'static str,
    pub description: &'static str,
    pub checklist: &'static [&'static str],
}

pub static CONSORT: Guideline = Guideline {
    name: "CONSORT",
    full_name: "Consolidated Standards of Reporting Trials",
    description: "Reporting standard for randomised controlled trials",
    checklist: &[
        "Title identifies the study as randomised",
        "Structured abstract",
        "Scientific background and rationale",
        "Specific objectives or hypotheses",
        "Description of trial design",
        "Eligibility criteria for participants",
        "Settings and locations of data collection",
        "Interventions described in replicable detail",
        "Completely defined outcomes",
        "How sample size was determined",
        "Randomisation sequence generation",
        "Allocation concealment",
        "Blinding",
        "Statistical methods",
        "Participant flow diagram",
        "Baseline characteristics table",
        "Results for each group with effect size and precision",
        "Harms",
        "Limitations, generalisability and interpretation",
        "Trial registration number",
    ],
};

pub static STROBE: Guideline = Guideline {
    name: "STROBE",
    full_name: "Strengthening the Reporting of Observational Studies in Epidemiology",
    description: "Reporting standard for observational studies",
    checklist: &[
        "Study design stated",
        "Setting, period and participants",
        "Definition of variables",
        "Data sources and measurement",
        "Efforts to address bias",
        "Rationale for study size",
        "Statistical methods",
        "Flow of participants",
        "Descriptive data",
        "Main results, unadjusted and adjusted",
        "Summary of key findings",
        "Limitations",
        "Generalisability",
        "Funding",
    ],
};

pub static SQUIRE: Guideline = Guideline {
    name: "SQUIRE 2.0",
    full_name: "Standards for QUality Improvement Reporting Excellence",
    description: "Reporting standard for quality improvement work",
    checklist: &[
        "Title names the improvement method",
        "Background and need for improvement",
        "Specific improvement aims",
        "Context of the improvement work",
        "Rationale for the intervention",
        "Ethical considerations",
        "Improvement framework",
        "Definition of measures",
        "Process and outcome measurement",
        "Analysis methods",
        "Results, e.g. run charts",
        "Discussion and lessons learned",
    ],
};

pub static COREQ: Guideline = Guideline {
    name: "COREQ",
    full_name: "Consolidated Criteria for Reporting Qualitative Research",
    description: "Reporting standard for qualitative research",
    checklist: &[
        "Research team and reflexivity",
        "Theoretical framework",
        "Participant selection",
        "Setting",
        "Data collection in detail",
        "Interview guide",
        "Data saturation",
        "Data analysis",
        "Trustworthiness and credibility",
        "Major categories or themes",
        "Participant quotations",
    ],
};

pub static PRISMA_SCR: Guideline = Guideline {
    name: "PRISMA-ScR",
    full_name: "Preferred Reporting Items for Systematic reviews and Meta-Analyses extension for Scoping Reviews",
    description: "Reporting standard for scoping reviews",
    checklist: &[
        "Title identifies a scoping review",
        "Objectives and review question",
        "Eligibility criteria",
        "Information sources and databases",
        "Search strategy",
        "Screening process",
        "Data charting method",
        "Summary of results",
        "Mapping of the evidence",
    ],
};

pub static PRISMA_2020: Guideline = Guideline {
    name: "PRISMA 2020",
    full_name: "Preferred Reporting Items for Systematic Reviews and Meta-Analyses",
    description: "Reporting standard for systematic reviews and meta-analyses",
    checklist: &[
        "Structured abstract",
        "Registration and protocol",
        "Eligibility criteria",
        "Information sources",
        "Search strategy",
        "Study selection process",
        "Data extraction process",
        "Risk of bias assessment",
        "Certainty of evidence",
        "Synthesis methods",
        "Flow diagram",
    ],
};

pub static GRAMMS: Guideline = Guideline {
    name: "GRAMMS",
    full_name: "Good Reporting of A Mixed Methods Study",
    description: "Reporting standard for mixed methods research",
    checklist: &[
        "Justification for mixed methods",
        "Description of the design",
        "Quantitative and qualitative methods",
        "Timing and method of integration",
        "Limitations of each component",
        "Insights gained from integration",
    ],
};

pub static CARE: Guideline = Guideline {
    name: "CARE",
    full_name: "CAse REport Guidelines",
    description: "Reporting standard for case reports",
    checklist: &[
        "Patient information and background",
        "Clinical findings",
        "Timeline",
        "Diagnostic assessment",
        "Therapeutic intervention",
        "Follow-up and outcomes",
        "Discussion and learning points",
    ],
};

pub static ALL_GUIDELINES: [&Guideline; 8] = [
    &CONSORT,
    &STROBE,
    &SQUIRE,
    &COREQ,
    &PRISMA_SCR,
    &PRISMA_2020,
    &GRAMMS,
    &CARE,
];

/// Design label → guideline, in match priority order.
static DESIGN_GUIDELINES: &[(&str, &Guideline)] = &[
    ("Interventional study", &CONSORT),
    ("Cross-sectional study", &STROBE),
    ("Descriptive survey", &STROBE),
    ("Observational study", &STROBE),
    ("Quality improvement (QI) project", &SQUIRE),
    ("Quality improvement (QI)", &SQUIRE),
    ("Qualitative study", &COREQ),
    ("Exploratory study", &COREQ),
    ("Scoping review", &PRISMA_SCR),
    ("Systematic review", &PRISMA_2020),
    ("Mixed methods study", &GRAMMS),
    ("Before-after study", &STROBE),
    ("Case / practice report", &CARE),
];

/// Entry used when nothing in the table matches.
const DEFAULT_DESIGN: &str = "Cross-sectional study";

/// A design type offered for manual selection.
#[derive(Debug)]
pub struct DesignType {
    pub label: &'static str,
    pub guideline: &'static Guideline,
    pub recommended_for: &'static [ResearchType],
}

/// The manual-design enumeration, in display order.
pub static DESIGN_TABLE: [DesignType; 8] = [
    DesignType {
        label: "Interventional study",
        guideline: &CONSORT,
        recommended_for: &[ResearchType::Research],
    },
    DesignType {
        label: "Observational study",
        guideline: &STROBE,
        recommended_for: &[ResearchType::Research],
    },
    DesignType {
        label: "Quality improvement (QI)",
        guideline: &SQUIRE,
        recommended_for: &[ResearchType::Qi],
    },
    DesignType {
        label: "Qualitative study",
        guideline: &COREQ,
        recommended_for: &[ResearchType::Research],
    },
    DesignType {
        label: "Scoping review",
        guideline: &PRISMA_SCR,
        recommended_for: &[],
    },
    DesignType {
        label: "Systematic review",
        guideline: &PRISMA_2020,
        recommended_for: &[],
    },
    DesignType {
        label: "Mixed methods study",
        guideline: &GRAMMS,
        recommended_for: &[],
    },
    DesignType {
        label: "Case / practice report",
        guideline: &CARE,
        recommended_for: &[ResearchType::Practice],
    },
];

/// Whether `label` is one of the manually selectable design types.
pub fn is_manual_design(label: &str) -> bool {
    DESIGN_TABLE.iter().any(|d| d.label == label)
}

/// Design types recommended for a research category.
pub fn recommended_designs(research_type: ResearchType) -> Vec<&'static DesignType> {
    DESIGN_TABLE
        .iter()
        .filter(|d| d.recommended_for.contains(&research_type))
        .collect()
}

/// Finds a guideline by its short name (e.g. `"SQUIRE 2.0"`).
pub fn find_guideline_by_name(name: &str) -> Option<&'static Guideline> {
    ALL_GUIDELINES.iter().copied().find(|g| g.name == name)
}

/// Resolves a design label to its reporting guideline.
///
/// Exact match first, then a case-insensitive substring match in either
/// direction over the table in priority order, then the default entry.
/// A blank label resolves to the default.
pub fn resolve_guideline(design: &str) -> &'static Guideline {
    let design = design.trim();
    if let Some((_, g)) = DESIGN_GUIDELINES.iter().find(|(label, _)| *label == design) {
        return g;
    }

    if !design.is_empty() {
        let needle = design.to_lowercase();
        let hit = DESIGN_GUIDELINES.iter().find(|(label, _)| {
            let key = label.to_lowercase();
            needle.contains(&key) || key.contains(&needle)
        });
        if let Some((label, g)) = hit {
            tracing::debug!("[Guideline] '{}' matched '{}' by substring", design, label);
            return g;
        }
    }

    default_guideline()
}

fn default_guideline() -> &'static Guideline {
    DESIGN_GUIDELINES
        .iter()
        .find(|(label, _)| *label == DEFAULT_DESIGN)
        .map(|(_, g)| *g)
        .unwrap_or(&STROBE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert_eq!(resolve_guideline("Interventional study").name, "CONSORT");
        assert_eq!(resolve_guideline("Case / practice report").name, "CARE");
    }

    #[test]
    fn test_substring_both_directions() {
        // label contains key
        assert_eq!(
            resolve_guideline("Pragmatic interventional study in two wards").name,
            "CONSORT"
        );
        // key contains label
        assert_eq!(resolve_guideline("scoping").name, "PRISMA-ScR");
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        assert_eq!(resolve_guideline("Delphi consensus").name, "STROBE");
        assert_eq!(resolve_guideline("").name, "STROBE");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = resolve_guideline("mixed methods study of nurse handover");
        let b = resolve_guideline("mixed methods study of nurse handover");
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.name, "GRAMMS");
    }

    #[test]
    fn test_design_table_guidelines_resolve_consistently() {
        for design in &DESIGN_TABLE {
            assert_eq!(resolve_guideline(design.label), design.guideline);
        }
    }

    #[test]
    fn test_recommendations() {
        let research: Vec<_> = recommended_designs(ResearchType::Research)
            .iter()
            .map(|d| d.label)
            .collect();
        assert_eq!(
            research,
            vec!["Interventional study", "Observational study", "Qualitative study"]
        );
        assert_eq!(recommended_designs(ResearchType::Qi)[0].guideline.name, "SQUIRE 2.0");
        assert_eq!(recommended_designs(ResearchType::Practice)[0].guideline.name, "CARE");
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find_guideline_by_name("PRISMA 2020").unwrap().checklist.len(), 11);
        assert!(find_guideline_by_name("TRIPOD").is_none());
    }
}
