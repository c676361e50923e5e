//! Data-collection catalog: collectable data types and grouping options.

use crate::document::Grouping;

/// A kind of data the study can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataType {
    pub id: &'static str,
    pub label: &'static str,
}

pub static DATA_TYPES: [DataType; 11] = [
    DataType { id: "attributes", label: "Basic attributes (age, sex, ...)" },
    DataType { id: "vitals", label: "Vital signs" },
    DataType { id: "labs", label: "Laboratory values" },
    DataType { id: "scales", label: "Rating scales (HADS, BI, ...)" },
    DataType { id: "observation", label: "Observation records" },
    DataType { id: "interview", label: "Interviews" },
    DataType { id: "questionnaire", label: "Questionnaire (Likert scale)" },
    DataType { id: "intervention", label: "Intervention yes/no" },
    DataType { id: "timeseries", label: "Time-series data" },
    DataType { id: "existing_db", label: "Existing database" },
    DataType { id: "other", label: "Other" },
];

/// Data types analysed as continuous variables.
pub const CONTINUOUS_TYPES: &[&str] = &["vitals", "labs", "scales"];
/// Data types analysed as categorical variables.
pub const CATEGORICAL_TYPES: &[&str] = &["attributes", "intervention"];
/// Data types analysed qualitatively.
pub const QUALITATIVE_TYPES: &[&str] = &["interview", "observation"];
pub const TIMESERIES_TYPE: &str = "timeseries";

pub fn find_data_type(id: &str) -> Option<&'static DataType> {
    DATA_TYPES.iter().find(|t| t.id == id)
}

/// Human label of a grouping option.
pub fn grouping_label(grouping: Grouping) -> &'static str {
    match grouping {
        Grouping::SingleGroup => "None (single group)",
        Grouping::TwoGroups => "Two groups (intervention / control)",
        Grouping::ThreeOrMoreGroups => "Three or more groups",
        Grouping::PrePost => "Before / after comparison",
        Grouping::Other => "Other",
    }
}

/// Parses the free-text sample size; blank or non-numeric yields `None`.
pub fn parse_sample_size(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_unique() {
        let mut ids: Vec<_> = DATA_TYPES.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), DATA_TYPES.len());
    }

    #[test]
    fn test_classifications_are_catalog_members() {
        for id in CONTINUOUS_TYPES
            .iter()
            .chain(CATEGORICAL_TYPES)
            .chain(QUALITATIVE_TYPES)
            .chain(std::iter::once(&TIMESERIES_TYPE))
        {
            assert!(find_data_type(id).is_some(), "{id} missing");
        }
    }

    #[test]
    fn test_sample_size_parsing() {
        assert_eq!(parse_sample_size(" 24 "), Some(24));
        assert_eq!(parse_sample_size(""), None);
        assert_eq!(parse_sample_size("about 50"), None);
    }
}
