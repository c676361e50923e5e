//! Session Document domain models.
//!
//! The whole wizard run lives in one `SessionDocument`. Each top-level
//! section is owned by one step but readable by all. Field names serialize
//! in camelCase so that dotted paths such as `designProposal.selectedDesign`
//! address the same fields in memory, in the durable blob and in export files.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// First and last wizard step numbers.
pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 7;

// ============================================================================
// settings
// ============================================================================

/// AI backend selected in the settings dialog.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApiProvider {
    #[default]
    Gemini,
    Openai,
}

/// Global settings. Persisted under their own storage keys, never inside
/// the session blob or an export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_provider: ApiProvider,
    #[serde(default = "default_true")]
    pub demo_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_provider: ApiProvider::default(),
            demo_mode: true,
        }
    }
}

impl Settings {
    /// Demo responses are used when demo mode is on or no key is configured.
    pub fn uses_demo(&self) -> bool {
        self.demo_mode || self.api_key.trim().is_empty()
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// navigation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub current_step: u8,
    #[serde(default)]
    pub completed_steps: IndexSet<u8>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            current_step: FIRST_STEP,
            completed_steps: IndexSet::new(),
        }
    }
}

// ============================================================================
// seed (step 1)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    User,
    /// Older saves used `ai` for advisor turns.
    #[serde(alias = "ai")]
    Assistant,
}

/// One turn of the brainstorming chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Category the refined seed was classified into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResearchType {
    #[default]
    Research,
    Practice,
    Qi,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Approach {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Outline distilled from the brainstorming chat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinedResult {
    #[serde(rename = "type", default)]
    pub research_type: ResearchType,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub rq: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub approaches: Vec<Approach>,
}

impl RefinedResult {
    /// Theme for headings and file names, falling back to the RQ.
    pub fn display_theme(&self) -> &str {
        if self.theme.trim().is_empty() {
            &self.rq
        } else {
            &self.theme
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub refined_result: Option<RefinedResult>,
    #[serde(default)]
    pub rq_confirmed: bool,
}

// ============================================================================
// designProposal (step 2)
// ============================================================================

/// FINER evaluation criteria.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FinerCriterion {
    Feasible,
    Interesting,
    Novel,
    Ethical,
    Relevant,
}

/// A criterion note is either free text or a yes/no judgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FinerNote {
    Flag(bool),
    Text(String),
}

impl Default for FinerNote {
    fn default() -> Self {
        FinerNote::Text(String::new())
    }
}

/// A structured research-design suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Proposal {
    #[serde(default)]
    pub design: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default)]
    pub finer: BTreeMap<FinerCriterion, FinerNote>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignProposalState {
    #[serde(default)]
    pub current: Option<Proposal>,
    #[serde(default)]
    pub history: Vec<Proposal>,
    #[serde(default)]
    pub selected_design: Option<String>,
}

impl DesignProposalState {
    /// Every design label produced so far, oldest first, current last.
    pub fn known_designs(&self) -> Vec<&str> {
        self.history
            .iter()
            .chain(self.current.iter())
            .map(|p| p.design.as_str())
            .collect()
    }
}

// ============================================================================
// guideline (step 3)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuidelineState {
    /// Cached name of the guideline resolved from the selected design.
    #[serde(default)]
    pub selected: Option<String>,
    /// Indices of checked checklist items.
    #[serde(default)]
    pub checklist: IndexSet<usize>,
    #[serde(default)]
    pub notes: BTreeMap<usize, String>,
}

// ============================================================================
// literatureReview (step 4)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedQueries {
    #[serde(default)]
    pub keywords_native: String,
    #[serde(default)]
    pub keywords_foreign: String,
    #[serde(default)]
    pub query_native: String,
    #[serde(default)]
    pub query_foreign: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewResult {
    #[serde(default)]
    pub structure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiteratureReview {
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub years: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub suggested_queries: Option<SuggestedQueries>,
    #[serde(default)]
    pub result: Option<ReviewResult>,
}

impl Default for LiteratureReview {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            years: "5".to_string(),
            language: "ja+en".to_string(),
            database: "PubMed".to_string(),
            suggested_queries: None,
            result: None,
        }
    }
}

// ============================================================================
// dataCollection (step 5)
// ============================================================================

/// How participants are split for comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Grouping {
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    SingleGroup,
    #[serde(rename = "2groups")]
    #[strum(serialize = "2groups")]
    TwoGroups,
    #[serde(rename = "3groups")]
    #[strum(serialize = "3groups")]
    ThreeOrMoreGroups,
    #[serde(rename = "prepost")]
    #[strum(serialize = "prepost")]
    PrePost,
    #[serde(rename = "other")]
    #[strum(serialize = "other")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCollection {
    #[serde(default)]
    pub types: IndexSet<String>,
    #[serde(default)]
    pub type_other_text: String,
    #[serde(default)]
    pub sample_size: String,
    #[serde(default)]
    pub grouping: Option<Grouping>,
    #[serde(default)]
    pub grouping_other_text: String,
}

// ============================================================================
// analysis (step 6)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalysisMethod {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub primary_analysis: AnalysisMethod,
    #[serde(default)]
    pub secondary_analyses: Vec<AnalysisMethod>,
    #[serde(default)]
    pub effect_size: String,
    #[serde(default)]
    pub multivariate_needed: bool,
    #[serde(default)]
    pub multivariate_method: String,
    #[serde(default)]
    pub sample_size_note: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisState {
    #[serde(default)]
    pub result: Option<AnalysisResult>,
}

// ============================================================================
// proposal (step 7)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProposalState {
    #[serde(default)]
    pub draft: String,
}

// ============================================================================
// root
// ============================================================================

/// The single state tree for one wizard run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub navigation: Navigation,
    #[serde(default)]
    pub seed: Seed,
    #[serde(default)]
    pub design_proposal: DesignProposalState,
    #[serde(default)]
    pub guideline: GuidelineState,
    #[serde(default)]
    pub literature_review: LiteratureReview,
    #[serde(default)]
    pub data_collection: DataCollection,
    #[serde(default)]
    pub analysis: AnalysisState,
    #[serde(default)]
    pub proposal: ProposalState,
}

/// Top-level sections that travel in the session blob and in export files.
///
/// `settings` is deliberately absent: it has its own storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr, Display)]
pub enum Section {
    #[strum(serialize = "navigation")]
    Navigation,
    #[strum(serialize = "seed")]
    Seed,
    #[strum(serialize = "designProposal")]
    DesignProposal,
    #[strum(serialize = "guideline")]
    Guideline,
    #[strum(serialize = "literatureReview")]
    LiteratureReview,
    #[strum(serialize = "dataCollection")]
    DataCollection,
    #[strum(serialize = "analysis")]
    Analysis,
    #[strum(serialize = "proposal")]
    Proposal,
}

impl Section {
    /// Key of this section in the serialized document.
    pub fn key(self) -> &'static str {
        self.into()
    }
}

impl SessionDocument {
    /// Creates a document with default sections and the given settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Theme used for summaries and export file names.
    ///
    /// Falls back from the refined theme to the RQ to the raw seed question.
    pub fn theme(&self) -> Option<&str> {
        self.seed
            .refined_result
            .as_ref()
            .map(RefinedResult::display_theme)
            .filter(|t| !t.trim().is_empty())
            .or_else(|| Some(self.seed.question.as_str()).filter(|q| !q.trim().is_empty()))
    }
}
